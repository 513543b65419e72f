//! Builds the structural content of both columns from a song list: the
//! selector affordance at the top, the current-track heading, and one section
//! per track with one entry per song. Both columns go through the same track
//! grouping so they always enumerate the same tracks in the same order.

use tracing::warn;

use crate::models::{AuthorIndexEntry, Language, Song};
use crate::sync::{Column, DEFAULT_TRACK_LABEL};
use crate::tracks::{group_by_track, track_slug};

pub const AUTHOR_PLACEHOLDER: &str = "Choose an Author...";
pub const LANGUAGE_PLACEHOLDER: &str = "Choose language...";
pub const NO_LYRICS_MESSAGE: &str = "No lyrics available.";
pub const NO_TRANSLATIONS_MESSAGE: &str = "No translations available.";
pub const SELECT_AUTHOR_HEADING: &str = "Select an Author";
pub const SELECT_LANGUAGE_HEADING: &str = "Select a Language";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Author,
    Language,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    pub value: String,
    pub label: String,
}

/// Selector shown at the top of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub kind: SelectorKind,
    pub placeholder: &'static str,
    pub options: Vec<SelectorOption>,
    pub selected: Option<String>,
    pub enabled: bool,
}

impl Selector {
    pub fn author(authors: &[AuthorIndexEntry], selected: Option<&str>) -> Self {
        Self {
            kind: SelectorKind::Author,
            placeholder: AUTHOR_PLACEHOLDER,
            options: authors
                .iter()
                .map(|author| SelectorOption {
                    value: author.name.clone(),
                    label: author.name.clone(),
                })
                .collect(),
            selected: selected.map(str::to_string),
            enabled: true,
        }
    }

    pub fn language(selected: Option<Language>, enabled: bool) -> Self {
        Self {
            kind: SelectorKind::Language,
            placeholder: LANGUAGE_PLACEHOLDER,
            options: Language::TRANSLATIONS
                .into_iter()
                .map(|language| SelectorOption {
                    value: language.code().to_string(),
                    label: language.display_name().to_string(),
                })
                .collect(),
            selected: selected.map(|language| language.code().to_string()),
            enabled,
        }
    }

    /// Label of the selected option, or the placeholder.
    pub fn display(&self) -> &str {
        self.selected
            .as_deref()
            .and_then(|value| self.options.iter().find(|option| option.value == value))
            .map(|option| option.label.as_str())
            .unwrap_or(self.placeholder)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongBody {
    /// Raw lyric lines, still carrying their inline markers.
    Lyrics(Vec<String>),
    /// Inline fallback shown instead of the lyrics.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongSection {
    pub id: String,
    pub song_type: String,
    pub title: Option<String>,
    pub body: SongBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackSection {
    /// Anchor id of the track marker, e.g. `lyrics-nest-Track-1`.
    pub id: String,
    pub label: String,
    pub songs: Vec<SongSection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnBody {
    /// Nothing selected yet.
    Placeholder(String),
    Loading,
    Error(String),
    /// Emptied without a replacement.
    Cleared,
    Tracks(Vec<TrackSection>),
}

/// Everything one column displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnContent {
    pub column: Column,
    pub selector: Selector,
    /// Current-track heading; `None` when the column renders without one.
    pub heading: Option<String>,
    pub body: ColumnBody,
}

impl ColumnContent {
    pub fn tracks(&self) -> &[TrackSection] {
        match &self.body {
            ColumnBody::Tracks(tracks) => tracks,
            _ => &[],
        }
    }

    /// `(label, song count)` per track, in display order.
    pub fn song_counts(&self) -> Vec<(String, usize)> {
        self.tracks()
            .iter()
            .map(|track| (track.label.clone(), track.songs.len()))
            .collect()
    }

    /// Same content with the body swapped for a loading indicator.
    pub fn loading(&self) -> Self {
        Self {
            body: ColumnBody::Loading,
            ..self.clone()
        }
    }

    /// Same content with the body swapped for an error message.
    pub fn failed(&self, message: &str) -> Self {
        Self {
            body: ColumnBody::Error(message.to_string()),
            ..self.clone()
        }
    }
}

/// Lyrics column for `songs` (original language).
pub fn render_lyrics(
    songs: &[Song],
    authors: &[AuthorIndexEntry],
    selected_author: Option<&str>,
) -> ColumnContent {
    let selector = Selector::author(authors, selected_author);
    if songs.is_empty() {
        return ColumnContent {
            column: Column::Lyrics,
            selector,
            heading: Some(SELECT_AUTHOR_HEADING.to_string()),
            body: ColumnBody::Placeholder(NO_LYRICS_MESSAGE.to_string()),
        };
    }

    let tracks = render_tracks(Column::Lyrics, songs, |song| SongSection {
        id: String::new(),
        song_type: song.song_type.clone(),
        title: non_blank(song.original_title()),
        body: SongBody::Lyrics(song.lyrics.original.clone()),
    });
    column_with_tracks(Column::Lyrics, selector, tracks)
}

/// Translation column for `songs` in `language`. Songs lacking that language
/// get an inline fallback; the rest of the column renders normally.
pub fn render_translations(songs: &[Song], language: Language, enabled: bool) -> ColumnContent {
    if songs.is_empty() {
        return empty_translations(language, false);
    }

    let selector = Selector::language(Some(language), enabled);
    let tracks = render_tracks(Column::Translation, songs, |song| {
        translation_section(song, language)
    });
    column_with_tracks(Column::Translation, selector, tracks)
}

/// Translation column before any author is chosen.
pub fn empty_translations(language: Language, enabled: bool) -> ColumnContent {
    ColumnContent {
        column: Column::Translation,
        selector: Selector::language(enabled.then_some(language), enabled),
        heading: Some(SELECT_LANGUAGE_HEADING.to_string()),
        body: ColumnBody::Placeholder(NO_TRANSLATIONS_MESSAGE.to_string()),
    }
}

/// Sorted, de-duplicated song categories, for the column summary line.
pub fn song_types(songs: &[Song]) -> Vec<String> {
    let mut types: Vec<String> = songs
        .iter()
        .map(|song| song.song_type.trim())
        .filter(|song_type| !song_type.is_empty())
        .map(str::to_string)
        .collect();
    types.sort();
    types.dedup();
    types
}

fn translation_section(song: &Song, language: Language) -> SongSection {
    let Some(lines) = song.lyrics_for(language) else {
        return SongSection {
            id: String::new(),
            song_type: song.song_type.clone(),
            title: non_blank(song.original_title()),
            body: SongBody::Unavailable(format!(
                "Translation not available for {}",
                language.display_name()
            )),
        };
    };

    let title = match song.title_for(language) {
        Some(title) => title,
        None => {
            warn!(
                song = %song.original_title(),
                %language,
                "translated title missing, using original title"
            );
            song.original_title()
        }
    };

    SongSection {
        id: String::new(),
        song_type: song.song_type.clone(),
        title: non_blank(title),
        body: SongBody::Lyrics(lines.to_vec()),
    }
}

fn render_tracks<F>(column: Column, songs: &[Song], mut section: F) -> Vec<TrackSection>
where
    F: FnMut(&Song) -> SongSection,
{
    let prefix = column.id_prefix();
    group_by_track(songs)
        .iter()
        .map(|(label, group)| {
            let slug = track_slug(label);
            TrackSection {
                id: format!("{prefix}-nest-{slug}"),
                label: label.to_string(),
                songs: group
                    .iter()
                    .enumerate()
                    .map(|(index, song)| SongSection {
                        id: format!("{prefix}-song-{index}-{slug}"),
                        ..section(song)
                    })
                    .collect(),
            }
        })
        .collect()
}

fn column_with_tracks(column: Column, selector: Selector, tracks: Vec<TrackSection>) -> ColumnContent {
    let heading = tracks
        .first()
        .map(|track| track.label.clone())
        .unwrap_or_else(|| DEFAULT_TRACK_LABEL.to_string());
    ColumnContent {
        column,
        selector,
        heading: Some(heading),
        body: ColumnBody::Tracks(tracks),
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn song(track: &str, title: &str, english: Option<&str>) -> Song {
        let mut translations = serde_json::Map::new();
        let mut titles = serde_json::Map::new();
        titles.insert("português".into(), json!(title));
        if let Some(english) = english {
            translations.insert("english".into(), json!([format!("{english}|")]));
            titles.insert("english".into(), json!(english));
        }
        serde_json::from_value(json!({
            "author": "Mestre Bimba",
            "album": "Regional",
            "track": track,
            "type": "Quadra",
            "title": titles,
            "lyrics": { "português": [format!("{title}|")], "translations": translations }
        }))
        .unwrap()
    }

    #[test]
    fn both_columns_enumerate_the_same_tracks() {
        let songs = vec![
            song("Track 2", "c", Some("C")),
            song("Track 1", "a", Some("A")),
            song("Track 1", "b", None),
        ];
        let lyrics = render_lyrics(&songs, &[], Some("Mestre Bimba"));
        let translations = render_translations(&songs, Language::English, true);

        let expected = vec![("Track 1".to_string(), 2), ("Track 2".to_string(), 1)];
        assert_eq!(lyrics.song_counts(), expected);
        assert_eq!(translations.song_counts(), expected);
        assert_eq!(lyrics.heading.as_deref(), Some("Track 1"));
        assert_eq!(lyrics.tracks()[0].id, "lyrics-nest-Track-1");
        assert_eq!(translations.tracks()[0].songs[1].id, "trans-song-1-Track-1");
    }

    #[test]
    fn missing_translation_gets_inline_fallback() {
        let songs = vec![song("Track 1", "a", Some("A")), song("Track 1", "b", None)];
        let translations = render_translations(&songs, Language::Spanish, true);
        let sections = &translations.tracks()[0].songs;

        assert_eq!(
            sections[0].body,
            SongBody::Unavailable("Translation not available for Spanish".to_string())
        );
        assert_eq!(sections[1].title.as_deref(), Some("b"));

        let english = render_translations(&songs, Language::English, true);
        let sections = &english.tracks()[0].songs;
        assert_eq!(sections[0].title.as_deref(), Some("A"));
        assert_eq!(sections[0].body, SongBody::Lyrics(vec!["A|".to_string()]));
        assert!(matches!(sections[1].body, SongBody::Unavailable(_)));
    }

    #[test]
    fn missing_translated_title_falls_back_to_original() {
        let mut song = song("Track 1", "Original", Some("Translated"));
        song.title.remove("english");
        let translations = render_translations(&[song], Language::English, true);
        assert_eq!(
            translations.tracks()[0].songs[0].title.as_deref(),
            Some("Original")
        );
    }

    #[test]
    fn empty_song_list_renders_placeholders() {
        let authors = vec![AuthorIndexEntry {
            id: "mestre-bimba".into(),
            name: "Mestre Bimba".into(),
            file: "bimba.json".into(),
        }];
        let lyrics = render_lyrics(&[], &authors, None);
        assert_eq!(lyrics.heading.as_deref(), Some(SELECT_AUTHOR_HEADING));
        assert_eq!(lyrics.selector.display(), AUTHOR_PLACEHOLDER);
        assert_eq!(lyrics.selector.options.len(), 1);

        let translations = render_translations(&[], Language::English, true);
        assert!(!translations.selector.enabled);
        assert_eq!(
            translations.body,
            ColumnBody::Placeholder(NO_TRANSLATIONS_MESSAGE.to_string())
        );
    }

    #[test]
    fn selector_shows_selected_label() {
        let selector = Selector::language(Some(Language::Spanish), true);
        assert_eq!(selector.display(), "Spanish");
        assert_eq!(selector.options.len(), 2);
    }

    #[test]
    fn song_types_are_sorted_and_unique() {
        let mut songs = vec![song("Track 1", "a", None), song("Track 1", "b", None)];
        songs[1].song_type = "Ladainha".to_string();
        assert_eq!(song_types(&songs), vec!["Ladainha", "Quadra"]);
    }
}
