//! Domain models for the lyrics catalog. These types mirror the JSON documents
//! served next to the viewer and stay light-weight data holders so the catalog,
//! renderer and front-end can focus on their own concerns.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of languages the catalog carries. Portuguese is the
/// original language of every song; the other two are translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Portuguese,
    English,
    Spanish,
}

impl Language {
    /// Every supported language, original first.
    pub const ALL: [Language; 3] = [Language::Portuguese, Language::English, Language::Spanish];

    /// Languages offered by the translation column selector.
    pub const TRANSLATIONS: [Language; 2] = [Language::English, Language::Spanish];

    /// Key used for this language inside the `title` and `lyrics` objects.
    pub fn storage_key(self) -> &'static str {
        match self {
            Language::Portuguese => "português",
            Language::English => "english",
            Language::Spanish => "español",
        }
    }

    /// Short code used as the selector value.
    pub fn code(self) -> &'static str {
        match self {
            Language::Portuguese => "pt",
            Language::English => "en",
            Language::Spanish => "es",
        }
    }

    /// Human-readable name shown in selectors and fallback messages.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Portuguese => "Portuguese",
            Language::English => "English",
            Language::Spanish => "Spanish",
        }
    }

    pub fn is_original(self) -> bool {
        self == Language::Portuguese
    }

    /// Resolve a selector value, storage key or display name. Anything we do
    /// not recognize falls back to the original language instead of failing.
    pub fn from_code(value: &str) -> Language {
        let needle = value.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|language| {
                needle == language.code()
                    || needle == language.storage_key()
                    || needle == language.display_name().to_lowercase()
            })
            .unwrap_or(Language::Portuguese)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single song as stored in the catalog. Songs are immutable once loaded.
pub struct Song {
    pub author: String,
    pub album: String,
    /// Free-text track label ("Track 1"). Compared as an opaque string.
    pub track: String,
    /// Genre or category of the song (for example "Ladainha").
    #[serde(rename = "type", default)]
    pub song_type: String,
    /// Titles keyed by language storage key. Missing entries are tolerated so
    /// one malformed record cannot take down a whole shard.
    #[serde(default)]
    pub title: BTreeMap<String, String>,
    pub lyrics: SongLyrics,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SongLyrics {
    /// Original-language lines, still carrying inline `^`, `*` and `|` markers.
    #[serde(rename = "português", default)]
    pub original: Vec<String>,
    #[serde(default)]
    pub translations: BTreeMap<String, Vec<String>>,
}

impl Song {
    /// Title in the original language, or an empty string if the record lacks it.
    pub fn original_title(&self) -> &str {
        self.title
            .get(Language::Portuguese.storage_key())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Title for `language`, if present and non-blank.
    pub fn title_for(&self, language: Language) -> Option<&str> {
        self.title
            .get(language.storage_key())
            .map(String::as_str)
            .filter(|title| !title.trim().is_empty())
    }

    /// Raw lyric lines for `language`. Returns `None` when the record has no
    /// lines for it, which is how the renderer decides to show a fallback.
    pub fn lyrics_for(&self, language: Language) -> Option<&[String]> {
        let lines = if language.is_original() {
            Some(&self.lyrics.original)
        } else {
            self.lyrics.translations.get(language.storage_key())
        };
        lines.map(Vec::as_slice).filter(|lines| !lines.is_empty())
    }
}

/// An author aggregated from the songs that name them.
#[derive(Debug, Clone, PartialEq)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub albums: Vec<Album>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub songs: Vec<Song>,
}

/// Entry of `authors-index.json`: where to find one author's shard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorIndexEntry {
    pub id: String,
    pub name: String,
    pub file: String,
}

impl fmt::Display for AuthorIndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Body of `authors-index.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorIndex {
    #[serde(default)]
    pub authors: Vec<AuthorIndexEntry>,
}

/// Body of the monolithic catalog and of every per-author shard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SongDocument {
    #[serde(default)]
    pub songs: Vec<Song>,
}

/// Lowercase `name` and collapse every whitespace run into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(ch.to_lowercase());
            in_space = false;
        }
    }
    slug
}
