//! Track grouping shared by both columns. Building the lyrics and the
//! translation column from the same `TrackGroups` is what keeps them aligned
//! label by label.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::Song;

/// Songs partitioned by track label.
///
/// Labels iterate in lexicographic order, so "Track 10" sorts before
/// "Track 2". Songs keep their catalog order inside each group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackGroups {
    groups: BTreeMap<String, Vec<Song>>,
}

impl TrackGroups {
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Song])> {
        self.groups
            .iter()
            .map(|(label, songs)| (label.as_str(), songs.as_slice()))
    }

    pub fn get(&self, label: &str) -> Option<&[Song]> {
        self.groups.get(label).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Stable partition of `songs` by their track label.
pub fn group_by_track(songs: &[Song]) -> TrackGroups {
    let mut groups: BTreeMap<String, Vec<Song>> = BTreeMap::new();
    for song in songs {
        groups.entry(song.track.clone()).or_default().push(song.clone());
    }
    TrackGroups { groups }
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Anchor-friendly form of a track label: every whitespace run becomes `-`,
/// leading and trailing ones included, and case is preserved
/// ("Track 1" -> "Track-1").
pub fn track_slug(label: &str) -> String {
    whitespace_pattern().replace_all(label, "-").into_owned()
}
