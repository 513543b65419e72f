use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::Song;

/// Per-author song cache keyed by author id.
///
/// Entries are written once and never invalidated or evicted. The map sits
/// behind a mutex since fetch workers fill it from their own threads.
#[derive(Default)]
pub struct AuthorCache {
    entries: Mutex<HashMap<String, Arc<Vec<Song>>>>,
}

impl AuthorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, author_id: &str) -> Option<Arc<Vec<Song>>> {
        self.lock().get(author_id).cloned()
    }

    /// Store `songs` unless the author is already cached, and return whatever
    /// the cache holds afterwards. The first write wins.
    pub fn insert(&self, author_id: &str, songs: Vec<Song>) -> Arc<Vec<Song>> {
        self.lock()
            .entry(author_id.to_string())
            .or_insert_with(|| Arc::new(songs))
            .clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Vec<Song>>>> {
        // A panicking writer cannot leave a half-inserted entry behind, so the
        // map is still usable after poisoning.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_wins() {
        let cache = AuthorCache::new();
        assert!(cache.get("bimba").is_none());

        let stored = cache.insert("bimba", Vec::new());
        assert!(stored.is_empty());

        let song: Song = serde_json::from_str(
            r#"{"author":"Bimba","album":"A","track":"Track 1","lyrics":{}}"#,
        )
        .unwrap();
        let second = cache.insert("bimba", vec![song]);
        assert!(second.is_empty());
        assert_eq!(cache.get("bimba").map(|songs| songs.len()), Some(0));
    }
}
