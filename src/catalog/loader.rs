use std::sync::{Arc, OnceLock};

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::info;

use super::cache::AuthorCache;
use super::hierarchy::build_hierarchy;
use super::source::CatalogSource;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{slugify, Author, AuthorIndex, AuthorIndexEntry, Song, SongDocument};

/// Single-file catalog holding every song.
pub const MONOLITHIC_PATH: &str = "capoeira_lyrics.json";
/// Index of per-author shards.
pub const INDEX_PATH: &str = "authors-index.json";
/// Directory holding the per-author shards named by the index.
pub const SHARD_DIR: &str = "authors";

/// How the catalog is laid out on the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogLayout {
    /// One `capoeira_lyrics.json` with every song.
    Monolithic,
    /// `authors-index.json` plus one shard per author, fetched on demand.
    #[default]
    Sharded,
}

/// Loads songs from a [`CatalogSource`] and memoizes them per author.
///
/// The loader is shared between the UI thread and fetch workers through an
/// `Arc`, so all of its state is either set once or guarded.
pub struct CatalogLoader {
    source: Box<dyn CatalogSource>,
    layout: CatalogLayout,
    index: OnceLock<Vec<AuthorIndexEntry>>,
    cache: AuthorCache,
}

impl CatalogLoader {
    pub fn new(source: Box<dyn CatalogSource>, layout: CatalogLayout) -> Self {
        Self {
            source,
            layout,
            index: OnceLock::new(),
            cache: AuthorCache::new(),
        }
    }

    pub fn layout(&self) -> CatalogLayout {
        self.layout
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    /// Startup load: the author index for a sharded catalog, the whole song
    /// list for a monolithic one. Calling it again is a no-op.
    pub fn initialize(&self) -> CatalogResult<&[AuthorIndexEntry]> {
        if let Some(index) = self.index.get() {
            return Ok(index.as_slice());
        }
        let entries = match self.layout {
            CatalogLayout::Sharded => self.fetch_index()?,
            CatalogLayout::Monolithic => self.fetch_monolithic()?,
        };
        info!(
            authors = entries.len(),
            source = %self.source.describe(),
            "catalog index ready"
        );
        Ok(self.index.get_or_init(|| entries).as_slice())
    }

    /// Authors known from the index, empty until [`initialize`](Self::initialize) ran.
    pub fn available_authors(&self) -> &[AuthorIndexEntry] {
        self.index.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every song of the author with id `author_id`, fetched at most once.
    pub fn load_author(&self, author_id: &str) -> CatalogResult<Arc<Vec<Song>>> {
        if let Some(songs) = self.cache.get(author_id) {
            return Ok(songs);
        }

        let index = self.initialize()?;
        let entry = index
            .iter()
            .find(|entry| entry.id == author_id)
            .ok_or_else(|| CatalogError::UnknownAuthor(author_id.to_string()))?;

        match self.layout {
            // The monolithic load filled the cache for every indexed author.
            CatalogLayout::Monolithic => self
                .cache
                .get(author_id)
                .ok_or_else(|| CatalogError::UnknownAuthor(author_id.to_string())),
            CatalogLayout::Sharded => {
                let path = format!("{SHARD_DIR}/{}", entry.file);
                let body = self.source.fetch(&path)?;
                let document: SongDocument = parse(&path, &body)?;
                info!(author = %entry.name, songs = document.songs.len(), "loaded author shard");
                Ok(self.cache.insert(author_id, document.songs))
            }
        }
    }

    /// Songs credited to the author displayed as `author_name`. An author the
    /// index does not know yields an empty list rather than an error.
    pub fn songs_by_author(&self, author_name: &str) -> CatalogResult<Vec<Song>> {
        let index = self.initialize()?;
        let Some(entry) = index.iter().find(|entry| entry.name == author_name) else {
            return Ok(Vec::new());
        };
        let songs = self.load_author(&entry.id)?;
        Ok(songs
            .iter()
            .filter(|song| song.author == author_name)
            .cloned()
            .collect())
    }

    /// Author → album → track view of an already loaded author, if cached.
    pub fn author_summary(&self, author_id: &str) -> Option<Author> {
        let songs = self.cache.get(author_id)?;
        build_hierarchy(&songs).into_iter().next()
    }

    fn fetch_index(&self) -> CatalogResult<Vec<AuthorIndexEntry>> {
        let body = self.source.fetch(INDEX_PATH)?;
        let index: AuthorIndex = parse(INDEX_PATH, &body)?;
        Ok(index.authors)
    }

    fn fetch_monolithic(&self) -> CatalogResult<Vec<AuthorIndexEntry>> {
        let body = self.source.fetch(MONOLITHIC_PATH)?;
        let document: SongDocument = parse(MONOLITHIC_PATH, &body)?;

        let mut by_author: Vec<(String, Vec<Song>)> = Vec::new();
        for song in document.songs {
            match by_author.iter_mut().find(|(name, _)| *name == song.author) {
                Some((_, songs)) => songs.push(song),
                None => by_author.push((song.author.clone(), vec![song])),
            }
        }

        Ok(by_author
            .into_iter()
            .map(|(name, songs)| {
                let id = slugify(&name);
                self.cache.insert(&id, songs);
                AuthorIndexEntry {
                    id,
                    name,
                    file: MONOLITHIC_PATH.to_string(),
                }
            })
            .collect())
    }
}

fn parse<T: DeserializeOwned>(what: &str, body: &str) -> CatalogResult<T> {
    serde_json::from_str(body).map_err(|source| CatalogError::Parse {
        what: what.to_string(),
        source,
    })
}
