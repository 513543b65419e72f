use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while fetching or decoding catalog data.
///
/// The `Display` text is what ends up in the column error message, so each
/// variant reads as a sentence a listener can act on.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to load {url}: HTTP {status}")]
    Http { url: String, status: u16 },

    #[error("Failed to reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {what}: {source}")]
    Parse {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Author {0} not found in index")]
    UnknownAuthor(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
