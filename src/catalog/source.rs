//! Where catalog documents come from. The viewer only ever issues plain GETs
//! for static JSON, so a source is just "give me the body at this path".

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::blocking::Client;

use crate::error::{CatalogError, CatalogResult};

/// Read access to the static catalog files. Implementations are shared with
/// fetch worker threads, hence the `Send + Sync` bound.
pub trait CatalogSource: Send + Sync {
    /// Fetch the document stored at `path` (relative, e.g. `authors/bimba.json`).
    fn fetch(&self, path: &str) -> CatalogResult<String>;

    /// Short description for logs and the status line.
    fn describe(&self) -> String;
}

/// Build `<base>/<path>?cb=<stamp>`. Every HTTP request carries the
/// cache-busting parameter so a redeployed catalog is never served stale.
pub fn cache_busted_url(base_url: &str, path: &str, stamp_millis: u128) -> String {
    format!(
        "{}/{}?cb={}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/'),
        stamp_millis
    )
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

/// Fetches catalog files over HTTP.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> CatalogResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("capoeira-lyrics/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|source| CatalogError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

impl CatalogSource for HttpSource {
    fn fetch(&self, path: &str) -> CatalogResult<String> {
        let url = cache_busted_url(&self.base_url, path, now_millis());
        tracing::debug!(%url, "fetching catalog document");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| CatalogError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Http {
                url,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .map_err(|source| CatalogError::Transport { url, source })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Reads catalog files from a local directory laid out like the web root.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CatalogSource for DirSource {
    fn fetch(&self, path: &str) -> CatalogResult<String> {
        let full_path = self.root.join(path.trim_start_matches('/'));
        tracing::debug!(path = %full_path.display(), "reading catalog document");
        fs::read_to_string(&full_path).map_err(|source| CatalogError::Io {
            path: full_path,
            source,
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
