//! Catalog access split across logical submodules: where documents come from,
//! how they are cached, and how songs are grouped once loaded.

mod cache;
mod hierarchy;
mod loader;
mod source;

pub use cache::AuthorCache;
pub use hierarchy::build_hierarchy;
pub use loader::{CatalogLayout, CatalogLoader, INDEX_PATH, MONOLITHIC_PATH, SHARD_DIR};
pub use source::{cache_busted_url, CatalogSource, DirSource, HttpSource};
