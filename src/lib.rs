//! Core library of the capoeira lyrics viewer: catalog loading, lyric
//! formatting, track grouping, column rendering, selection handling and the
//! scroll synchronization between the two columns. The `bin` target only adds
//! configuration, logging and the terminal loop on top.
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;
pub mod lyrics;
pub mod models;
pub mod render;
pub mod selection;
pub mod sync;
pub mod tracks;
pub mod ui;

pub use catalog::{CatalogLayout, CatalogLoader, CatalogSource, DirSource, HttpSource};
pub use config::{AppConfig, CliConfig, FileConfig, SourceConfig};
pub use error::{CatalogError, CatalogResult};
pub use lyrics::format_lyrics;
pub use models::{Language, Song};
pub use selection::SelectionController;
pub use tracks::group_by_track;
pub use ui::{run_app, App};
