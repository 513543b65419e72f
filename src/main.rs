//! Binary entry point: resolve configuration, set up the log file, build the
//! catalog loader and hand control to the terminal loop.
use std::path::PathBuf;

use anyhow::{Context, Result};
use capoeira_lyrics::catalog::{CatalogLayout, CatalogLoader, CatalogSource, DirSource, HttpSource};
use capoeira_lyrics::config::{self, AppConfig, CliConfig, FileConfig, SourceConfig};
use capoeira_lyrics::{logging, run_app, App};
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[clap(version, about = "Side-by-side capoeira lyrics and translations")]
struct CliArgs {
    /// Base URL the catalog JSON files are served from.
    #[clap(long)]
    pub base_url: Option<String>,

    /// Local directory holding the catalog JSON files.
    #[clap(long)]
    pub catalog_dir: Option<PathBuf>,

    /// How the catalog is split into files.
    #[clap(long, value_enum, default_value_t = CatalogLayout::Sharded)]
    pub layout: CatalogLayout,

    /// Terminal width at or below which the columns become swipeable panes.
    #[clap(long, default_value_t = config::DEFAULT_NARROW_WIDTH)]
    pub narrow_width: u16,

    /// Initial translation language (en or es).
    #[clap(long, default_value = "en")]
    pub language: String,

    /// Timeout in seconds for catalog requests.
    #[clap(long, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Path to a TOML config file. Defaults to ~/.capoeira-lyrics/config.toml
    /// when that file exists.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Log at debug level and show synchronization events in the footer.
    #[clap(long)]
    pub debug: bool,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            base_url: args.base_url.clone(),
            catalog_dir: args.catalog_dir.clone(),
            layout: args.layout,
            narrow_width: args.narrow_width,
            language: args.language.clone(),
            request_timeout_secs: args.timeout_secs,
            debug: args.debug,
        }
    }
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    let data_dir = config::data_dir()?;
    let log_path = logging::init(&data_dir, cli_args.debug)?;
    info!("Logging to {:?}", log_path);

    let config_path = match &cli_args.config {
        Some(path) => Some(path.clone()),
        None => Some(config::default_config_path()?).filter(|path| path.is_file()),
    };
    let file_config = match config_path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(FileConfig::load(&path)?)
        }
        None => None,
    };

    let cli_config: CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;
    info!("Configuration loaded:");
    info!("  source: {:?}", app_config.source);
    info!("  layout: {:?}", app_config.layout);
    info!("  language: {}", app_config.language);

    let source: Box<dyn CatalogSource> = match &app_config.source {
        SourceConfig::Http { base_url, timeout } => Box::new(
            HttpSource::new(base_url, *timeout).context("failed to create HTTP client")?,
        ),
        SourceConfig::Directory(dir) => Box::new(DirSource::new(dir.clone())),
    };
    let loader = CatalogLoader::new(source, app_config.layout);

    let (width, height) = crossterm::terminal::size().context("failed to read terminal size")?;
    let mut app = App::new(loader, &app_config, width, height);
    run_app(&mut app)
}
