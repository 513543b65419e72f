//! Runtime configuration: command line values, optionally overridden by a
//! TOML file, resolved into one [`AppConfig`].

mod file_config;

pub use file_config::FileConfig;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use directories::BaseDirs;

use crate::catalog::CatalogLayout;
use crate::models::Language;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".capoeira-lyrics";
const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_NARROW_WIDTH: u16 = 100;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Values taken from the command line.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub base_url: Option<String>,
    pub catalog_dir: Option<PathBuf>,
    pub layout: CatalogLayout,
    pub narrow_width: u16,
    pub language: String,
    pub request_timeout_secs: u64,
    pub debug: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            catalog_dir: None,
            layout: CatalogLayout::default(),
            narrow_width: DEFAULT_NARROW_WIDTH,
            language: Language::English.code().to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
        }
    }
}

/// Where the catalog comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Http { base_url: String, timeout: Duration },
    Directory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub layout: CatalogLayout,
    pub narrow_width: u16,
    pub language: Language,
    pub debug: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and an optional TOML file.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let base_url = file
            .base_url
            .or_else(|| cli.base_url.clone())
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        let catalog_dir = file
            .catalog_dir
            .map(PathBuf::from)
            .or_else(|| cli.catalog_dir.clone());

        let timeout =
            Duration::from_secs(file.request_timeout_secs.unwrap_or(cli.request_timeout_secs));
        let source = match (base_url, catalog_dir) {
            (Some(_), Some(_)) => {
                bail!("base_url and catalog_dir are both set; configure exactly one catalog source")
            }
            (None, None) => bail!(
                "a catalog source must be specified via --base-url, --catalog-dir or in the config file"
            ),
            (Some(base_url), None) => {
                if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                    bail!("base_url must be an http(s) URL: {base_url}");
                }
                SourceConfig::Http { base_url, timeout }
            }
            (None, Some(dir)) => {
                if !dir.is_dir() {
                    bail!("catalog directory does not exist: {:?}", dir);
                }
                SourceConfig::Directory(dir)
            }
        };

        let layout = file.layout.unwrap_or(cli.layout);
        let narrow_width = file.narrow_width.unwrap_or(cli.narrow_width);
        let language_code = file.language.unwrap_or_else(|| cli.language.clone());
        let mut language = Language::from_code(&language_code);
        if language.is_original() {
            // The translation column never shows the original language.
            language = Language::English;
        }

        Ok(Self {
            source,
            layout,
            narrow_width,
            language,
            debug: cli.debug,
        })
    }
}

/// Application data directory (`~/.capoeira-lyrics`), home of the config
/// file and the log.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Config file picked up when `--config` is not given.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with_url() -> CliConfig {
        CliConfig {
            base_url: Some("https://lyrics.example.org".to_string()),
            ..CliConfig::default()
        }
    }

    #[test]
    fn cli_values_apply_without_file() {
        let config = AppConfig::resolve(&cli_with_url(), None).unwrap();
        assert_eq!(
            config.source,
            SourceConfig::Http {
                base_url: "https://lyrics.example.org".to_string(),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            }
        );
        assert_eq!(config.layout, CatalogLayout::Sharded);
        assert_eq!(config.narrow_width, DEFAULT_NARROW_WIDTH);
        assert_eq!(config.language, Language::English);
    }

    #[test]
    fn file_values_override_cli() {
        let file = FileConfig {
            layout: Some(CatalogLayout::Monolithic),
            narrow_width: Some(80),
            language: Some("es".to_string()),
            ..FileConfig::default()
        };
        let config = AppConfig::resolve(&cli_with_url(), Some(file)).unwrap();
        assert_eq!(config.layout, CatalogLayout::Monolithic);
        assert_eq!(config.narrow_width, 80);
        assert_eq!(config.language, Language::Spanish);
    }

    #[test]
    fn exactly_one_source_is_required() {
        assert!(AppConfig::resolve(&CliConfig::default(), None).is_err());

        let dir = tempfile::tempdir().unwrap();
        let file = FileConfig {
            catalog_dir: Some(dir.path().to_string_lossy().into_owned()),
            ..FileConfig::default()
        };
        assert!(AppConfig::resolve(&cli_with_url(), Some(file.clone())).is_err());

        let config = AppConfig::resolve(&CliConfig::default(), Some(file)).unwrap();
        assert_eq!(config.source, SourceConfig::Directory(dir.path().to_path_buf()));
    }

    #[test]
    fn missing_directory_and_bad_url_are_rejected() {
        let cli = CliConfig {
            catalog_dir: Some(PathBuf::from("/definitely/not/here")),
            ..CliConfig::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());

        let cli = CliConfig {
            base_url: Some("ftp://lyrics.example.org".to_string()),
            ..CliConfig::default()
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn original_language_falls_back_to_english() {
        let cli = CliConfig {
            language: "pt".to_string(),
            ..cli_with_url()
        };
        assert_eq!(
            AppConfig::resolve(&cli, None).unwrap().language,
            Language::English
        );
    }
}
