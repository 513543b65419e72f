use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::CatalogLayout;

/// Optional settings read from `config.toml`. Every field left out keeps the
/// value given on the command line.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    // Catalog source, at most one of the two
    pub base_url: Option<String>,
    pub catalog_dir: Option<String>,
    pub layout: Option<CatalogLayout>,
    pub request_timeout_secs: Option<u64>,

    // Viewer
    pub narrow_width: Option<u16>,
    pub language: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("failed to parse config file: {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_leaves_other_fields_unset() {
        let file = FileConfig::parse(
            r#"
            base_url = "https://example.org/lyrics"
            layout = "monolithic"
            "#,
        )
        .unwrap();
        assert_eq!(file.base_url.as_deref(), Some("https://example.org/lyrics"));
        assert_eq!(file.layout, Some(CatalogLayout::Monolithic));
        assert_eq!(file.narrow_width, None);
        assert_eq!(file.catalog_dir, None);
    }

    #[test]
    fn unknown_layout_is_rejected() {
        assert!(FileConfig::parse(r#"layout = "chunked""#).is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "narrow_width = 90\nlanguage = \"es\"\n").unwrap();

        let file = FileConfig::load(&path).unwrap();
        assert_eq!(file.narrow_width, Some(90));
        assert_eq!(file.language.as_deref(), Some("es"));
        assert!(FileConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
