use anyhow::Context;
use blocksmith_editor::HistoryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "blocksmith.config.json";
pub const DEFAULT_PROJECT_FILE: &str = "project.json";

/// Blocksmith configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Where `export` writes index.html and styles.css
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// `<title>` of exported pages
    #[serde(default = "default_page_title")]
    pub page_title: String,

    /// Directory holding uploaded image blobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets_dir: Option<String>,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub mode: ImportMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Section list with column assignment and dedupe
    #[default]
    Sections,
    /// Flat component list wrapped in one section
    Flat,
}

fn default_out_dir() -> String {
    "dist".to_string()
}

fn default_page_title() -> String {
    "Exported Page".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Cannot read {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", DEFAULT_CONFIG_NAME))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn get_out_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.out_dir)
    }

    pub fn get_assets_dir(&self, cwd: &Path) -> Option<PathBuf> {
        self.assets_dir.as_ref().map(|dir| cwd.join(dir))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            page_title: default_page_title(),
            assets_dir: None,
            history: HistoryConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "outDir": "public",
            "pageTitle": "Launch",
            "assetsDir": "uploads",
            "history": { "capacity": 10, "throttleMs": 250 },
            "import": { "mode": "flat" }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.out_dir, "public");
        assert_eq!(config.page_title, "Launch");
        assert_eq!(config.assets_dir.as_deref(), Some("uploads"));
        assert_eq!(config.history.capacity, 10);
        assert_eq!(config.history.throttle_ms, 250);
        assert_eq!(config.import.mode, ImportMode::Flat);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "history": { "capacity": 3 } }"#).unwrap();
        assert_eq!(config.out_dir, "dist");
        assert_eq!(config.page_title, "Exported Page");
        assert_eq!(config.history.capacity, 3);
        assert_eq!(config.history.throttle_ms, 1000);
        assert_eq!(config.import.mode, ImportMode::Sections);
    }

    #[test]
    fn test_missing_config_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.out_dir, "dist");
        assert!(config.get_assets_dir(dir.path()).is_none());
    }
}
