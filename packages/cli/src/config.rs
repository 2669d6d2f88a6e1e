use folio_editor::FocusConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory of extra `*.json` theme files
    #[serde(default = "default_themes_dir")]
    pub themes_dir: String,

    /// Directory holding one `<id>.json` file per document
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Preview-to-panel focus timing
    #[serde(default)]
    pub focus: FocusSettings,
}

fn default_themes_dir() -> String {
    "themes".to_string()
}

fn default_store_dir() -> String {
    "data".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FocusSettings {
    pub max_attempts: u32,
    pub poll_delay_ms: u64,
    pub highlight_ms: u64,
}

impl Default for FocusSettings {
    fn default() -> Self {
        let defaults = FocusConfig::default();
        Self {
            max_attempts: defaults.max_attempts,
            poll_delay_ms: defaults.poll_delay.as_millis() as u64,
            highlight_ms: defaults.highlight.as_millis() as u64,
        }
    }
}

impl From<&FocusSettings> for FocusConfig {
    fn from(settings: &FocusSettings) -> Self {
        FocusConfig {
            max_attempts: settings.max_attempts.max(1),
            poll_delay: Duration::from_millis(settings.poll_delay_ms),
            highlight: Duration::from_millis(settings.highlight_ms),
        }
    }
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!("Loaded config from {:?}", config_path);
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn get_themes_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.themes_dir)
    }

    pub fn get_store_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.store_dir)
    }

    pub fn focus_config(&self) -> FocusConfig {
        FocusConfig::from(&self.focus)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            themes_dir: default_themes_dir(),
            store_dir: default_store_dir(),
            focus: FocusSettings::default(),
        }
    }
}
