use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Modal layer settings
    pub modal: ModalConfig,

    /// Terminal demo settings
    pub tui: TuiConfig,

    /// Tracing filter directive, e.g. `nice_modal=debug`
    pub log_filter: Option<String>,
}

/// Settings for the modal layer
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Prefix of ids generated for component references
    pub id_prefix: String,

    /// Warn when a shown id has no component and was never mounted
    pub warn_unknown: bool,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            id_prefix: "_nice_modal_".to_string(),
            warn_unknown: true,
        }
    }
}

/// Settings for the interactive demo
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick interval in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: 100,
        }
    }
}

impl Config {
    /// Initialize configuration from an optional explicit file, the default
    /// file locations and the environment
    pub async fn init(path: Option<&Path>) -> Result<Self> {
        debug!("Initializing configuration");

        let mut config = match path {
            Some(path) => Self::load_file(path).await?,
            None => Self::load_from_file().await?.unwrap_or_default(),
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(&mut self) {
        if let Ok(prefix) = std::env::var("NICE_MODAL_ID_PREFIX") {
            self.modal.id_prefix = prefix;
        }

        if let Ok(warn) = std::env::var("NICE_MODAL_WARN_UNKNOWN") {
            self.modal.warn_unknown = warn.to_lowercase() == "true";
        }

        if let Ok(tick_str) = std::env::var("NICE_MODAL_TICK_MS") {
            if let Ok(tick) = tick_str.parse() {
                self.tui.tick_rate_ms = tick;
            }
        }

        if let Ok(filter) = std::env::var("NICE_MODAL_LOG") {
            self.log_filter = Some(filter);
        }
    }

    /// Load configuration from the first nice-modal.json found
    pub async fn load_from_file() -> Result<Option<Self>> {
        // 1. ./.nice-modal.json
        // 2. ./nice-modal.json
        // 3. $CONFIG_DIR/nice-modal/config.json
        let mut config_paths = vec![
            PathBuf::from("./.nice-modal.json"),
            PathBuf::from("./nice-modal.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            config_paths.push(config_dir.join("nice-modal").join("config.json"));
        }

        for path in config_paths {
            if path.exists() {
                return Self::load_file(&path).await.map(Some);
            }
        }

        Ok(None)
    }

    /// Load configuration from a specific file
    pub async fn load_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from: {}", path.display());
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.modal.id_prefix.is_empty() {
            return Err(anyhow::anyhow!("modal.id_prefix must not be empty"));
        }

        if self.tui.tick_rate_ms == 0 {
            return Err(anyhow::anyhow!("tui.tick_rate_ms must be greater than 0"));
        }

        Ok(())
    }
}
