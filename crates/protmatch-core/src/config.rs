use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProtmatchConfig {
    #[serde(default)]
    pub uniprot: UniProtConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniProtConfig {
    /// Base URL serving `{accession}.fasta` records.
    #[serde(default = "default_fasta_endpoint")]
    pub fasta_endpoint: String,

    /// Base URL of the Proteins API JSON entries.
    #[serde(default = "default_json_endpoint")]
    pub json_endpoint: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Characters per sequence line; 0 disables wrapping.
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,

    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

fn default_fasta_endpoint() -> String {
    "https://rest.uniprot.org/uniprotkb".to_string()
}
fn default_json_endpoint() -> String {
    "https://www.ebi.ac.uk/proteins/api/proteins".to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_wrap_width() -> usize {
    60
}
fn default_tick_rate() -> u64 {
    100
}

impl Default for UniProtConfig {
    fn default() -> Self {
        Self {
            fasta_endpoint: default_fasta_endpoint(),
            json_endpoint: default_json_endpoint(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            wrap_width: default_wrap_width(),
            tick_rate_ms: default_tick_rate(),
        }
    }
}

impl ProtmatchConfig {
    /// Load config from ~/.config/protmatch/config.toml, creating defaults if missing.
    pub fn load() -> crate::error::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|e| {
                crate::error::ProtmatchError::Config(format!("Failed to read config: {e}"))
            })?;
            Self::from_toml(&contents)
        } else {
            let config = ProtmatchConfig::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Parse a config document; missing tables and keys take their defaults.
    pub fn from_toml(contents: &str) -> crate::error::Result<Self> {
        toml::from_str(contents).map_err(|e| {
            crate::error::ProtmatchError::Config(format!("Failed to parse config: {e}"))
        })
    }

    /// Save config to disk.
    pub fn save(&self) -> crate::error::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self).map_err(|e| {
            crate::error::ProtmatchError::Config(format!("Failed to serialize config: {e}"))
        })?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the config file path.
    pub fn config_path() -> crate::error::Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            crate::error::ProtmatchError::Config("Could not determine config directory".into())
        })?;
        Ok(config_dir.join("protmatch").join("config.toml"))
    }
}
