use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
///
/// Loaded from the config file with defaults for anything missing, so a
/// half-written or absent file never blocks startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load config from the default location, or defaults if there is none.
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk, creating the directory if needed.
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// `<config_dir>/proteinvalue/config.toml` - XDG on Unix, AppData on
    /// Windows.
    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::Config("Could not find config directory".into()))?
            .join("proteinvalue");

        Ok(config_dir.join("config.toml"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Override for the data directory; default is the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Barcode database API base URL.
    #[serde(default = "default_lookup_url")]
    pub api_url: String,

    /// Kill switch for all network lookups; manual entry always works.
    #[serde(default = "default_lookup_enabled")]
    pub enabled: bool,
}

fn default_lookup_url() -> String {
    "https://world.openfoodfacts.org/api/v2".to_string()
}

fn default_lookup_enabled() -> bool {
    true
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            api_url: default_lookup_url(),
            enabled: default_lookup_enabled(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Currency symbol for table output. Cosmetic only - the engine is
    /// single-currency and unit-agnostic.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Sort key used when `list` is called without one.
    #[serde(default = "default_sort")]
    pub default_sort: String,
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_sort() -> String {
    "cost-asc".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            default_sort: default_sort(),
        }
    }
}
