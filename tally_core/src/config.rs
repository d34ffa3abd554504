//! Configuration file support for Tally.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/tally/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub goal: GoalConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Display unit configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Metric (kg) or imperial (lb) mass display
    #[serde(default)]
    pub use_metric: bool,

    /// Water display unit: ml, l, fl oz, or gal
    #[serde(default = "default_water_unit")]
    pub water_unit: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_metric: false,
            water_unit: default_water_unit(),
        }
    }
}

/// Goal resolution parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalConfig {
    /// Lower bound for resolved daily calorie goals
    #[serde(default = "default_safety_floor_kcal")]
    pub safety_floor_kcal: u32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            safety_floor_kcal: default_safety_floor_kcal(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("tally")
}

fn default_water_unit() -> String {
    "fl oz".into()
}

fn default_safety_floor_kcal() -> u32 {
    1200
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("tally").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.display.use_metric);
        assert_eq!(config.display.water_unit, "fl oz");
        assert_eq!(config.goal.safety_floor_kcal, 1200);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.display.water_unit, parsed.display.water_unit);
        assert_eq!(
            config.goal.safety_floor_kcal,
            parsed.goal.safety_floor_kcal
        );
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[display]
use_metric = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.display.use_metric);
        assert_eq!(config.display.water_unit, "fl oz"); // default
        assert_eq!(config.goal.safety_floor_kcal, 1200); // default
    }
}
