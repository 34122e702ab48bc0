//! Configuration for the boards client
//!
//! A single immutable [`Config`] is built at startup (defaults, or a TOML
//! file) and handed to every component that needs chain parameters.

use boards_math::DenomRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),
    #[error("Failed to write configuration file: {0}")]
    WriteError(String),
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
    #[error("Home directory not found")]
    HomeDirectoryNotFound,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    pub client: ClientConfig,
    pub gas: GasConfig,
    pub fees: FeesConfig,
    pub realm: RealmConfig,
    pub tokens: DenomRegistry,
}

/// Chain-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub id: String,
    /// Denomination fees are paid in
    pub fee_denom: String,
}

/// Node connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub node_url: String,
    pub timeout_seconds: u64,
    /// Hold a per-address lock from account fetch through broadcast
    pub serialize_submissions: bool,
}

/// Gas-related configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GasConfig {
    /// Fixed gas limit attached to every transaction
    pub default_limit: u64,
}

/// Fee configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeesConfig {
    /// Nominal fee amount in minimal units of `chain.fee_denom`
    pub amount: String,
}

/// Realm paths the client talks to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealmConfig {
    pub boards_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            chain: ChainConfig {
                id: "dev".to_string(),
                fee_denom: "ugnot".to_string(),
            },
            client: ClientConfig {
                node_url: "http://localhost:26657".to_string(),
                timeout_seconds: 30,
                serialize_submissions: true,
            },
            gas: GasConfig {
                default_limit: 2_000_000,
            },
            fees: FeesConfig {
                amount: "1".to_string(),
            },
            realm: RealmConfig {
                boards_path: "gno.land/r/boards".to_string(),
            },
            tokens: DenomRegistry::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults if the file doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from `<home>/config.toml`, or defaults when absent
    pub fn load_from_home(home: &Path) -> Result<Self, ConfigError> {
        let config_path = home.join("config.toml");

        if config_path.exists() {
            Self::load_from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::WriteError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::WriteError(format!("{}: {}", path.display(), e)))?;

        Ok(())
    }

    /// Get the default home directory
    pub fn default_home() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirectoryNotFound)?;
        Ok(home.join(".boards"))
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::default_home()?.join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.id.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "Chain ID must not be empty".to_string(),
            ));
        }

        if self.gas.default_limit == 0 {
            return Err(ConfigError::InvalidValue(
                "Gas default_limit must be positive".to_string(),
            ));
        }

        if self.fees.amount.is_empty() || !self.fees.amount.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::InvalidValue(format!(
                "Fee amount '{}' must be an integer of minimal units",
                self.fees.amount
            )));
        }

        if self.tokens.lookup(&self.chain.fee_denom).is_none() {
            return Err(ConfigError::InvalidValue(format!(
                "Fee denom '{}' is not in the token registry",
                self.chain.fee_denom
            )));
        }

        if let Some(denom) = self.tokens.duplicate_denom() {
            return Err(ConfigError::InvalidValue(format!(
                "Token denom '{denom}' is registered more than once"
            )));
        }

        if self.realm.boards_path.is_empty() {
            return Err(ConfigError::InvalidValue(
                "Boards realm path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Get request timeout as Duration
    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boards_math::TokenConfig;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chain.id, "dev");
        assert_eq!(config.gas.default_limit, 2_000_000);
        assert_eq!(config.fees.amount, "1");
        assert_eq!(config.realm.boards_path, "gno.land/r/boards");
        assert!(config.client.serialize_submissions);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.chain.fee_denom = "uatom".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.gas.default_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fees.amount = "0.5".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.tokens = DenomRegistry::new(vec![
            TokenConfig::new("ugnot", "GNOT", 6),
            TokenConfig::new("ugnot", "GNOT", 6),
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.chain.id = "test3".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(Config::load_from_home(path.parent().unwrap()).unwrap(), config);
    }

    #[test]
    fn test_load_from_home_defaults_when_missing() {
        let dir = tempdir().unwrap();
        assert_eq!(Config::load_from_home(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "chain = 3").unwrap();
        assert!(matches!(
            Config::load_from_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_utility_methods() {
        assert_eq!(Config::default().client_timeout(), Duration::from_secs(30));
    }
}
