//! Configuration
//!
//! Loaded from `~/.bountyhub/config.toml` (or `config.<profile>.toml`).
//! Every client is built from these values explicitly.

use std::fs;
use std::path::{Path, PathBuf};

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::BASE_CHAIN_ID;

/// Clanker factory on Base
pub const DEFAULT_CLANKER_FACTORY: &str = "0x2A787b2362021cc3eEa3C24C4748a6cD5B687382";

/// 0xSplits v2 pull-split factory on Base
pub const DEFAULT_SPLIT_FACTORY: &str = "0x6B9118074aB15142d7524E8c4ea8f62A3Bdb98f1";

/// Zora SDK API
pub const DEFAULT_ZORA_API_URL: &str = "https://api-sdk.zora.engineering/";

/// Campaign backend
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot find home directory")]
    NoHome,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("missing setting: {0}")]
    Missing(&'static str),
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub chain: ChainConfig,
    pub zora: ZoraConfig,
    pub output: OutputConfig,
}

/// Campaign backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Chain settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub clanker_factory: String,
    pub split_factory: String,
    /// Receives the campaign budget share of every split
    pub protocol_address: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://mainnet.base.org".into(),
            chain_id: BASE_CHAIN_ID,
            clanker_factory: DEFAULT_CLANKER_FACTORY.into(),
            split_factory: DEFAULT_SPLIT_FACTORY.into(),
            protocol_address: None,
        }
    }
}

impl ChainConfig {
    pub fn clanker_factory(&self) -> Result<Address, ConfigError> {
        parse_address("chain.clanker_factory", &self.clanker_factory)
    }

    pub fn split_factory(&self) -> Result<Address, ConfigError> {
        parse_address("chain.split_factory", &self.split_factory)
    }

    pub fn protocol_address(&self) -> Result<Address, ConfigError> {
        let raw = self
            .protocol_address
            .as_deref()
            .ok_or(ConfigError::Missing("chain.protocol_address"))?;
        parse_address("chain.protocol_address", raw)
    }
}

/// Zora API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoraConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub chain_id: u64,
    pub timeout_secs: u64,
}

impl Default for ZoraConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ZORA_API_URL.into(),
            api_key: None,
            chain_id: BASE_CHAIN_ID,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// CLI output settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_format: Option<String>,
}

fn parse_address(key: &str, raw: &str) -> Result<Address, ConfigError> {
    raw.trim().parse::<Address>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl AppConfig {
    /// Known dotted keys, in display order
    pub const KEYS: [&'static str; 12] = [
        "backend.url",
        "backend.timeout_secs",
        "chain.rpc_url",
        "chain.chain_id",
        "chain.clanker_factory",
        "chain.split_factory",
        "chain.protocol_address",
        "zora.api_url",
        "zora.api_key",
        "zora.chain_id",
        "zora.timeout_secs",
        "output.default_format",
    ];

    /// Load a profile; a missing file yields defaults
    pub fn load(profile: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path(profile)?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save(&self, profile: Option<&str>) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path(profile)?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn config_path(profile: Option<&str>) -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHome)?;
        let filename = match profile {
            Some(p) => format!("config.{}.toml", p),
            None => "config.toml".to_string(),
        };
        Ok(home.join(".bountyhub").join(filename))
    }

    /// Read a dotted key. Unset optional values read as `None`.
    pub fn get(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = match key {
            "backend.url" => Some(self.backend.url.clone()),
            "backend.timeout_secs" => Some(self.backend.timeout_secs.to_string()),
            "chain.rpc_url" => Some(self.chain.rpc_url.clone()),
            "chain.chain_id" => Some(self.chain.chain_id.to_string()),
            "chain.clanker_factory" => Some(self.chain.clanker_factory.clone()),
            "chain.split_factory" => Some(self.chain.split_factory.clone()),
            "chain.protocol_address" => self.chain.protocol_address.clone(),
            "zora.api_url" => Some(self.zora.api_url.clone()),
            "zora.api_key" => self.zora.api_key.clone(),
            "zora.chain_id" => Some(self.zora.chain_id.to_string()),
            "zora.timeout_secs" => Some(self.zora.timeout_secs.to_string()),
            "output.default_format" => self.output.default_format.clone(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Set a dotted key. An empty value clears optional settings.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "backend.url" => self.backend.url = value.trim().to_string(),
            "backend.timeout_secs" => self.backend.timeout_secs = parse_u64(key, value)?,
            "chain.rpc_url" => self.chain.rpc_url = value.trim().to_string(),
            "chain.chain_id" => self.chain.chain_id = parse_u64(key, value)?,
            "chain.clanker_factory" => {
                parse_address(key, value)?;
                self.chain.clanker_factory = value.trim().to_string();
            }
            "chain.split_factory" => {
                parse_address(key, value)?;
                self.chain.split_factory = value.trim().to_string();
            }
            "chain.protocol_address" => {
                if let Some(v) = optional(value) {
                    parse_address(key, &v)?;
                }
                self.chain.protocol_address = optional(value);
            }
            "zora.api_url" => self.zora.api_url = value.trim().to_string(),
            "zora.api_key" => self.zora.api_key = optional(value),
            "zora.chain_id" => self.zora.chain_id = parse_u64(key, value)?,
            "zora.timeout_secs" => self.zora.timeout_secs = parse_u64(key, value)?,
            "output.default_format" => self.output.default_format = optional(value),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
