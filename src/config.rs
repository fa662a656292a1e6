//! Configuration loading and management for tuttibot.
//!
//! Loads settings from `tuttibot.toml` with environment variable overrides for
//! the ledger directory and the mail command.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Target site layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Scheme and host, without trailing slash
    pub origin: String,
    pub locale: String,
    /// Path segment under which listings live
    pub listing_root: String,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Honour proxy settings from the environment
    pub use_proxy: bool,
}

/// Ledger storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Directory holding one ledger file per query
    pub dir: PathBuf,
    /// Create a ledger on first use instead of failing
    pub create_missing: bool,
}

/// Local mail transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Program invoked as `<command> -s <subject> -- <recipient>`
    pub command: String,
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

impl Config {
    /// Load configuration from the default location (tuttibot.toml in cwd or home),
    /// falling back to built-in defaults when neither exists
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::read(&path)?,
            None => {
                log::debug!("no config file found, using defaults");
                Config::default()
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.apply_env();
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    fn apply_env(&mut self) {
        if let Ok(dir) = std::env::var("TUTTIBOT_LEDGER_DIR") {
            self.ledger.dir = PathBuf::from(dir);
        }
        if let Ok(command) = std::env::var("TUTTIBOT_MAIL_COMMAND") {
            self.mail.command = command;
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from("tuttibot.toml");
        if local_config.exists() {
            return Some(local_config);
        }

        // Check home directory
        let home_config = dirs::home_dir()?
            .join(".config")
            .join("tuttibot")
            .join("tuttibot.toml");
        home_config.exists().then_some(home_config)
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://www.tutti.ch".to_string(),
            locale: "de".to_string(),
            listing_root: "li".to_string(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("tuttibot/", env!("CARGO_PKG_VERSION")).to_string(),
            use_proxy: true,
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./data"),
            create_missing: false,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            command: "mail".to_string(),
        }
    }
}
