//! Configuration management for bloodbank.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults. The
//! relay credentials live here too; they are handed to the notification
//! gateway explicitly rather than looked up globally.

use std::fmt;
use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "bloodbank";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "BLOODBANK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BLOODBANK_`, `__` between
///    section and key, e.g. `BLOODBANK_RELAY__AUTH_TOKEN`)
/// 2. TOML config file at `~/.config/bloodbank/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Messaging relay configuration.
    pub relay: RelayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the table files.
    /// Defaults to `~/.local/share/bloodbank`
    pub data_dir: Option<PathBuf>,
    /// File name of the users table.
    pub users_file: String,
    /// File name of the donors table.
    pub donors_file: String,
}

/// Messaging relay configuration (Twilio-compatible).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Relay account identifier.
    pub account_sid: String,
    /// Relay auth token. Never printed.
    pub auth_token: String,
    /// Sender address, e.g. `whatsapp:+14155238886`.
    pub from_address: String,
    /// Channel scheme prepended to recipient numbers.
    pub channel: String,
    /// Base URL of the relay API.
    pub api_base: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to default at runtime
            users_file: "users.csv".to_string(),
            donors_file: "donors.csv".to_string(),
        }
    }
}

impl StorageConfig {
    /// Get the data directory, resolving the default if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(Config::default_data_dir)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_address: String::new(),
            channel: "whatsapp".to_string(),
            api_base: "https://api.twilio.com".to_string(),
        }
    }
}

impl RelayConfig {
    /// Check whether credentials and a sender address are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from_address.is_empty()
    }

    /// Prefix a recipient with the channel scheme, e.g. `whatsapp:+15551234`.
    ///
    /// A recipient that already carries the scheme is returned unchanged.
    #[must_use]
    pub fn channel_address(&self, recipient: &str) -> String {
        let prefix = format!("{}:", self.channel);
        if recipient.starts_with(&prefix) {
            recipient.to_string()
        } else {
            format!("{prefix}{recipient}")
        }
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &redact(&self.auth_token))
            .field("from_address", &self.from_address)
            .field("channel", &self.channel)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Mask a secret for display.
#[must_use]
pub fn redact(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let storage = &self.storage;
        for (key, name) in [
            ("users_file", &storage.users_file),
            ("donors_file", &storage.donors_file),
        ] {
            if name.trim().is_empty() {
                return Err(Error::config_validation(format!("{key} must not be empty")));
            }
        }
        if storage.users_file == storage.donors_file {
            return Err(Error::config_validation(format!(
                "users_file and donors_file must differ (both are {})",
                storage.users_file
            )));
        }

        let relay = &self.relay;
        let channel_pattern = Regex::new(r"^[a-z][a-z0-9+.-]*$").map_err(|e| {
            Error::config_validation(format!("channel pattern failed to compile: {e}"))
        })?;
        if !channel_pattern.is_match(&relay.channel) {
            return Err(Error::config_validation(format!(
                "channel must be a lowercase scheme such as \"whatsapp\", got {:?}",
                relay.channel
            )));
        }

        if !relay.from_address.is_empty() {
            let from_pattern = Regex::new(&format!(
                r"^{}:\+[0-9]+$",
                regex::escape(&relay.channel)
            ))
            .map_err(|e| {
                Error::config_validation(format!("from_address pattern failed to compile: {e}"))
            })?;
            if !from_pattern.is_match(&relay.from_address) {
                return Err(Error::config_validation(format!(
                    "from_address must look like {}:+14155238886, got {:?}",
                    relay.channel, relay.from_address
                )));
            }
        }

        if reqwest::Url::parse(&relay.api_base).is_err() {
            return Err(Error::config_validation(format!(
                "api_base is not a valid URL: {}",
                relay.api_base
            )));
        }

        Ok(())
    }

    /// A JSON view of the configuration with the auth token masked.
    #[must_use]
    pub fn redacted_json(&self) -> serde_json::Value {
        serde_json::json!({
            "storage": {
                "data_dir": self.storage.data_dir(),
                "users_file": self.storage.users_file,
                "donors_file": self.storage.donors_file,
            },
            "relay": {
                "account_sid": self.relay.account_sid,
                "auth_token": redact(&self.relay.auth_token),
                "from_address": self.relay.from_address,
                "channel": self.relay.channel,
                "api_base": self.relay.api_base,
            },
        })
    }
}
