//! TOML configuration for authorization and the mailbox run

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::auth::READONLY_SCOPES;
use crate::error::{GmailError, Result};
use crate::subject::HeaderMatch;

/// Upper bound accepted by `users.messages.list` for `maxResults`
pub const MAX_RESULTS_LIMIT: u32 = 500;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub mailbox: MailboxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,
    /// Build the client secret from GMAIL_CLIENT_ID / GMAIL_CLIENT_SECRET instead of a file
    #[serde(default)]
    pub credentials_from_env: bool,
    #[serde(default = "default_token_dir")]
    pub token_dir: PathBuf,
    /// Key of the cached token inside `token_dir`
    #[serde(default = "default_user_label")]
    pub user_label: String,
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,
    #[serde(default = "default_authorization_timeout_secs")]
    pub authorization_timeout_secs: u64,
    #[serde(default = "default_scopes")]
    pub scopes: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            credentials_from_env: false,
            token_dir: default_token_dir(),
            user_label: default_user_label(),
            redirect_port: default_redirect_port(),
            authorization_timeout_secs: default_authorization_timeout_secs(),
            scopes: default_scopes(),
        }
    }
}

impl AuthConfig {
    /// File holding the persisted token for `user_label`
    pub fn token_cache_path(&self) -> PathBuf {
        self.token_dir.join(format!("{}.json", self.user_label))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MailboxConfig {
    #[serde(default = "default_application_name")]
    pub application_name: String,
    #[serde(default = "default_owner")]
    pub owner: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default)]
    pub case_insensitive_headers: bool,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            application_name: default_application_name(),
            owner: default_owner(),
            max_results: default_max_results(),
            case_insensitive_headers: false,
        }
    }
}

impl MailboxConfig {
    pub fn header_match(&self) -> HeaderMatch {
        if self.case_insensitive_headers {
            HeaderMatch::IgnoreCase
        } else {
            HeaderMatch::Exact
        }
    }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub credentials_path: Option<PathBuf>,
    pub token_dir: Option<PathBuf>,
    pub owner: Option<String>,
    pub max_results: Option<u32>,
    pub redirect_port: Option<u16>,
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_dir() -> PathBuf {
    PathBuf::from(".gmail-subjects/tokens")
}

fn default_user_label() -> String {
    "user".to_string()
}

fn default_redirect_port() -> u16 {
    8888
}

fn default_authorization_timeout_secs() -> u64 {
    300
}

fn default_scopes() -> Vec<String> {
    READONLY_SCOPES.iter().map(|s| s.to_string()).collect()
}

fn default_application_name() -> String {
    "Gmail Subject Reader".to_string()
}

fn default_owner() -> String {
    "me".to_string()
}

fn default_max_results() -> u32 {
    10
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        // If file doesn't exist, return default config with warning
        if !path.exists() {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| GmailError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| GmailError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                GmailError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| GmailError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        tokio::fs::write(path, content)
            .await
            .map_err(|e| GmailError::ConfigError(format!("Failed to write config file: {}", e)))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Apply command-line overrides, then re-validate
    pub fn apply_overrides(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(path) = overrides.credentials_path {
            self.auth.credentials_path = path;
        }
        if let Some(dir) = overrides.token_dir {
            self.auth.token_dir = dir;
        }
        if let Some(port) = overrides.redirect_port {
            self.auth.redirect_port = port;
        }
        if let Some(owner) = overrides.owner {
            self.mailbox.owner = owner;
        }
        if let Some(max_results) = overrides.max_results {
            self.mailbox.max_results = max_results;
        }
        self.validate()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.auth.user_label.trim().is_empty() {
            return Err(GmailError::ConfigError(
                "auth.user_label cannot be empty".to_string(),
            ));
        }
        if self.auth.user_label.contains(['/', '\\']) {
            return Err(GmailError::ConfigError(
                "auth.user_label cannot contain path separators".to_string(),
            ));
        }
        if self.auth.redirect_port == 0 {
            return Err(GmailError::ConfigError(
                "auth.redirect_port must be a fixed, non-zero port".to_string(),
            ));
        }
        if self.auth.authorization_timeout_secs == 0 {
            return Err(GmailError::ConfigError(
                "auth.authorization_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.auth.scopes.is_empty() || self.auth.scopes.iter().any(|s| s.trim().is_empty()) {
            return Err(GmailError::ConfigError(
                "auth.scopes must contain at least one non-empty scope".to_string(),
            ));
        }

        if self.mailbox.application_name.trim().is_empty() {
            return Err(GmailError::ConfigError(
                "mailbox.application_name cannot be empty".to_string(),
            ));
        }
        if self.mailbox.owner.trim().is_empty() {
            return Err(GmailError::ConfigError(
                "mailbox.owner cannot be empty".to_string(),
            ));
        }
        if self.mailbox.max_results == 0 {
            return Err(GmailError::ConfigError(
                "mailbox.max_results must be at least 1".to_string(),
            ));
        }
        if self.mailbox.max_results > MAX_RESULTS_LIMIT {
            return Err(GmailError::ConfigError(format!(
                "mailbox.max_results cannot exceed {} (Gmail API page size limit)",
                MAX_RESULTS_LIMIT
            )));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /// Create an example configuration file
    pub async fn create_example(path: &Path) -> Result<()> {
        let config = Self::default();
        config.save(path).await
    }
}
