//! Configuration management for Memebot
//!
//! Settings come from an optional TOML file; every field has a default so the
//! bot runs without one. The access token is never read from the file: it
//! comes from `MASTODON_TOKEN` and is held in a [`SecretString`].

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

pub const DEFAULT_FEED_URL: &str = "https://memes.sucho.org/rss.xml";
pub const DEFAULT_INSTANCE: &str = "https://mastodon.online";
pub const DEFAULT_LEDGER_PATH: &str = "posted.log";

/// Mastodon's default status length limit
pub const DEFAULT_CHARACTER_LIMIT: usize = 500;

/// Mastodon counts every URL as 23 characters regardless of its length
pub const DEFAULT_URL_LENGTH: usize = 23;

pub const DEFAULT_HASHTAG: &str = "#SUCHO";

pub const TOKEN_ENV: &str = "MASTODON_TOKEN";
pub const HOST_ENV: &str = "MASTODON_HOST";
pub const CONFIG_ENV: &str = "MEMEBOT_CONFIG";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub mastodon: MastodonConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub url: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FEED_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MastodonConfig {
    pub instance: String,
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            instance: DEFAULT_INSTANCE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub path: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_LEDGER_PATH.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Ledger path with `~` expanded
    pub fn expanded_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).to_string())
    }
}

/// Platform-specific limits applied when rendering a caption
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub character_limit: usize,
    pub url_length: usize,
    pub hashtag: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            character_limit: DEFAULT_CHARACTER_LIMIT,
            url_length: DEFAULT_URL_LENGTH,
            hashtag: DEFAULT_HASHTAG.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Build the HTTP client shared by every request of a run
    pub fn build_client(&self) -> Result<reqwest::Client> {
        let user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("memebot/{}", env!("CARGO_PKG_VERSION")));

        let mut builder = reqwest::Client::builder().user_agent(user_agent);
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(|e| {
            ConfigError::InvalidValue {
                field: "http".to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

impl Config {
    /// Load configuration, honoring an explicit path first
    ///
    /// Resolution order: `explicit`, `MEMEBOT_CONFIG`, the XDG config file if
    /// it exists, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let expanded = PathBuf::from(shellexpand::tilde(&path).to_string());
            return Self::load_from_path(&expanded);
        }

        match resolve_config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let status = &self.status;
        let reserved = status.hashtag.chars().count() + 4 + status.url_length;
        if status.character_limit <= reserved {
            return Err(ConfigError::InvalidValue {
                field: "status.character_limit".to_string(),
                reason: format!(
                    "{} leaves no room for a caption after the {}-character postscript",
                    status.character_limit, reserved
                ),
            }
            .into());
        }

        if self.feed.url.trim().is_empty() {
            return Err(ConfigError::MissingField("feed.url".to_string()).into());
        }

        Ok(())
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("memebot").join("config.toml"))
}

/// Access token and target host, validated once at startup
pub struct Credentials {
    pub instance_url: String,
    pub access_token: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    pub fn new(instance: &str, access_token: String) -> Result<Self> {
        if access_token.trim().is_empty() {
            return Err(ConfigError::MissingToken.into());
        }

        Ok(Self {
            instance_url: normalize_instance_url(instance),
            access_token: SecretString::from(access_token.trim().to_string()),
        })
    }

    /// Read the token (and optional host override) from the environment
    pub fn from_env(config: &Config) -> Result<Self> {
        let token = std::env::var(TOKEN_ENV).map_err(|_| ConfigError::MissingToken)?;
        let instance = std::env::var(HOST_ENV)
            .ok()
            .filter(|host| !host.trim().is_empty())
            .unwrap_or_else(|| config.mastodon.instance.clone());

        Self::new(&instance, token)
    }

    pub fn token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Ensure the instance URL has a scheme and no trailing slash
pub fn normalize_instance_url(instance: &str) -> String {
    let instance = instance.trim().trim_end_matches('/');
    if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.to_string()
    } else {
        format!("https://{}", instance)
    }
}
