//! Configuration management for Dailycast
//!
//! Settings (file locations, column names, enabled platforms, endpoints) come
//! from an optional TOML file. Credentials come only from the environment and
//! are never read from or written to the settings file.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::types::PlatformKind;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub content: ContentConfig,
    pub platforms: PlatformsConfig,
    pub endpoints: EndpointsConfig,
    #[serde(skip)]
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: String,
    pub date_column: String,
    pub content_column: String,
    pub media_column: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: "acme.csv".to_string(),
            date_column: "Date".to_string(),
            content_column: "Main Content".to_string(),
            media_column: "Media".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Character budget applied to platforms listed in `platforms.adapt`
    pub char_limit: usize,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            char_limit: 280,
            model: "gemini-1.5-flash".to_string(),
            max_output_tokens: 70,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformsConfig {
    /// Platforms that are posted to, in order
    pub enabled: Vec<PlatformKind>,
    /// Platforms that receive adapted (shortened) text instead of the original
    pub adapt: Vec<PlatformKind>,
}

impl Default for PlatformsConfig {
    fn default() -> Self {
        Self {
            enabled: vec![PlatformKind::Facebook],
            adapt: vec![PlatformKind::Twitter],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub drive_download: String,
    pub gemini: String,
    pub twitter_upload: String,
    pub twitter_api: String,
    pub linkedin_api: String,
    pub facebook_graph: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            drive_download: "https://docs.google.com/uc".to_string(),
            gemini: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            twitter_upload: "https://upload.twitter.com".to_string(),
            twitter_api: "https://api.twitter.com".to_string(),
            linkedin_api: "https://api.linkedin.com/v2".to_string(),
            facebook_graph: "https://graph.facebook.com/v18.0".to_string(),
        }
    }
}

/// Secrets and account identifiers supplied through the environment
///
/// Every value is optional. A missing or blank variable leaves the field as
/// `None`, which disables whatever depends on it.
#[derive(Debug, Default)]
pub struct Credentials {
    pub gemini_api_key: Option<SecretString>,
    pub twitter: TwitterCredentials,
    pub linkedin: LinkedInCredentials,
    pub facebook: FacebookCredentials,
}

#[derive(Debug, Default)]
pub struct TwitterCredentials {
    pub api_key: Option<SecretString>,
    pub api_secret: Option<SecretString>,
    pub access_token: Option<SecretString>,
    pub access_token_secret: Option<SecretString>,
}

#[derive(Debug, Default)]
pub struct LinkedInCredentials {
    pub access_token: Option<SecretString>,
    pub user_id: Option<String>,
}

#[derive(Debug, Default)]
pub struct FacebookCredentials {
    pub page_id: Option<String>,
    pub access_token: Option<SecretString>,
}

impl Credentials {
    /// Read credentials from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read credentials through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secret = |key: &str| value(key).map(SecretString::from);

        Self {
            gemini_api_key: secret("GEMINI_API_KEY"),
            twitter: TwitterCredentials {
                api_key: secret("TWITTER_API_KEY"),
                api_secret: secret("TWITTER_API_SECRET"),
                access_token: secret("TWITTER_ACCESS_TOKEN"),
                access_token_secret: secret("TWITTER_ACCESS_TOKEN_SECRET"),
            },
            linkedin: LinkedInCredentials {
                access_token: secret("LINKEDIN_ACCESS_TOKEN"),
                user_id: value("LINKEDIN_USER_ID"),
            },
            facebook: FacebookCredentials {
                page_id: value("FACEBOOK_PAGE_ID"),
                access_token: secret("FACEBOOK_ACCESS_TOKEN"),
            },
        }
    }
}

impl Config {
    /// Load configuration from the default location plus the environment
    ///
    /// A settings file that does not exist yields the built-in defaults.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from_path(&config_path)?
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Self::default()
        };
        config.credentials = Credentials::from_env();
        Ok(config)
    }

    /// Load settings from a specific path; credentials are left empty
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Data file path with `~` expanded
    pub fn source_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.source.path).to_string())
    }
}

/// Resolve the configuration file path following the XDG base directory layout
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("DAILYCAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("dailycast").join("config.toml"))
}
