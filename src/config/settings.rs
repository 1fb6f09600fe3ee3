//! Service settings and Telegram configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_COOLDOWN_SECS, DEFAULT_PORT};

/// Telegram Bot API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token (obtain from <https://t.me/BotFather>).
    pub bot_token: String,

    /// Publicly reachable base URL of this service; the Telegram webhook
    /// is registered as `<public_url>/webhook`.
    pub public_url: String,
}

impl TelegramConfig {
    /// Creates a new Telegram configuration.
    #[must_use]
    pub fn new(bot_token: String, public_url: String) -> Self {
        Self {
            bot_token,
            public_url: normalize_base_url(public_url),
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TELEGRAM_BOT_TOKEN` and `WEBHOOK_PUBLIC_URL` to be set.
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables are missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bot_token = require_env("TELEGRAM_BOT_TOKEN")?;
        let public_url = require_env("WEBHOOK_PUBLIC_URL")?;

        Ok(Self::new(bot_token, public_url))
    }

    /// Returns the full webhook URL to register with Telegram.
    #[must_use]
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook", self.public_url)
    }
}

/// Supabase store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Supabase project URL.
    pub url: String,

    /// Supabase service/anon key.
    pub key: String,
}

impl StoreConfig {
    /// Creates a new store configuration.
    #[must_use]
    pub fn new(url: String, key: String) -> Self {
        Self {
            url: normalize_base_url(url),
            key,
        }
    }

    /// Creates store configuration from environment variables.
    ///
    /// Returns `None` when `SUPABASE_URL` or `SUPABASE_KEY` is absent or
    /// empty; the service then runs on the in-memory fallback store.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let url = non_empty_env("SUPABASE_URL")?;
        let key = non_empty_env("SUPABASE_KEY")?;

        Some(Self::new(url, key))
    }

    /// Returns the PostgREST base URL for this project.
    #[must_use]
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }
}

/// Service tuning knobs with environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// HTTP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory where downloaded videos are staged before sending.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Minimum interval between downloads per chat, in seconds.
    #[serde(default = "default_cooldown")]
    pub cooldown_secs: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("/tmp/downloads")
}

fn default_cooldown() -> u64 {
    DEFAULT_COOLDOWN_SECS
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            port: default_port(),
            download_dir: default_download_dir(),
            cooldown_secs: default_cooldown(),
        }
    }
}

impl ServiceSettings {
    /// Creates service settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_port),
            download_dir: std::env::var("DOWNLOAD_DIR")
                .map_or_else(|_| default_download_dir(), PathBuf::from),
            cooldown_secs: std::env::var("COOLDOWN_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_cooldown),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telegram Bot API credentials and webhook location.
    pub telegram: TelegramConfig,

    /// Optional Supabase store; `None` selects the in-memory fallback.
    pub store: Option<StoreConfig>,

    /// Service tuning knobs.
    pub service: ServiceSettings,
}

impl AppConfig {
    /// Loads the complete configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            telegram: TelegramConfig::from_env()?,
            store: StoreConfig::from_env(),
            service: ServiceSettings::from_env_with_defaults(),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
}

fn require_env(name: &'static str) -> Result<String, ConfigError> {
    non_empty_env(name).ok_or(ConfigError::MissingEnvVar(name))
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Strips trailing slashes so URL joins stay predictable.
fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = ServiceSettings::default();
        assert_eq!(settings.port, 8000);
        assert_eq!(settings.cooldown_secs, 15);
        assert_eq!(settings.download_dir, PathBuf::from("/tmp/downloads"));
    }

    #[test]
    fn test_telegram_config_new() {
        let config = TelegramConfig::new(
            "123:abc".to_owned(),
            "https://bot.example.com/".to_owned(),
        );
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.public_url, "https://bot.example.com");
        assert_eq!(config.webhook_url(), "https://bot.example.com/webhook");
    }

    #[test]
    fn test_store_config_rest_url() {
        let config = StoreConfig::new(
            "https://project.supabase.co/".to_owned(),
            "service-key".to_owned(),
        );
        assert_eq!(config.rest_url(), "https://project.supabase.co/rest/v1");
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://a.example//".to_owned()),
            "https://a.example"
        );
        assert_eq!(
            normalize_base_url("https://a.example".to_owned()),
            "https://a.example"
        );
    }
}
