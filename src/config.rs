//! Configuration management for the GlyphBots bot.
//!
//! This module handles loading and validating environment variables and application settings.

use crate::error::{GlyphBotsError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_GLYPHBOTS_API_URL: &str = "https://glyphbots.com/api";
const DEFAULT_GLYPHBOTS_SITE_URL: &str = "https://glyphbots.com";
const DEFAULT_OPENSEA_API_URL: &str = "https://api.opensea.io/api/v2";
const DEFAULT_COLLECTION_SLUG: &str = "glyphbots";
const DEFAULT_GOOGLE_AI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Shortest allowed playground rotation interval, in minutes.
pub const MIN_PLAYGROUND_INTERVAL_MINUTES: u64 = 5;
/// Longest allowed playground rotation interval (one week), in minutes.
pub const MAX_PLAYGROUND_INTERVAL_MINUTES: u64 = 7 * 24 * 60;
/// Upper bound for the arena timeouts and sweep period (one day), in seconds.
pub const MAX_ARENA_SECS: u64 = 24 * 60 * 60;

/// Configuration for the application, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Discord bot token
    pub discord_token: String,
    /// Path to SQLite database file
    pub db_path: String,
    /// Base URL of the GlyphBots REST API
    pub glyphbots_api_url: String,
    /// Public GlyphBots site, used for links in embeds
    pub glyphbots_site_url: String,
    /// Base URL of the OpenSea v2 API
    pub opensea_api_url: String,
    /// OpenSea API key; market commands are unavailable without it
    pub opensea_api_key: Option<String>,
    /// OpenSea collection slug
    pub opensea_collection_slug: String,
    /// Generative AI API key; playground posts are unavailable without it
    pub google_ai_api_key: Option<String>,
    /// Base URL of the generative AI API
    pub google_ai_api_url: String,
    /// Model used for flavor text
    pub google_ai_text_model: String,
    /// Model used for images
    pub google_ai_image_model: String,
    /// Channel receiving playground posts
    pub playground_channel_id: Option<u64>,
    /// Time between playground posts
    pub playground_interval: Duration,
    /// Whether the playground starts enabled
    pub playground_enabled: bool,
    /// Lifetime of an unanswered arena challenge
    pub arena_challenge_timeout: Duration,
    /// Deadline for each arena round
    pub arena_round_timeout: Duration,
    /// Period of the arena expiry sweep
    pub arena_sweep_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This will attempt to load a .env file if present using dotenv,
    /// then read the environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required environment variable is missing or any value is invalid.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use glyphbots::config::Config;
    ///
    /// let config = Config::from_env().expect("Failed to load configuration");
    /// println!("API: {}", config.glyphbots_api_url);
    /// ```
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors - it's optional)
        dotenv::dotenv().ok();

        Self::from_source(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let discord_token = var("DISCORD_TOKEN").ok_or_else(|| {
            GlyphBotsError::Config(
                "Missing DISCORD_TOKEN environment variable. Set it in your environment \
                 or create a .env file (never commit this file)."
                    .to_string(),
            )
        })?;

        let db_path = match var("DB_PATH") {
            Some(path) => path,
            None => Self::default_db_path()?,
        };

        let glyphbots_api_url =
            var("GLYPHBOTS_API_URL").unwrap_or_else(|| DEFAULT_GLYPHBOTS_API_URL.to_string());
        Self::validate_base_url("GLYPHBOTS_API_URL", &glyphbots_api_url)?;

        let glyphbots_site_url =
            var("GLYPHBOTS_SITE_URL").unwrap_or_else(|| DEFAULT_GLYPHBOTS_SITE_URL.to_string());
        Self::validate_base_url("GLYPHBOTS_SITE_URL", &glyphbots_site_url)?;

        let opensea_api_url =
            var("OPENSEA_API_URL").unwrap_or_else(|| DEFAULT_OPENSEA_API_URL.to_string());
        Self::validate_base_url("OPENSEA_API_URL", &opensea_api_url)?;

        let google_ai_api_url =
            var("GOOGLE_AI_API_URL").unwrap_or_else(|| DEFAULT_GOOGLE_AI_API_URL.to_string());
        Self::validate_base_url("GOOGLE_AI_API_URL", &google_ai_api_url)?;

        let playground_channel_id = match var("PLAYGROUND_CHANNEL_ID") {
            Some(raw) => Some(Self::parse_positive("PLAYGROUND_CHANNEL_ID", &raw)?),
            None => None,
        };

        let interval_minutes = Self::parse_bounded(
            "PLAYGROUND_INTERVAL_MINUTES",
            var("PLAYGROUND_INTERVAL_MINUTES"),
            60,
            MAX_PLAYGROUND_INTERVAL_MINUTES,
        )?;
        if interval_minutes < MIN_PLAYGROUND_INTERVAL_MINUTES {
            return Err(GlyphBotsError::Config(format!(
                "PLAYGROUND_INTERVAL_MINUTES must be at least {}, got {}",
                MIN_PLAYGROUND_INTERVAL_MINUTES, interval_minutes
            )));
        }

        let playground_enabled = match var("PLAYGROUND_ENABLED") {
            Some(raw) => Self::parse_bool("PLAYGROUND_ENABLED", &raw)?,
            None => true,
        };

        let challenge_secs = Self::parse_bounded(
            "ARENA_CHALLENGE_TIMEOUT_SECS",
            var("ARENA_CHALLENGE_TIMEOUT_SECS"),
            120,
            MAX_ARENA_SECS,
        )?;
        let round_secs = Self::parse_bounded(
            "ARENA_ROUND_TIMEOUT_SECS",
            var("ARENA_ROUND_TIMEOUT_SECS"),
            90,
            MAX_ARENA_SECS,
        )?;
        let sweep_secs = Self::parse_bounded(
            "ARENA_SWEEP_INTERVAL_SECS",
            var("ARENA_SWEEP_INTERVAL_SECS"),
            15,
            MAX_ARENA_SECS,
        )?;

        Ok(Self {
            discord_token,
            db_path,
            glyphbots_api_url,
            glyphbots_site_url,
            opensea_api_url,
            opensea_api_key: var("OPENSEA_API_KEY"),
            opensea_collection_slug: var("OPENSEA_COLLECTION_SLUG")
                .unwrap_or_else(|| DEFAULT_COLLECTION_SLUG.to_string()),
            google_ai_api_key: var("GOOGLE_AI_API_KEY"),
            google_ai_api_url,
            google_ai_text_model: var("GOOGLE_AI_TEXT_MODEL")
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            google_ai_image_model: var("GOOGLE_AI_IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            playground_channel_id,
            playground_interval: Duration::from_secs(interval_minutes * 60),
            playground_enabled,
            arena_challenge_timeout: Duration::from_secs(challenge_secs),
            arena_round_timeout: Duration::from_secs(round_secs),
            arena_sweep_interval: Duration::from_secs(sweep_secs),
        })
    }

    /// Default database location: `./data/glyphbots.db`.
    fn default_db_path() -> Result<String> {
        let mut path: PathBuf = env::current_dir()
            .map_err(|e| GlyphBotsError::Config(
                format!("Failed to determine current directory: {}", e)
            ))?;

        path.push("data");
        path.push("glyphbots.db");

        path.into_os_string()
            .into_string()
            .map_err(|os_str| GlyphBotsError::Config(
                format!("Database path contains invalid Unicode: {:?}", os_str)
            ))
    }

    /// Validate a base URL: http(s) scheme and a host.
    fn validate_base_url(name: &str, url_str: &str) -> Result<()> {
        use url::Url;

        let parsed_url = Url::parse(url_str)
            .map_err(|e| GlyphBotsError::Config(
                format!("Invalid {} '{}': {}", name, url_str, e)
            ))?;

        let scheme = parsed_url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(GlyphBotsError::Config(
                format!("{} must use http:// or https:// scheme, got: '{}'", name, scheme)
            ));
        }

        if parsed_url.host_str().is_none() {
            return Err(GlyphBotsError::Config(
                format!("{} must contain a valid host: '{}'", name, url_str)
            ));
        }

        Ok(())
    }

    fn parse_positive(name: &str, raw: &str) -> Result<u64> {
        match raw.parse::<u64>() {
            Ok(0) | Err(_) => Err(GlyphBotsError::Config(
                format!("{} must be a positive integer, got: '{}'", name, raw)
            )),
            Ok(value) => Ok(value),
        }
    }

    fn parse_bounded(name: &str, raw: Option<String>, default: u64, max: u64) -> Result<u64> {
        let value = match raw {
            Some(raw) => Self::parse_positive(name, &raw)?,
            None => default,
        };
        if value > max {
            return Err(GlyphBotsError::Config(format!(
                "{} must be at most {}, got {}",
                name, max, value
            )));
        }
        Ok(value)
    }

    fn parse_bool(name: &str, raw: &str) -> Result<bool> {
        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(GlyphBotsError::Config(
                format!("{} must be true or false, got: '{}'", name, raw)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_missing_token_is_an_error() {
        let result = config_from(&[]);
        assert!(matches!(
            result,
            Err(GlyphBotsError::Config(msg)) if msg.contains("DISCORD_TOKEN")
        ));
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DISCORD_TOKEN", "token")]).unwrap();

        assert_eq!(config.glyphbots_api_url, DEFAULT_GLYPHBOTS_API_URL);
        assert_eq!(config.opensea_collection_slug, "glyphbots");
        assert_eq!(config.opensea_api_key, None);
        assert_eq!(config.google_ai_api_key, None);
        assert_eq!(config.playground_channel_id, None);
        assert_eq!(config.playground_interval, Duration::from_secs(60 * 60));
        assert!(config.playground_enabled);
        assert_eq!(config.arena_challenge_timeout, Duration::from_secs(120));
        assert_eq!(config.arena_round_timeout, Duration::from_secs(90));
        assert_eq!(config.arena_sweep_interval, Duration::from_secs(15));
        assert!(
            config.db_path.ends_with("data/glyphbots.db")
                || config.db_path.ends_with("data\\glyphbots.db")
        );
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "token"),
            ("OPENSEA_API_KEY", "   "),
            ("DB_PATH", ""),
        ])
        .unwrap();

        assert_eq!(config.opensea_api_key, None);
        assert!(config.db_path.contains("glyphbots.db"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "token"),
            ("DB_PATH", "/custom/path/bot.db"),
            ("PLAYGROUND_CHANNEL_ID", "123456789012345678"),
            ("PLAYGROUND_INTERVAL_MINUTES", "15"),
            ("PLAYGROUND_ENABLED", "off"),
            ("OPENSEA_API_KEY", "key"),
            ("ARENA_ROUND_TIMEOUT_SECS", "30"),
        ])
        .unwrap();

        assert_eq!(config.db_path, "/custom/path/bot.db");
        assert_eq!(config.playground_channel_id, Some(123456789012345678));
        assert_eq!(config.playground_interval, Duration::from_secs(15 * 60));
        assert!(!config.playground_enabled);
        assert_eq!(config.opensea_api_key.as_deref(), Some("key"));
        assert_eq!(config.arena_round_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_interval_floor() {
        let result =
            config_from(&[("DISCORD_TOKEN", "token"), ("PLAYGROUND_INTERVAL_MINUTES", "2")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_oversized_durations_rejected() {
        let result = config_from(&[
            ("DISCORD_TOKEN", "token"),
            ("PLAYGROUND_INTERVAL_MINUTES", "307445734561825861"),
        ]);
        assert!(matches!(result, Err(GlyphBotsError::Config(_))));

        let result = config_from(&[
            ("DISCORD_TOKEN", "t"),
            ("PLAYGROUND_INTERVAL_MINUTES", "10081"),
        ]);
        assert!(matches!(result, Err(GlyphBotsError::Config(_))));

        let result = config_from(&[
            ("DISCORD_TOKEN", "t"),
            ("ARENA_ROUND_TIMEOUT_SECS", "18446744073709551615"),
        ]);
        assert!(matches!(result, Err(GlyphBotsError::Config(_))));

        let config = config_from(&[
            ("DISCORD_TOKEN", "t"),
            ("PLAYGROUND_INTERVAL_MINUTES", "10080"),
            ("ARENA_CHALLENGE_TIMEOUT_SECS", "86400"),
        ])
        .unwrap();
        assert_eq!(config.playground_interval, Duration::from_secs(10080 * 60));
        assert_eq!(config.arena_challenge_timeout, Duration::from_secs(86400));
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        assert!(config_from(&[("DISCORD_TOKEN", "t"), ("PLAYGROUND_CHANNEL_ID", "abc")]).is_err());
        let zero_sweep = config_from(&[("DISCORD_TOKEN", "t"), ("ARENA_SWEEP_INTERVAL_SECS", "0")]);
        assert!(zero_sweep.is_err());
        assert!(config_from(&[("DISCORD_TOKEN", "t"), ("PLAYGROUND_ENABLED", "maybe")]).is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(Config::validate_base_url("X", "https://glyphbots.com/api").is_ok());
        assert!(Config::validate_base_url("X", "http://127.0.0.1:1234").is_ok());

        assert!(Config::validate_base_url("X", "ftp://glyphbots.com").is_err());
        assert!(Config::validate_base_url("X", "not a url").is_err());
    }
}
