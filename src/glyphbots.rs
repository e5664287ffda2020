//! GlyphBots API integration.
//!
//! This module provides a client for the GlyphBots REST API to look up bots
//! and the artifacts they produce.

use crate::error::{GlyphBotsError, Result};
use crate::utils::validation::{validate_token_id, MAX_TOKEN_ID};
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

/// How many random token ids `random_bot` tries before giving up.
const RANDOM_DRAWS: usize = 3;

/// A single trait on a bot.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trait {
    pub trait_type: String,
    pub value: String,
}

/// A GlyphBot as returned by the API.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    pub token_id: u32,
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub traits: Vec<Trait>,
    #[serde(default)]
    pub rarity_rank: Option<u32>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl Bot {
    /// Value of the first trait with the given type, case-insensitively.
    pub fn trait_value(&self, trait_type: &str) -> Option<&str> {
        self.traits
            .iter()
            .find(|t| t.trait_type.eq_ignore_ascii_case(trait_type))
            .map(|t| t.value.as_str())
    }
}

/// An artifact minted from a bot.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub token_id: u32,
    pub name: String,
    pub bot_token_id: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Deserialize)]
struct ArtifactList {
    artifacts: Vec<Artifact>,
}

/// Client for the GlyphBots REST API.
#[derive(Clone)]
pub struct GlyphBotsClient {
    http: reqwest::Client,
    base_url: String,
}

impl GlyphBotsClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a bot by token id.
    ///
    /// Returns `Some(bot)` if the bot exists, `None` if the API reports it as not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the token id is out of range, the request fails, or the
    /// API returns an unexpected status code.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use glyphbots::glyphbots::GlyphBotsClient;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = GlyphBotsClient::new(reqwest::Client::new(), "https://glyphbots.com/api");
    /// if let Some(bot) = client.fetch_bot(42).await? {
    ///     println!("#{} {}", bot.token_id, bot.name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_bot(&self, token_id: u32) -> Result<Option<Bot>> {
        validate_token_id(token_id)?;
        self.get_optional(&format!("{}/bots/{}", self.base_url, token_id)).await
    }

    /// Fetch an artifact by token id.
    pub async fn fetch_artifact(&self, token_id: u32) -> Result<Option<Artifact>> {
        if token_id == 0 {
            return Err(GlyphBotsError::Validation("Artifact id must be positive".to_string()));
        }
        self.get_optional(&format!("{}/artifacts/{}", self.base_url, token_id)).await
    }

    /// Most recently created artifacts, newest first.
    pub async fn recent_artifacts(&self, limit: u32) -> Result<Vec<Artifact>> {
        let url = format!("{}/artifacts", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("limit", limit.clamp(1, 50).to_string()), ("sort", "recent".to_string())])
            .send()
            .await
            .map_err(|e| GlyphBotsError::GlyphBotsApi(format!("Request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(GlyphBotsError::GlyphBotsApi(format!(
                "API returned error: {}",
                resp.status()
            )));
        }

        let list = resp
            .json::<ArtifactList>()
            .await
            .map_err(|e| GlyphBotsError::GlyphBotsApi(format!("Invalid response: {}", e)))?;
        Ok(list.artifacts)
    }

    /// Fetch a random existing bot.
    pub async fn random_bot(&self) -> Result<Bot> {
        let candidates: Vec<u32> = {
            let mut rng = rand::rng();
            (0..RANDOM_DRAWS)
                .map(|_| rng.random_range(1..=MAX_TOKEN_ID))
                .collect()
        };

        for token_id in candidates {
            if let Some(bot) = self.fetch_bot(token_id).await? {
                return Ok(bot);
            }
            debug!(token_id, "random bot draw missed");
        }

        Err(GlyphBotsError::GlyphBotsApi(format!(
            "No bot found after {} random draws",
            RANDOM_DRAWS
        )))
    }

    async fn get_optional<T>(&self, url: &str) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| GlyphBotsError::GlyphBotsApi(format!("Request failed: {}", e)))?;

        if resp.status().is_success() {
            let value = resp
                .json::<T>()
                .await
                .map_err(|e| GlyphBotsError::GlyphBotsApi(format!("Invalid response: {}", e)))?;
            Ok(Some(value))
        } else if resp.status().as_u16() == 404 {
            Ok(None)
        } else {
            Err(GlyphBotsError::GlyphBotsApi(format!(
                "API returned error: {}",
                resp.status()
            )))
        }
    }
}
