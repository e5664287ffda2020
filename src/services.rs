//! Shared handles to the external APIs and repositories.

use crate::config::Config;
use crate::database::{BattleRepository, PlaygroundRepository};
use crate::genai::GenAiClient;
use crate::glyphbots::GlyphBotsClient;
use crate::opensea::OpenSeaClient;

/// Cheap-to-clone bundle passed to commands and background tasks.
#[derive(Clone)]
pub struct Services {
    pub glyphbots: GlyphBotsClient,
    pub opensea: OpenSeaClient,
    /// `None` when no generative AI key is configured
    pub ai: Option<GenAiClient>,
    pub battles: BattleRepository,
    pub playground: PlaygroundRepository,
    /// Public site used for links
    pub site_url: String,
}

impl Services {
    /// Build every client from the configuration, sharing one HTTP client.
    pub fn from_config(config: &Config, http: reqwest::Client) -> Self {
        let ai = config.google_ai_api_key.as_ref().map(|key| {
            GenAiClient::new(
                http.clone(),
                config.google_ai_api_url.clone(),
                key.clone(),
                config.google_ai_text_model.clone(),
                config.google_ai_image_model.clone(),
            )
        });

        Self {
            glyphbots: GlyphBotsClient::new(http.clone(), config.glyphbots_api_url.clone()),
            opensea: OpenSeaClient::new(
                http,
                config.opensea_api_url.clone(),
                config.opensea_api_key.clone(),
                config.opensea_collection_slug.clone(),
            ),
            ai,
            battles: BattleRepository::new(config.db_path.clone()),
            playground: PlaygroundRepository::new(config.db_path.clone()),
            site_url: config.glyphbots_site_url.clone(),
        }
    }
}
