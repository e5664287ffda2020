//! Collection lookup commands.
//!
//! Look up GlyphBots and their artifacts on the GlyphBots API.

use crate::types::{Context, Error};
use glyphbots::embeds;
use glyphbots::utils::validation::validate_token_id;

/// Show a GlyphBot with its traits, rarity and owner.
#[poise::command(slash_command)]
pub async fn bot(
    context: Context<'_>,
    #[description = "Bot token id"]
    #[min = 1]
    #[max = 11111]
    id: u32,
) -> Result<(), Error> {
    if let Err(e) = validate_token_id(id) {
        context.say(format!("❌ {}", e)).await?;
        return Ok(());
    }

    context.defer().await?;

    let services = &context.data().services;
    match services.glyphbots.fetch_bot(id).await {
        Ok(Some(bot)) => {
            context
                .send(
                    poise::CreateReply::default()
                        .embed(embeds::bot_embed(&bot, &services.site_url)),
                )
                .await?;
        }
        Ok(None) => {
            context.say(format!("❌ GlyphBot #{} was not found.", id)).await?;
        }
        Err(e) => {
            context.say(format!("❌ Failed to reach the GlyphBots API: {}", e)).await?;
        }
    }

    Ok(())
}

/// Show an artifact and the bot that created it.
#[poise::command(slash_command)]
pub async fn artifact(
    context: Context<'_>,
    #[description = "Artifact token id"]
    #[min = 1]
    id: u32,
) -> Result<(), Error> {
    context.defer().await?;

    let services = &context.data().services;
    match services.glyphbots.fetch_artifact(id).await {
        Ok(Some(artifact)) => {
            context
                .send(
                    poise::CreateReply::default()
                        .embed(embeds::artifact_embed(&artifact, &services.site_url)),
                )
                .await?;
        }
        Ok(None) => {
            context.say(format!("❌ Artifact #{} was not found.", id)).await?;
        }
        Err(e) => {
            context.say(format!("❌ Failed to reach the GlyphBots API: {}", e)).await?;
        }
    }

    Ok(())
}
