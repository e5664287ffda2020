//! Market commands backed by OpenSea.

use crate::types::{Context, Error};
use glyphbots::embeds;
use glyphbots::opensea::MAX_SALES;

const DEFAULT_SALES: u32 = 5;

/// Show the most recent sales of the collection.
#[poise::command(slash_command)]
pub async fn sales(
    context: Context<'_>,
    #[description = "How many sales to show (default 5, max 10)"]
    #[min = 1]
    #[max = 10]
    count: Option<u32>,
) -> Result<(), Error> {
    let opensea = &context.data().services.opensea;
    if !opensea.is_configured() {
        context.say("❌ Market data is unavailable: no OpenSea API key is configured.").await?;
        return Ok(());
    }

    context.defer().await?;

    let count = count.unwrap_or(DEFAULT_SALES).clamp(1, MAX_SALES);
    match opensea.recent_sales(count).await {
        Ok(sales) => {
            context
                .send(poise::CreateReply::default().embed(embeds::sales_embed(&sales)))
                .await?;
        }
        Err(e) => {
            context.say(format!("❌ Failed to fetch sales from OpenSea: {}", e)).await?;
        }
    }

    Ok(())
}

/// Show the floor price, volume, sales and owner count.
#[poise::command(slash_command)]
pub async fn floor(context: Context<'_>) -> Result<(), Error> {
    let data = context.data();
    if !data.services.opensea.is_configured() {
        context.say("❌ Market data is unavailable: no OpenSea API key is configured.").await?;
        return Ok(());
    }

    context.defer().await?;

    match data.services.opensea.collection_stats().await {
        Ok(stats) => {
            let embed = embeds::stats_embed(&stats, &data.config.opensea_collection_slug);
            context.send(poise::CreateReply::default().embed(embed)).await?;
        }
        Err(e) => {
            context.say(format!("❌ Failed to fetch collection stats from OpenSea: {}", e)).await?;
        }
    }

    Ok(())
}
