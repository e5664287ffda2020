//! Gateway event handling.
//!
//! Slash commands are dispatched by poise; this handles the arena move buttons.

use crate::types::{Data, Error};
use glyphbots::arena::Move;
use glyphbots::embeds;
use glyphbots::utils::unix_now;
use poise::serenity_prelude as serenity;
use tracing::{debug, info};

pub async fn event_handler(
    context: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot, .. } => {
            info!(user = %data_about_bot.user.name, "connected to Discord");
        }
        serenity::FullEvent::InteractionCreate { interaction } => {
            if let Some(component) = interaction.as_message_component() {
                handle_component(context, component, data).await?;
            }
        }
        _ => {}
    }
    Ok(())
}

async fn handle_component(
    context: &serenity::Context,
    component: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    let Some((battle_id, mv)) = Move::from_custom_id(&component.data.custom_id) else {
        return Ok(());
    };
    let user_id = component.user.id.get();
    debug!(battle_id = %battle_id, user_id, mv = mv.as_str(), "arena move pressed");

    let response = match data.arena.submit_move(&battle_id, user_id, mv, unix_now()).await {
        Ok((battle, _)) => serenity::CreateInteractionResponse::UpdateMessage(
            serenity::CreateInteractionResponseMessage::new()
                .embed(embeds::battle_embed(&battle))
                .components(embeds::battle_components(&battle)),
        ),
        Err(e) => serenity::CreateInteractionResponse::Message(
            serenity::CreateInteractionResponseMessage::new()
                .content(format!("❌ {}", e))
                .ephemeral(true),
        ),
    };

    component.create_response(&context.http, response).await?;
    Ok(())
}
