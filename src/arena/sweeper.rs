//! Background task that settles battles whose deadline has passed.

use super::{ArenaManager, Battle};
use crate::embeds;
use crate::utils::unix_now;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Start the expiry sweep loop.
///
/// Every `interval` the manager settles overdue battles and the Discord
/// message of each one is edited to show the final state without buttons.
pub fn spawn(
    manager: Arc<ArenaManager>,
    http: Arc<serenity::Http>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs(), "arena sweeper started");

        loop {
            ticker.tick().await;
            let settled = manager.sweep_expired(unix_now()).await;
            if settled.is_empty() {
                continue;
            }
            let open = manager.open_count().await;
            debug!(
                count = settled.len(),
                open = open,
                "arena sweep settled battles"
            );
            for battle in &settled {
                refresh_message(&http, battle).await;
            }
        }
    })
}

/// Redraw a battle's message from its current state.
///
/// Battles that never got a message are skipped. Failures are logged only.
pub async fn refresh_message(http: &serenity::Http, battle: &Battle) {
    let Some(message_id) = battle.message_id else {
        return;
    };

    let edit = serenity::EditMessage::new()
        .embed(embeds::battle_embed(battle))
        .components(embeds::battle_components(battle));

    if let Err(e) = serenity::ChannelId::new(battle.channel_id)
        .edit_message(http, serenity::MessageId::new(message_id), edit)
        .await
    {
        warn!(battle_id = %battle.id, error = %e, "failed to update battle message");
    }
}
