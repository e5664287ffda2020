//! Playground control commands for moderators.

use crate::types::{Context, Error};
use glyphbots::utils::format::relative_time;
use tracing::{info, warn};

/// Control the playground posting schedule.
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "MANAGE_GUILD",
    subcommands("start", "stop", "status", "post"),
    subcommand_required
)]
pub async fn playground(_context: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Resume scheduled posts.
#[poise::command(slash_command, guild_only, default_member_permissions = "MANAGE_GUILD")]
pub async fn start(context: Context<'_>) -> Result<(), Error> {
    let data = context.data();
    if data.config.playground_channel_id.is_none() {
        context.say("❌ No playground channel is configured (PLAYGROUND_CHANNEL_ID).").await?;
        return Ok(());
    }

    if data.playground.start() {
        info!(user = context.author().id.get(), "playground started");
        context.say("✅ Playground posting started.").await?;
    } else {
        context.say("Playground posting is already running.").await?;
    }
    Ok(())
}

/// Pause scheduled posts.
#[poise::command(slash_command, guild_only, default_member_permissions = "MANAGE_GUILD")]
pub async fn stop(context: Context<'_>) -> Result<(), Error> {
    if context.data().playground.stop() {
        info!(user = context.author().id.get(), "playground stopped");
        context.say("✅ Playground posting stopped.").await?;
    } else {
        context.say("Playground posting is already stopped.").await?;
    }
    Ok(())
}

/// Show the schedule and the last post.
#[poise::command(slash_command, guild_only, default_member_permissions = "MANAGE_GUILD")]
pub async fn status(context: Context<'_>) -> Result<(), Error> {
    let data = context.data();
    let status = data.playground.status().await;

    let channel = status
        .channel_id
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "not configured".to_string());
    let last = status
        .last_post
        .map(|p| format!("{} {}", p.kind, relative_time(p.posted_at)))
        .unwrap_or_else(|| "never".to_string());
    let ai = if data.services.ai.is_some() { "ready" } else { "no API key" };

    context
        .say(format!(
            "**Playground**\n\
            **State:** {}\n\
            **Channel:** {}\n\
            **Interval:** {} min\n\
            **Last post:** {}\n\
            **AI:** {}",
            if status.enabled { "running" } else { "stopped" },
            channel,
            status.interval.as_secs() / 60,
            last,
            ai
        ))
        .await?;
    Ok(())
}

/// Post the next piece of content now.
#[poise::command(slash_command, guild_only, default_member_permissions = "MANAGE_GUILD")]
pub async fn post(context: Context<'_>) -> Result<(), Error> {
    context.defer().await?;

    let data = context.data();
    match data
        .playground
        .post_next(&context.serenity_context().http, &data.services)
        .await
    {
        Ok(post) => {
            context
                .say(format!(
                    "✅ Posted a {} to <#{}>.",
                    post.kind.replace('_', " "),
                    post.channel_id
                ))
                .await?;
        }
        Err(e) => {
            warn!(error = %e, "manual playground post failed");
            context.say(format!("❌ Playground post failed: {}", e)).await?;
        }
    }
    Ok(())
}
