//! Arena slash commands.
//!
//! Challenges are answered with slash commands; moves are made with the
//! buttons on the battle message (see `events`).

use crate::types::{Context, Error};
use glyphbots::arena::{sweeper, ArenaError, Battle, Fighter};
use glyphbots::embeds;
use glyphbots::utils::format::mention;
use glyphbots::utils::unix_now;
use glyphbots::utils::validation::validate_token_id;
use poise::serenity_prelude as serenity;
use tracing::error;

const LEADERBOARD_SIZE: u32 = 10;

/// PvP battles between GlyphBots.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("challenge", "accept", "decline", "cancel", "forfeit", "status", "leaderboard"),
    subcommand_required
)]
pub async fn arena(_context: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Challenge another member to a battle.
#[poise::command(slash_command, guild_only)]
pub async fn challenge(
    context: Context<'_>,
    #[description = "Member to challenge"] opponent: serenity::User,
    #[description = "Token id of the GlyphBot you fight with"]
    #[min = 1]
    #[max = 11111]
    bot: u32,
) -> Result<(), Error> {
    context.defer().await?;

    let Some(fighter) = load_fighter(context, bot).await? else {
        return Ok(());
    };

    let data = context.data();
    let battle = match data
        .arena
        .challenge(
            fighter,
            opponent.id.get(),
            opponent.bot,
            context.channel_id().get(),
            unix_now(),
        )
        .await
    {
        Ok(battle) => battle,
        Err(e) => return refuse(context, e).await,
    };

    let reply = context
        .send(
            poise::CreateReply::default()
                .content(format!(
                    "⚔️ {}, you have been challenged!",
                    mention(opponent.id.get())
                ))
                .embed(embeds::battle_embed(&battle)),
        )
        .await?;
    let message = reply.message().await?;
    if let Err(e) = data
        .arena
        .attach_message(&battle.id, message.channel_id.get(), message.id.get())
        .await
    {
        error!(battle_id = %battle.id, error = %e, "failed to attach battle message");
    }

    Ok(())
}

/// Accept the challenge waiting for you.
#[poise::command(slash_command, guild_only)]
pub async fn accept(
    context: Context<'_>,
    #[description = "Token id of the GlyphBot you fight with"]
    #[min = 1]
    #[max = 11111]
    bot: u32,
) -> Result<(), Error> {
    context.defer().await?;

    let Some(fighter) = load_fighter(context, bot).await? else {
        return Ok(());
    };

    match context.data().arena.accept_for(fighter, unix_now()).await {
        Ok(battle) => {
            announce(
                context,
                &battle,
                format!(
                    "✅ Challenge accepted! {} and {}, pick your moves on the battle message.",
                    mention(battle.challenger.user_id),
                    mention(battle.opponent_id)
                ),
            )
            .await
        }
        Err(e) => refuse(context, e).await,
    }
}

/// Decline the challenge waiting for you.
#[poise::command(slash_command, guild_only)]
pub async fn decline(context: Context<'_>) -> Result<(), Error> {
    match context
        .data()
        .arena
        .decline_for(context.author().id.get(), unix_now())
        .await
    {
        Ok(battle) => announce(context, &battle, "✅ Challenge declined.".to_string()).await,
        Err(e) => refuse(context, e).await,
    }
}

/// Withdraw a challenge you sent.
#[poise::command(slash_command, guild_only)]
pub async fn cancel(context: Context<'_>) -> Result<(), Error> {
    match context
        .data()
        .arena
        .cancel_for(context.author().id.get(), unix_now())
        .await
    {
        Ok(battle) => announce(context, &battle, "✅ Challenge withdrawn.".to_string()).await,
        Err(e) => refuse(context, e).await,
    }
}

/// Concede your running battle.
#[poise::command(slash_command, guild_only)]
pub async fn forfeit(context: Context<'_>) -> Result<(), Error> {
    match context
        .data()
        .arena
        .forfeit_for(context.author().id.get(), unix_now())
        .await
    {
        Ok(battle) => {
            announce(context, &battle, "🏳️ You forfeited the battle.".to_string()).await
        }
        Err(e) => refuse(context, e).await,
    }
}

/// Show your open battle and your record.
#[poise::command(slash_command, guild_only)]
pub async fn status(context: Context<'_>) -> Result<(), Error> {
    let data = context.data();
    let user_id = context.author().id.get();

    let record = match data.arena.record_for(user_id).await {
        Ok(record) => record,
        Err(e) => return refuse(context, e).await,
    };
    let summary = format!(
        "Your record: **{}W / {}L / {}D**",
        record.wins, record.losses, record.draws
    );

    let reply = match data.arena.open_battle_for(user_id).await {
        Some(battle) => poise::CreateReply::default()
            .content(summary)
            .embed(embeds::battle_embed(&battle)),
        None => poise::CreateReply::default()
            .content(format!("{}\nYou have no open battle.", summary)),
    };
    context.send(reply.ephemeral(true)).await?;
    Ok(())
}

/// Show the best arena fighters.
#[poise::command(slash_command, guild_only)]
pub async fn leaderboard(context: Context<'_>) -> Result<(), Error> {
    match context.data().arena.leaderboard(LEADERBOARD_SIZE).await {
        Ok(records) => {
            context
                .send(poise::CreateReply::default().embed(embeds::leaderboard_embed(&records)))
                .await?;
            Ok(())
        }
        Err(e) => refuse(context, e).await,
    }
}

/// Resolve a bot token id into a fighter for the command author.
///
/// Replies and returns `None` when the bot cannot be used.
async fn load_fighter(context: Context<'_>, bot_id: u32) -> Result<Option<Fighter>, Error> {
    if let Err(e) = validate_token_id(bot_id) {
        context.say(format!("❌ {}", e)).await?;
        return Ok(None);
    }

    match context.data().services.glyphbots.fetch_bot(bot_id).await {
        Ok(Some(bot)) => Ok(Some(Fighter::new(
            context.author().id.get(),
            bot.token_id,
            bot.name,
        ))),
        Ok(None) => {
            context.say(format!("❌ GlyphBot #{} was not found.", bot_id)).await?;
            Ok(None)
        }
        Err(e) => {
            context.say(format!("❌ Failed to reach the GlyphBots API: {}", e)).await?;
            Ok(None)
        }
    }
}

/// Redraw the battle message and confirm to the author.
async fn announce(context: Context<'_>, battle: &Battle, text: String) -> Result<(), Error> {
    sweeper::refresh_message(&context.serenity_context().http, battle).await;
    context.say(text).await?;
    Ok(())
}

async fn refuse(context: Context<'_>, err: ArenaError) -> Result<(), Error> {
    if let ArenaError::Storage(e) = &err {
        error!(error = %e, "arena storage failure");
    }
    context
        .send(poise::CreateReply::default().content(format!("❌ {}", err)).ephemeral(true))
        .await?;
    Ok(())
}
