use crate::commands;
use crate::events::event_handler;
use crate::types::{Data, Error};
use glyphbots::arena::{sweeper, ArenaManager, ArenaTimeouts};
use glyphbots::config::Config;
use glyphbots::database;
use glyphbots::playground::PlaygroundScheduler;
use glyphbots::services::Services;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run() -> Result<(), Error> {
    let config = Config::from_env()?;

    // Initialize DB (creates file and tables if needed)
    database::init_db(&config.db_path).await?;

    let http_client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent(concat!("glyphbots/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let services = Services::from_config(&config, http_client);

    if !services.opensea.is_configured() {
        warn!("OPENSEA_API_KEY is not set, /sales and /floor are disabled");
    }
    if services.ai.is_none() {
        warn!("GOOGLE_AI_API_KEY is not set, playground posts are disabled");
    }

    let arena = Arc::new(ArenaManager::new(
        services.battles.clone(),
        ArenaTimeouts {
            challenge: config.arena_challenge_timeout,
            round: config.arena_round_timeout,
        },
    ));
    let restored = arena.restore().await?;
    info!(restored, "arena battles restored");

    let playground = Arc::new(PlaygroundScheduler::new(
        config.playground_channel_id,
        config.playground_interval,
        config.playground_enabled,
    ));
    if let Err(e) = playground.restore(&services).await {
        warn!(error = %e, "could not restore playground history");
    }

    let token = config.discord_token.clone();
    let intents = serenity::GatewayIntents::non_privileged();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |context, event, framework, data| {
                Box::pin(event_handler(context, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |context, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(context, &framework.options().commands).await?;
                info!("slash commands registered");

                sweeper::spawn(arena.clone(), context.http.clone(), config.arena_sweep_interval);
                playground
                    .clone()
                    .spawn(context.http.clone(), services.clone());

                Ok(Data {
                    config,
                    services,
                    arena,
                    playground,
                })
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    client.start().await?;

    Ok(())
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(command = %ctx.command().qualified_name, error = %error, "command failed");
            if let Err(e) = ctx.say("❌ Something went wrong while running this command.").await {
                warn!(error = %e, "failed to report command error");
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                error!(error = %e, "error while handling framework error");
            }
        }
    }
}
