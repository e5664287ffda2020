//! Type definitions and aliases for the bot.
//!
//! This module contains shared types used throughout the application.

use glyphbots::arena::ArenaManager;
use glyphbots::config::Config;
use glyphbots::playground::PlaygroundScheduler;
use glyphbots::services::Services;
use std::sync::Arc;

/// Bot application data shared across all commands.
///
/// This data is accessible in all command handlers through the context.
pub struct Data {
    pub config: Config,
    /// API clients and repositories
    pub services: Services,
    /// Open arena battles
    pub arena: Arc<ArenaManager>,
    pub playground: Arc<PlaygroundScheduler>,
}

/// Error type for bot commands (maintains compatibility with poise).
pub type Error = Box<dyn std::error::Error + Send + Sync>;

/// Command context type alias for easier usage.
pub type Context<'a> = poise::Context<'a, Data, Error>;
