//! GlyphBots library.
//!
//! Core of the GlyphBots community bot: API clients for the collection, the
//! market and the generative AI service, the arena battle engine, the
//! playground scheduler, and the SQLite persistence behind them.

pub mod error;
pub mod config;
pub mod database;
pub mod retry;
pub mod glyphbots;
pub mod opensea;
pub mod genai;
pub mod arena;
pub mod playground;
pub mod embeds;
pub mod services;
pub mod utils;

pub use error::{GlyphBotsError, Result};
pub use config::Config;
