//! Discord bot commands.
//!
//! This module contains all available bot commands organized by functionality.

pub mod arena;
pub mod lookup;
pub mod market;
pub mod playground;

use crate::types::{Data, Error};

pub use arena::arena;
pub use lookup::{artifact, bot};
pub use market::{floor, sales};
pub use playground::playground;

/// Every command registered with Discord.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![bot(), artifact(), sales(), floor(), arena(), playground()]
}
