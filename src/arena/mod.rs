//! PvP arena battles.
//!
//! Members challenge each other with a GlyphBot, trade moves through buttons,
//! and the expiry sweeper settles anything left hanging.

mod battle;
mod manager;
pub mod sweeper;

pub use battle::{
    resolve, Battle, BattleResult, BattleStatus, Fighter, Move, RoundSummary, MAX_ROUNDS,
    STARTING_HP,
};
pub use manager::{ArenaManager, ArenaTimeouts};

use crate::error::GlyphBotsError;
use std::fmt;

/// Reasons an arena action is refused. The display text is shown to users.
#[derive(Debug)]
pub enum ArenaError {
    SelfChallenge,
    BotOpponent,
    AlreadyInBattle { user_id: u64 },
    NoOpenBattle,
    NotFound,
    NotOpponent,
    NotChallenger,
    NotParticipant,
    NotPending,
    NotActive,
    DeadlinePassed,
    MoveAlreadySubmitted,
    Storage(GlyphBotsError),
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfChallenge => write!(f, "You can't challenge yourself."),
            Self::BotOpponent => write!(f, "Bots don't fight in the arena. Pick a human opponent."),
            Self::AlreadyInBattle { user_id } => {
                write!(f, "<@{}> is already in an open arena battle.", user_id)
            }
            Self::NoOpenBattle => write!(f, "You have no open arena battle."),
            Self::NotFound => write!(f, "That battle is no longer running."),
            Self::NotOpponent => write!(f, "Only the challenged player can answer this challenge."),
            Self::NotChallenger => write!(f, "Only the challenger can cancel this challenge."),
            Self::NotParticipant => write!(f, "Only the fighters can use these buttons."),
            Self::NotPending => write!(f, "This challenge has already been answered."),
            Self::NotActive => write!(f, "This battle is not in progress."),
            Self::DeadlinePassed => write!(f, "Too late, the timer for this battle ran out."),
            Self::MoveAlreadySubmitted => write!(f, "You already locked in a move this round."),
            Self::Storage(err) => write!(f, "Arena storage failed: {}", err),
        }
    }
}

impl std::error::Error for ArenaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GlyphBotsError> for ArenaError {
    fn from(err: GlyphBotsError) -> Self {
        Self::Storage(err)
    }
}
