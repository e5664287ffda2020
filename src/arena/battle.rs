//! Arena battle state machine.
//!
//! A battle moves `Pending -> Active -> Completed`, or ends early as
//! `Declined`, `Cancelled` or `Expired`. All transitions take the current unix
//! time so the whole machine can be driven deterministically.

use super::ArenaError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hit points each fighter starts with.
pub const STARTING_HP: i32 = 100;
/// A battle ends after this many rounds even if both fighters stand.
pub const MAX_ROUNDS: u32 = 5;

const CUSTOM_ID_PREFIX: &str = "arena";

/// A move a fighter can make in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    Strike,
    Guard,
    Charge,
}

impl Move {
    pub const ALL: [Move; 3] = [Move::Strike, Move::Guard, Move::Charge];

    pub fn as_str(self) -> &'static str {
        match self {
            Move::Strike => "strike",
            Move::Guard => "guard",
            Move::Charge => "charge",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Move::ALL.into_iter().find(|mv| mv.as_str() == value)
    }

    pub fn label(self) -> &'static str {
        match self {
            Move::Strike => "Strike",
            Move::Guard => "Guard",
            Move::Charge => "Charge",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Move::Strike => "⚔️",
            Move::Guard => "🛡️",
            Move::Charge => "⚡",
        }
    }

    /// Button custom id: `arena:{battle_id}:{move}`.
    pub fn custom_id(self, battle_id: &str) -> String {
        format!("{}:{}:{}", CUSTOM_ID_PREFIX, battle_id, self.as_str())
    }

    /// Parse a button custom id back into the battle id and move.
    pub fn from_custom_id(custom_id: &str) -> Option<(String, Move)> {
        let mut parts = custom_id.splitn(3, ':');
        if parts.next()? != CUSTOM_ID_PREFIX {
            return None;
        }
        let battle_id = parts.next()?;
        let mv = Move::parse(parts.next()?)?;
        if battle_id.is_empty() {
            return None;
        }
        Some((battle_id.to_string(), mv))
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}

/// Damage taken by each side when `a` meets `b`, as `(damage_to_a, damage_to_b)`.
///
/// Guard counters Strike, Charge breaks Guard, Strike interrupts Charge.
pub fn resolve(a: Move, b: Move) -> (i32, i32) {
    use Move::*;
    match (a, b) {
        (Strike, Strike) => (15, 15),
        (Charge, Charge) => (20, 20),
        (Guard, Guard) => (0, 0),
        (Strike, Guard) => (10, 0),
        (Guard, Strike) => (0, 10),
        (Charge, Guard) => (0, 30),
        (Guard, Charge) => (30, 0),
        (Strike, Charge) => (0, 25),
        (Charge, Strike) => (25, 0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub user_id: u64,
    pub bot_id: u32,
    pub bot_name: String,
    pub hp: i32,
    pub pending_move: Option<Move>,
}

impl Fighter {
    pub fn new(user_id: u64, bot_id: u32, bot_name: impl Into<String>) -> Self {
        Self {
            user_id,
            bot_id,
            bot_name: bot_name.into(),
            hp: STARTING_HP,
            pending_move: None,
        }
    }

    fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount).max(0);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    Pending,
    Active,
    Completed,
    Expired,
    Declined,
    Cancelled,
}

impl BattleStatus {
    /// Pending and active battles are open; everything else is terminal.
    pub fn is_open(self) -> bool {
        matches!(self, BattleStatus::Pending | BattleStatus::Active)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BattleStatus::Pending => "pending",
            BattleStatus::Active => "active",
            BattleStatus::Completed => "completed",
            BattleStatus::Expired => "expired",
            BattleStatus::Declined => "declined",
            BattleStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    pub challenger_move: Move,
    pub opponent_move: Move,
    pub challenger_damage: i32,
    pub opponent_damage: i32,
}

/// How a completed battle counts towards the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BattleResult {
    Victory { winner: u64, loser: u64 },
    Draw { first: u64, second: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub id: String,
    pub channel_id: u64,
    pub message_id: Option<u64>,
    pub challenger: Fighter,
    pub opponent_id: u64,
    pub opponent: Option<Fighter>,
    pub status: BattleStatus,
    pub round: u32,
    /// Unix seconds after which the current phase times out
    pub deadline: i64,
    pub round_timeout_secs: i64,
    pub created_at: i64,
    pub updated_at: i64,
    pub winner: Option<u64>,
    pub forfeit: bool,
    pub log: Vec<RoundSummary>,
}

impl Battle {
    /// Open a challenge from `challenger` against `opponent_id`.
    pub fn challenge(
        id: String,
        channel_id: u64,
        challenger: Fighter,
        opponent_id: u64,
        now: i64,
        challenge_timeout_secs: i64,
        round_timeout_secs: i64,
    ) -> Result<Self, ArenaError> {
        if challenger.user_id == opponent_id {
            return Err(ArenaError::SelfChallenge);
        }

        Ok(Self {
            id,
            channel_id,
            message_id: None,
            challenger,
            opponent_id,
            opponent: None,
            status: BattleStatus::Pending,
            round: 0,
            deadline: now.saturating_add(challenge_timeout_secs),
            round_timeout_secs,
            created_at: now,
            updated_at: now,
            winner: None,
            forfeit: false,
            log: Vec::new(),
        })
    }

    pub fn is_participant(&self, user_id: u64) -> bool {
        self.challenger.user_id == user_id || self.opponent_id == user_id
    }

    pub fn is_past_deadline(&self, now: i64) -> bool {
        now >= self.deadline
    }

    pub fn accept(&mut self, opponent: Fighter, now: i64) -> Result<(), ArenaError> {
        if self.status != BattleStatus::Pending {
            return Err(ArenaError::NotPending);
        }
        if opponent.user_id != self.opponent_id {
            return Err(ArenaError::NotOpponent);
        }
        if self.is_past_deadline(now) {
            return Err(ArenaError::DeadlinePassed);
        }

        self.opponent = Some(opponent);
        self.status = BattleStatus::Active;
        self.round = 1;
        self.deadline = now.saturating_add(self.round_timeout_secs);
        self.updated_at = now;
        Ok(())
    }

    pub fn decline(&mut self, user_id: u64, now: i64) -> Result<(), ArenaError> {
        if self.status != BattleStatus::Pending {
            return Err(ArenaError::NotPending);
        }
        if user_id != self.opponent_id {
            return Err(ArenaError::NotOpponent);
        }

        self.status = BattleStatus::Declined;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, user_id: u64, now: i64) -> Result<(), ArenaError> {
        if self.status != BattleStatus::Pending {
            return Err(ArenaError::NotPending);
        }
        if user_id != self.challenger.user_id {
            return Err(ArenaError::NotChallenger);
        }

        self.status = BattleStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Concede an active battle; the other fighter wins.
    pub fn forfeit(&mut self, user_id: u64, now: i64) -> Result<(), ArenaError> {
        if self.status != BattleStatus::Active {
            return Err(ArenaError::NotActive);
        }
        if !self.is_participant(user_id) {
            return Err(ArenaError::NotParticipant);
        }

        let winner = if user_id == self.challenger.user_id {
            self.opponent_id
        } else {
            self.challenger.user_id
        };
        self.finish(Some(winner), true, now);
        Ok(())
    }

    /// Lock in a move for the current round. Returns the round summary when
    /// this move completed the round.
    pub fn submit_move(
        &mut self,
        user_id: u64,
        mv: Move,
        now: i64,
    ) -> Result<Option<RoundSummary>, ArenaError> {
        if self.status != BattleStatus::Active {
            return Err(ArenaError::NotActive);
        }
        if self.is_past_deadline(now) {
            return Err(ArenaError::DeadlinePassed);
        }

        let challenger_id = self.challenger.user_id;
        let opponent = self.opponent.as_mut().ok_or(ArenaError::NotActive)?;
        let fighter = if user_id == challenger_id {
            &mut self.challenger
        } else if user_id == opponent.user_id {
            opponent
        } else {
            return Err(ArenaError::NotParticipant);
        };

        if fighter.pending_move.is_some() {
            return Err(ArenaError::MoveAlreadySubmitted);
        }
        fighter.pending_move = Some(mv);
        self.updated_at = now;

        Ok(self.resolve_round(now))
    }

    fn resolve_round(&mut self, now: i64) -> Option<RoundSummary> {
        let opponent = self.opponent.as_mut()?;
        let (Some(challenger_move), Some(opponent_move)) =
            (self.challenger.pending_move, opponent.pending_move)
        else {
            return None;
        };

        let (challenger_damage, opponent_damage) = resolve(challenger_move, opponent_move);
        self.challenger.take_damage(challenger_damage);
        opponent.take_damage(opponent_damage);
        self.challenger.pending_move = None;
        opponent.pending_move = None;

        let summary = RoundSummary {
            round: self.round,
            challenger_move,
            opponent_move,
            challenger_damage,
            opponent_damage,
        };
        self.log.push(summary.clone());

        let challenger_hp = self.challenger.hp;
        let opponent_hp = opponent.hp;
        if challenger_hp == 0 || opponent_hp == 0 || self.round >= MAX_ROUNDS {
            let winner = match challenger_hp.cmp(&opponent_hp) {
                std::cmp::Ordering::Greater => Some(self.challenger.user_id),
                std::cmp::Ordering::Less => Some(self.opponent_id),
                std::cmp::Ordering::Equal => None,
            };
            self.finish(winner, false, now);
        } else {
            self.round += 1;
            self.deadline = now.saturating_add(self.round_timeout_secs);
        }

        Some(summary)
    }

    /// Apply the timeout rules if the deadline has passed. Returns whether the
    /// battle changed.
    ///
    /// A pending challenge expires. An active round where exactly one fighter
    /// moved is won by that fighter; if nobody moved the battle expires.
    pub fn expire(&mut self, now: i64) -> bool {
        if !self.status.is_open() || !self.is_past_deadline(now) {
            return false;
        }

        match self.status {
            BattleStatus::Pending => {
                self.status = BattleStatus::Expired;
                self.updated_at = now;
            }
            BattleStatus::Active => {
                let challenger_moved = self.challenger.pending_move.is_some();
                let opponent_moved = self
                    .opponent
                    .as_ref()
                    .is_some_and(|f| f.pending_move.is_some());

                match (challenger_moved, opponent_moved) {
                    (true, false) => self.finish(Some(self.challenger.user_id), true, now),
                    (false, true) => self.finish(Some(self.opponent_id), true, now),
                    _ => {
                        self.status = BattleStatus::Expired;
                        self.updated_at = now;
                    }
                }
            }
            _ => return false,
        }
        true
    }

    fn finish(&mut self, winner: Option<u64>, forfeit: bool, now: i64) {
        self.status = BattleStatus::Completed;
        self.winner = winner;
        self.forfeit = forfeit;
        self.updated_at = now;
    }

    /// Record outcome of a completed battle.
    pub fn result(&self) -> Option<BattleResult> {
        if self.status != BattleStatus::Completed {
            return None;
        }
        let challenger = self.challenger.user_id;
        let opponent = self.opponent_id;
        Some(match self.winner {
            Some(winner) if winner == challenger => BattleResult::Victory {
                winner,
                loser: opponent,
            },
            Some(winner) => BattleResult::Victory { winner, loser: challenger },
            None => BattleResult::Draw { first: challenger, second: opponent },
        })
    }
}
