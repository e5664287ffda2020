use super::{ArenaError, Battle, Fighter, Move, RoundSummary};
use crate::database::{ArenaRecord, BattleRepository};
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{info, warn};

const ALPHANUMERIC: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz23456789";
const BATTLE_ID_LEN: usize = 8;

/// Phase lengths for new battles.
#[derive(Debug, Clone, Copy)]
pub struct ArenaTimeouts {
    pub challenge: Duration,
    pub round: Duration,
}

/// Owns every open battle and persists each transition before it becomes visible.
pub struct ArenaManager {
    battles: RwLock<HashMap<String, Battle>>,
    repository: BattleRepository,
    timeouts: ArenaTimeouts,
}

impl ArenaManager {
    pub fn new(repository: BattleRepository, timeouts: ArenaTimeouts) -> Self {
        Self {
            battles: RwLock::new(HashMap::new()),
            repository,
            timeouts,
        }
    }

    /// Reload open battles from the database. Returns how many were restored.
    pub async fn restore(&self) -> Result<usize, ArenaError> {
        let open = self.repository.load_open().await?;
        let mut battles = self.battles.write().await;
        let count = open.len();
        for battle in open {
            battles.insert(battle.id.clone(), battle);
        }
        Ok(count)
    }

    /// Open a challenge. Either user being in an open battle already is refused.
    pub async fn challenge(
        &self,
        challenger: Fighter,
        opponent_id: u64,
        opponent_is_bot: bool,
        channel_id: u64,
        now: i64,
    ) -> Result<Battle, ArenaError> {
        if opponent_is_bot {
            return Err(ArenaError::BotOpponent);
        }

        let mut battles = self.battles.write().await;
        for user_id in [challenger.user_id, opponent_id] {
            if battles.values().any(|b| b.is_participant(user_id)) {
                return Err(ArenaError::AlreadyInBattle { user_id });
            }
        }

        let id = loop {
            let candidate = new_battle_id();
            if !battles.contains_key(&candidate) {
                break candidate;
            }
        };

        let battle = Battle::challenge(
            id,
            channel_id,
            challenger,
            opponent_id,
            now,
            whole_secs(self.timeouts.challenge),
            whole_secs(self.timeouts.round),
        )?;

        self.repository.save_battle(&battle, None).await?;
        battles.insert(battle.id.clone(), battle.clone());
        info!(
            battle_id = %battle.id,
            challenger = battle.challenger.user_id,
            opponent = opponent_id,
            "arena challenge opened"
        );
        Ok(battle)
    }

    /// Accept the pending challenge addressed to `fighter.user_id`.
    pub async fn accept_for(&self, fighter: Fighter, now: i64) -> Result<Battle, ArenaError> {
        let user_id = fighter.user_id;
        let id = self
            .find_open(|b| b.opponent_id == user_id && b.opponent.is_none())
            .await
            .ok_or(ArenaError::NoOpenBattle)?;
        self.update(&id, |b| b.accept(fighter, now)).await.map(|(b, _)| b)
    }

    /// Decline the pending challenge addressed to `user_id`.
    pub async fn decline_for(&self, user_id: u64, now: i64) -> Result<Battle, ArenaError> {
        let id = self
            .find_open(|b| b.opponent_id == user_id && b.opponent.is_none())
            .await
            .ok_or(ArenaError::NoOpenBattle)?;
        self.update(&id, |b| b.decline(user_id, now)).await.map(|(b, _)| b)
    }

    /// Withdraw the pending challenge sent by `user_id`.
    pub async fn cancel_for(&self, user_id: u64, now: i64) -> Result<Battle, ArenaError> {
        let id = self
            .find_open(|b| b.challenger.user_id == user_id && b.opponent.is_none())
            .await
            .ok_or(ArenaError::NoOpenBattle)?;
        self.update(&id, |b| b.cancel(user_id, now)).await.map(|(b, _)| b)
    }

    /// Concede the active battle `user_id` is fighting in.
    pub async fn forfeit_for(&self, user_id: u64, now: i64) -> Result<Battle, ArenaError> {
        let id = self
            .find_open(|b| b.is_participant(user_id) && b.opponent.is_some())
            .await
            .ok_or(ArenaError::NoOpenBattle)?;
        self.update(&id, |b| b.forfeit(user_id, now)).await.map(|(b, _)| b)
    }

    /// Lock in a move; returns the battle and the round summary if the round resolved.
    pub async fn submit_move(
        &self,
        battle_id: &str,
        user_id: u64,
        mv: Move,
        now: i64,
    ) -> Result<(Battle, Option<RoundSummary>), ArenaError> {
        self.update(battle_id, |b| b.submit_move(user_id, mv, now)).await
    }

    /// Remember where the battle is displayed so later updates can edit it.
    pub async fn attach_message(
        &self,
        battle_id: &str,
        channel_id: u64,
        message_id: u64,
    ) -> Result<Battle, ArenaError> {
        self.update(battle_id, |b| {
            b.channel_id = channel_id;
            b.message_id = Some(message_id);
            Ok(())
        })
        .await
        .map(|(b, _)| b)
    }

    /// The open battle `user_id` takes part in, if any.
    pub async fn open_battle_for(&self, user_id: u64) -> Option<Battle> {
        let battles = self.battles.read().await;
        battles.values().find(|b| b.is_participant(user_id)).cloned()
    }

    pub async fn open_count(&self) -> usize {
        self.battles.read().await.len()
    }

    /// Time out every battle whose deadline has passed. Battles that fail to
    /// persist stay in memory and are retried by the next sweep.
    pub async fn sweep_expired(&self, now: i64) -> Vec<Battle> {
        let mut battles = self.battles.write().await;
        let due: Vec<String> = battles
            .values()
            .filter(|b| b.is_past_deadline(now))
            .map(|b| b.id.clone())
            .collect();

        let mut expired = Vec::new();
        for id in due {
            let Some(current) = battles.get(&id) else { continue };
            let mut next = current.clone();
            if !next.expire(now) {
                continue;
            }

            match self.repository.save_battle(&next, next.result()).await {
                Ok(()) => {
                    battles.remove(&id);
                    info!(battle_id = %id, status = next.status.as_str(), "arena battle timed out");
                    expired.push(next);
                }
                Err(error) => {
                    warn!(battle_id = %id, error = %error, "failed to persist expired battle");
                }
            }
        }
        expired
    }

    pub async fn record_for(&self, user_id: u64) -> Result<ArenaRecord, ArenaError> {
        Ok(self.repository.record(user_id).await?)
    }

    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<ArenaRecord>, ArenaError> {
        Ok(self.repository.leaderboard(limit).await?)
    }

    pub async fn recent_completed(&self, limit: u32) -> Result<Vec<Battle>, ArenaError> {
        Ok(self.repository.recent_completed(limit).await?)
    }

    async fn find_open<P>(&self, predicate: P) -> Option<String>
    where
        P: Fn(&Battle) -> bool,
    {
        let battles = self.battles.read().await;
        battles.values().find(|b| predicate(b)).map(|b| b.id.clone())
    }

    /// Apply a transition to a copy, persist it, then publish it. Terminal
    /// battles leave the in-memory map.
    async fn update<T, F>(&self, battle_id: &str, apply: F) -> Result<(Battle, T), ArenaError>
    where
        F: FnOnce(&mut Battle) -> Result<T, ArenaError>,
    {
        let mut battles = self.battles.write().await;
        let current = battles.get(battle_id).ok_or(ArenaError::NotFound)?;
        let mut next = current.clone();
        let value = apply(&mut next)?;

        self.repository.save_battle(&next, next.result()).await?;

        if next.status.is_open() {
            battles.insert(next.id.clone(), next.clone());
        } else {
            battles.remove(battle_id);
            info!(
                battle_id = %next.id,
                status = next.status.as_str(),
                winner = ?next.winner,
                "arena battle closed"
            );
        }
        Ok((next, value))
    }
}

/// Duration as whole seconds, saturating instead of wrapping negative.
fn whole_secs(duration: Duration) -> i64 {
    i64::try_from(duration.as_secs()).unwrap_or(i64::MAX)
}

fn new_battle_id() -> String {
    let mut rng = rand::rng();
    (0..BATTLE_ID_LEN)
        .map(|_| ALPHANUMERIC[rng.random_range(0..ALPHANUMERIC.len())] as char)
        .collect()
}
