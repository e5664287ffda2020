//! Database operations and data access layer.
//!
//! This module provides a repository pattern for database operations,
//! separating database concerns from business logic.

use crate::arena::{Battle, BattleResult, BattleStatus};
use crate::error::{GlyphBotsError, Result};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

/// Win/loss record of an arena fighter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaRecord {
    pub user_id: u64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl ArenaRecord {
    pub fn empty(user_id: u64) -> Self {
        Self {
            user_id,
            wins: 0,
            losses: 0,
            draws: 0,
        }
    }
}

/// A message posted by the playground scheduler.
#[derive(Debug, Clone)]
pub struct PlaygroundPost {
    pub kind: String,
    pub channel_id: u64,
    pub message_id: u64,
    pub posted_at: i64,
}

/// Initialize the database schema.
///
/// Creates the necessary tables and indices if they don't already exist.
/// Also creates the parent directory if needed.
///
/// # Errors
///
/// Returns an error if the database cannot be created or initialized.
pub async fn init_db(path: &str) -> Result<()> {
    let path = path.to_string();
    tokio::task::spawn_blocking(move || init_db_sync(&path))
        .await
        .map_err(|e| GlyphBotsError::Database(format!("Task join error: {}", e)))??;
    Ok(())
}

fn init_db_sync(path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(path)?;

    // Full battle state is stored as JSON; the other columns are for querying
    conn.execute(
        "CREATE TABLE IF NOT EXISTS arena_battles (
            id TEXT NOT NULL PRIMARY KEY,
            status TEXT NOT NULL,
            channel_id INTEGER NOT NULL,
            message_id INTEGER,
            state TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_arena_battles_status ON arena_battles(status, updated_at)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS arena_records (
            user_id INTEGER NOT NULL PRIMARY KEY,
            wins INTEGER NOT NULL DEFAULT 0,
            losses INTEGER NOT NULL DEFAULT 0,
            draws INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS playground_posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,
            channel_id INTEGER NOT NULL,
            message_id INTEGER NOT NULL,
            posted_at INTEGER NOT NULL
        )",
        [],
    )?;

    Ok(())
}

// SQLite stores INTEGER as i64; Discord snowflakes fit in the positive range.
fn to_sql_id(id: u64) -> i64 {
    id as i64
}

fn from_sql_id(id: i64) -> u64 {
    id as u64
}

fn decode_battle(state: String) -> Result<Battle> {
    serde_json::from_str(&state)
        .map_err(|e| GlyphBotsError::Database(format!("Corrupt battle state: {}", e)))
}

/// Repository for arena battles and fighter records.
#[derive(Clone)]
pub struct BattleRepository {
    db_path: String,
}

impl BattleRepository {
    /// Create a new battle repository.
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// Insert or update a battle. When `result` is given the fighters' records
    /// are updated in the same transaction.
    pub async fn save_battle(&self, battle: &Battle, result: Option<BattleResult>) -> Result<()> {
        let db_path = self.db_path.clone();
        let state = serde_json::to_string(battle)?;
        let id = battle.id.clone();
        let status = battle.status.as_str();
        let channel_id = to_sql_id(battle.channel_id);
        let message_id = battle.message_id.map(to_sql_id);
        let created_at = battle.created_at;
        let updated_at = battle.updated_at;

        tokio::task::spawn_blocking(move || {
            let mut conn = Connection::open(&db_path)?;
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO arena_battles
                    (id, status, channel_id, message_id, state, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                    status = ?2, channel_id = ?3, message_id = ?4, state = ?5, updated_at = ?7",
                rusqlite::params![
                    id, status, channel_id, message_id, state, created_at, updated_at
                ],
            )?;

            match result {
                Some(BattleResult::Victory { winner, loser }) => {
                    bump_record(&tx, winner, "wins")?;
                    bump_record(&tx, loser, "losses")?;
                }
                Some(BattleResult::Draw { first, second }) => {
                    bump_record(&tx, first, "draws")?;
                    bump_record(&tx, second, "draws")?;
                }
                None => {}
            }

            tx.commit()?;
            Ok::<_, GlyphBotsError>(())
        })
        .await
        .map_err(|e| GlyphBotsError::Database(format!("Task join error: {}", e)))??;
        Ok(())
    }

    /// Get a battle by id.
    pub async fn get_battle(&self, id: &str) -> Result<Option<Battle>> {
        let db_path = self.db_path.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let state: Option<String> = conn
                .query_row(
                    "SELECT state FROM arena_battles WHERE id = ?1",
                    rusqlite::params![id],
                    |row| row.get(0),
                )
                .optional()?;
            state.map(decode_battle).transpose()
        })
        .await
        .map_err(|e| GlyphBotsError::Database(format!("Task join error: {}", e)))?
    }

    /// All pending and active battles, oldest first.
    pub async fn load_open(&self) -> Result<Vec<Battle>> {
        self.load_where_status(
            &[BattleStatus::Pending, BattleStatus::Active],
            "created_at ASC",
            None,
        )
        .await
    }

    /// Most recently completed battles, newest first.
    pub async fn recent_completed(&self, limit: u32) -> Result<Vec<Battle>> {
        self.load_where_status(&[BattleStatus::Completed], "updated_at DESC", Some(limit))
            .await
    }

    async fn load_where_status(
        &self,
        statuses: &[BattleStatus],
        order: &'static str,
        limit: Option<u32>,
    ) -> Result<Vec<Battle>> {
        let db_path = self.db_path.clone();
        let statuses: Vec<&'static str> = statuses.iter().map(|s| s.as_str()).collect();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let placeholders = (1..=statuses.len())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let mut sql = format!(
                "SELECT state FROM arena_battles WHERE status IN ({}) ORDER BY {}",
                placeholders, order
            );
            if let Some(limit) = limit {
                sql.push_str(&format!(" LIMIT {}", limit));
            }

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(statuses.iter()), |row| {
                row.get::<_, String>(0)
            })?;

            let mut battles = Vec::new();
            for state in rows {
                battles.push(decode_battle(state?)?);
            }
            Ok::<_, GlyphBotsError>(battles)
        })
        .await
        .map_err(|e| GlyphBotsError::Database(format!("Task join error: {}", e)))?
    }

    /// Record of a single user; zeroes if they never fought.
    pub async fn record(&self, user_id: u64) -> Result<ArenaRecord> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let record = conn
                .query_row(
                    "SELECT user_id, wins, losses, draws FROM arena_records WHERE user_id = ?1",
                    rusqlite::params![to_sql_id(user_id)],
                    map_record,
                )
                .optional()?;
            Ok::<_, GlyphBotsError>(record.unwrap_or_else(|| ArenaRecord::empty(user_id)))
        })
        .await
        .map_err(|e| GlyphBotsError::Database(format!("Task join error: {}", e)))?
    }

    /// Top fighters by wins, then fewest losses.
    pub async fn leaderboard(&self, limit: u32) -> Result<Vec<ArenaRecord>> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let mut stmt = conn.prepare(
                "SELECT user_id, wins, losses, draws FROM arena_records
                 ORDER BY wins DESC, losses ASC, draws DESC, user_id ASC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map(rusqlite::params![limit], map_record)?;

            let mut records = Vec::new();
            for record in rows {
                records.push(record?);
            }
            Ok::<_, GlyphBotsError>(records)
        })
        .await
        .map_err(|e| GlyphBotsError::Database(format!("Task join error: {}", e)))?
    }
}

fn bump_record(conn: &Connection, user_id: u64, column: &'static str) -> rusqlite::Result<()> {
    let sql = format!(
        "INSERT INTO arena_records (user_id, {column}) VALUES (?1, 1)
         ON CONFLICT(user_id) DO UPDATE SET {column} = {column} + 1"
    );
    conn.execute(&sql, rusqlite::params![to_sql_id(user_id)])?;
    Ok(())
}

fn map_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ArenaRecord> {
    Ok(ArenaRecord {
        user_id: from_sql_id(row.get(0)?),
        wins: row.get(1)?,
        losses: row.get(2)?,
        draws: row.get(3)?,
    })
}

/// Repository for the playground post history.
#[derive(Clone)]
pub struct PlaygroundRepository {
    db_path: String,
}

impl PlaygroundRepository {
    pub fn new(db_path: String) -> Self {
        Self { db_path }
    }

    /// Remember a post that went out.
    pub async fn record_post(&self, post: PlaygroundPost) -> Result<()> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute(
                "INSERT INTO playground_posts (kind, channel_id, message_id, posted_at)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    post.kind,
                    to_sql_id(post.channel_id),
                    to_sql_id(post.message_id),
                    post.posted_at
                ],
            )?;
            Ok::<_, GlyphBotsError>(())
        })
        .await
        .map_err(|e| GlyphBotsError::Database(format!("Task join error: {}", e)))??;
        Ok(())
    }

    /// The latest post, if any.
    pub async fn last_post(&self) -> Result<Option<PlaygroundPost>> {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let post = conn
                .query_row(
                    "SELECT kind, channel_id, message_id, posted_at FROM playground_posts
                     ORDER BY posted_at DESC, id DESC LIMIT 1",
                    [],
                    |row| {
                        Ok(PlaygroundPost {
                            kind: row.get(0)?,
                            channel_id: from_sql_id(row.get(1)?),
                            message_id: from_sql_id(row.get(2)?),
                            posted_at: row.get(3)?,
                        })
                    },
                )
                .optional()?;
            Ok::<_, GlyphBotsError>(post)
        })
        .await
        .map_err(|e| GlyphBotsError::Database(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{Fighter, Move};
    use tempfile::TempDir;

    /// Helper function to create a test database in a temporary directory
    async fn setup_test_db() -> (TempDir, String) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("test.db");
        let db_path_str = db_path.to_str().expect("Invalid path").to_string();

        init_db(&db_path_str).await.expect("Failed to initialize database");

        (temp_dir, db_path_str)
    }

    fn battle(id: &str, challenger: u64, opponent: u64, now: i64) -> Battle {
        Battle::challenge(
            id.to_string(),
            900,
            Fighter::new(challenger, 42, "Vexel"),
            opponent,
            now,
            120,
            90,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_init_db_is_idempotent() {
        let (_temp_dir, path) = setup_test_db().await;
        assert!(init_db(&path).await.is_ok());
    }

    #[tokio::test]
    async fn test_save_and_get_battle() {
        let (_temp_dir, path) = setup_test_db().await;
        let repo = BattleRepository::new(path);

        let mut b = battle("b1", 1, 2, 100);
        repo.save_battle(&b, None).await.unwrap();

        b.accept(Fighter::new(2, 7, "Quill"), 110).unwrap();
        b.submit_move(1, Move::Guard, 111).unwrap();
        b.message_id = Some(5555);
        repo.save_battle(&b, None).await.unwrap();

        let stored = repo.get_battle("b1").await.unwrap().unwrap();
        assert_eq!(stored.status, BattleStatus::Active);
        assert_eq!(stored.message_id, Some(5555));
        assert_eq!(stored.challenger.pending_move, Some(Move::Guard));

        assert!(repo.get_battle("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_open_skips_terminal_battles() {
        let (_temp_dir, path) = setup_test_db().await;
        let repo = BattleRepository::new(path);

        let open = battle("open", 1, 2, 100);
        let mut declined = battle("declined", 3, 4, 50);
        declined.decline(4, 60).unwrap();
        let mut active = battle("active", 5, 6, 10);
        active.accept(Fighter::new(6, 1, "Bolt"), 20).unwrap();

        for b in [&open, &declined, &active] {
            repo.save_battle(b, None).await.unwrap();
        }

        let loaded = repo.load_open().await.unwrap();
        let ids: Vec<&str> = loaded.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["active", "open"]);
    }

    #[tokio::test]
    async fn test_results_update_records_and_leaderboard() {
        let (_temp_dir, path) = setup_test_db().await;
        let repo = BattleRepository::new(path);

        let alice = 10;
        let bob = 20;
        let carol = 30;

        let results = [
            BattleResult::Victory { winner: alice, loser: bob },
            BattleResult::Victory { winner: alice, loser: carol },
            BattleResult::Draw { first: bob, second: carol },
            BattleResult::Victory { winner: carol, loser: bob },
        ];
        for (i, result) in results.into_iter().enumerate() {
            let mut b = battle(&format!("r{}", i), 100 + i as u64, 200 + i as u64, i as i64);
            b.status = BattleStatus::Completed;
            repo.save_battle(&b, Some(result)).await.unwrap();
        }

        assert_eq!(
            repo.record(alice).await.unwrap(),
            ArenaRecord { user_id: alice, wins: 2, losses: 0, draws: 0 }
        );
        assert_eq!(
            repo.record(bob).await.unwrap(),
            ArenaRecord { user_id: bob, wins: 0, losses: 2, draws: 1 }
        );
        assert_eq!(repo.record(999).await.unwrap(), ArenaRecord::empty(999));

        let board = repo.leaderboard(2).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].user_id, alice);
        assert_eq!(board[1].user_id, carol);

        let completed = repo.recent_completed(3).await.unwrap();
        assert_eq!(completed.len(), 3);
        assert_eq!(completed[0].id, "r3");
    }

    #[tokio::test]
    async fn test_playground_posts() {
        let (_temp_dir, path) = setup_test_db().await;
        let repo = PlaygroundRepository::new(path);

        assert!(repo.last_post().await.unwrap().is_none());

        for (kind, at) in [("bot_spotlight", 100), ("bot_lore", 200)] {
            repo.record_post(PlaygroundPost {
                kind: kind.to_string(),
                channel_id: 1,
                message_id: at as u64,
                posted_at: at,
            })
            .await
            .unwrap();
        }

        let last = repo.last_post().await.unwrap().unwrap();
        assert_eq!(last.kind, "bot_lore");
        assert_eq!(last.message_id, 200);
    }
}
