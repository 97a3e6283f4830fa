//! SQLite persistence layer.
//!
//! RULE: Only store.rs talks to the database.
//! The processor and read models call store methods — they never execute SQL
//! directly. Writes go through [`GameTx`], an immediate transaction, so the
//! idempotency check and the profile mutation commit as one unit.

use crate::badge::Badge;
use crate::error::{classify_db_error, GameError, GameResult};
use crate::event::LedgerEntry;
use crate::leaderboard::LeaderboardRow;
use crate::profile::GamificationProfile;
use crate::types::BadgeCode;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::HashSet;
use std::time::Duration;

/// Bound on any blocking database call; expiry surfaces as a retryable error.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct GameStore {
    conn: Connection,
}

impl GameStore {
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(|e| GameError::Unavailable(e.to_string()))?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open(":memory:")
            .map_err(|e| GameError::Unavailable(e.to_string()))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn
            .execute_batch(include_str!("../migrations/001_foundation.sql"))?;
        Ok(())
    }

    /// Begin an immediate transaction. Immediate mode takes the write lock up
    /// front, which serializes concurrent submissions for the same user.
    pub fn begin(&mut self) -> GameResult<GameTx<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(classify_db_error)?;
        Ok(GameTx { tx })
    }

    // ── Read models (committed state only) ─────────────────────

    pub fn profile(&self, user_id: &str) -> GameResult<Option<GamificationProfile>> {
        profile_on(&self.conn, user_id)
    }

    pub fn badges_for(&self, user_id: &str) -> GameResult<Vec<Badge>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, badge_code, title, description, earned_at
             FROM game_badge WHERE user_id = ?1
             ORDER BY earned_at DESC, id DESC",
        )?;
        let badges = stmt
            .query_map(params![user_id], |row| {
                Ok(Badge {
                    user_id: row.get(0)?,
                    badge_code: row.get(1)?,
                    title: row.get(2)?,
                    description: row.get(3)?,
                    earned_at: parse_ts(&row.get::<_, String>(4)?, 4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(badges)
    }

    pub fn leaderboard(&self, limit: usize) -> GameResult<Vec<LeaderboardRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, points, level, streak_current
             FROM game_profile
             ORDER BY points DESC, user_id ASC
             LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(LeaderboardRow {
                    user_id: row.get(0)?,
                    points: row.get(1)?,
                    level: row.get(2)?,
                    streak_current: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Delete ledger rows for days strictly before `before`. Retention is a
    /// deployment policy; pruned days lose idempotency replay and cap history.
    pub fn prune_events(&self, before: NaiveDate) -> GameResult<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM game_event WHERE occurred_day < ?1",
            params![before.to_string()],
        )?;
        Ok(deleted)
    }
}

/// One atomic processing unit: idempotency lookup, cap accounting, profile
/// upsert, badge inserts, and the ledger append all ride this transaction.
pub struct GameTx<'c> {
    tx: rusqlite::Transaction<'c>,
}

impl GameTx<'_> {
    pub fn ledger_lookup(&self, user_id: &str, key: &str) -> GameResult<Option<String>> {
        let result = self
            .tx
            .query_row(
                "SELECT result_json FROM game_event
                 WHERE user_id = ?1 AND idempotency_key = ?2",
                params![user_id, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(result)
    }

    pub fn profile(&self, user_id: &str) -> GameResult<Option<GamificationProfile>> {
        profile_on(&self.tx, user_id)
    }

    /// Points already awarded to this user for this event type on `day`.
    pub fn awarded_on_day(
        &self,
        user_id: &str,
        event_type: &str,
        day: NaiveDate,
    ) -> GameResult<i64> {
        let total = self.tx.query_row(
            "SELECT COALESCE(SUM(awarded_points), 0) FROM game_event
             WHERE user_id = ?1 AND event_type = ?2 AND occurred_day = ?3",
            params![user_id, event_type, day.to_string()],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(total)
    }

    pub fn upsert_profile(&self, p: &GamificationProfile) -> GameResult<()> {
        self.tx
            .execute(
                "INSERT INTO game_profile (
                    user_id, points, xp, level, streak_current, streak_longest,
                    last_event_date, updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(user_id) DO UPDATE SET
                    points = excluded.points,
                    xp = excluded.xp,
                    level = excluded.level,
                    streak_current = excluded.streak_current,
                    streak_longest = excluded.streak_longest,
                    last_event_date = excluded.last_event_date,
                    updated_at = excluded.updated_at",
                params![
                    &p.user_id,
                    p.points,
                    p.xp,
                    p.level,
                    p.streak_current,
                    p.streak_longest,
                    p.last_event_date.map(|d| d.to_string()),
                    p.updated_at.to_rfc3339(),
                ],
            )
            .map_err(classify_db_error)?;
        Ok(())
    }

    pub fn held_badges(&self, user_id: &str) -> GameResult<HashSet<BadgeCode>> {
        let mut stmt = self
            .tx
            .prepare("SELECT badge_code FROM game_badge WHERE user_id = ?1")?;
        let codes = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(codes)
    }

    pub fn insert_badge(&self, badge: &Badge) -> GameResult<()> {
        self.tx
            .execute(
                "INSERT OR IGNORE INTO game_badge
                    (user_id, badge_code, title, description, earned_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    &badge.user_id,
                    &badge.badge_code,
                    &badge.title,
                    &badge.description,
                    badge.earned_at.to_rfc3339(),
                ],
            )
            .map_err(classify_db_error)?;
        Ok(())
    }

    pub fn append_ledger(&self, entry: &LedgerEntry) -> GameResult<()> {
        self.tx
            .execute(
                "INSERT INTO game_event (
                    user_id, event_type, idempotency_key, device_id, lat, lng,
                    awarded_points, occurred_day, result_json, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    &entry.user_id,
                    &entry.event_type,
                    &entry.idempotency_key,
                    &entry.device_id,
                    entry.lat,
                    entry.lng,
                    entry.awarded_points,
                    entry.occurred_day.to_string(),
                    &entry.result_json,
                    entry.created_at.to_rfc3339(),
                ],
            )
            .map_err(classify_db_error)?;
        Ok(())
    }

    pub fn commit(self) -> GameResult<()> {
        self.tx.commit().map_err(classify_db_error)
    }
}

// ── Row mapping helpers ────────────────────────────────────────

fn profile_on(conn: &Connection, user_id: &str) -> GameResult<Option<GamificationProfile>> {
    let profile = conn
        .query_row(
            "SELECT user_id, points, xp, level, streak_current, streak_longest,
                    last_event_date, updated_at
             FROM game_profile WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(GamificationProfile {
                    user_id: row.get(0)?,
                    points: row.get(1)?,
                    xp: row.get(2)?,
                    level: row.get(3)?,
                    streak_current: row.get(4)?,
                    streak_longest: row.get(5)?,
                    last_event_date: row
                        .get::<_, Option<String>>(6)?
                        .map(|s| parse_day(&s, 6))
                        .transpose()?,
                    updated_at: parse_ts(&row.get::<_, String>(7)?, 7)?,
                })
            },
        )
        .optional()?;
    Ok(profile)
}

fn parse_day(s: &str, idx: usize) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_ts(s: &str, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
