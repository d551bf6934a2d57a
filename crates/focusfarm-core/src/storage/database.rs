//! SQLite-backed local cache and key-value store.
//!
//! Holds a mirror of the user's session history and categories (so the
//! dashboard and CLI work offline), plus a string key-value table for
//! engine snapshots and per-period claim markers. The remote progress
//! store stays the source of truth for cross-device state.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::data_dir;
use crate::error::DatabaseError;
use crate::remote::{Category, StudySession};

/// Local SQLite database at `~/.config/focusfarm/focusfarm.db`.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database, creating the file and schema if needed.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        let path = dir.join("focusfarm.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id           TEXT PRIMARY KEY,
                task_name    TEXT,
                category_id  TEXT,
                duration_min INTEGER NOT NULL,
                leave_count  INTEGER NOT NULL DEFAULT 0,
                started_at   TEXT NOT NULL,
                ended_at     TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS categories (
                id    TEXT PRIMARY KEY,
                name  TEXT NOT NULL,
                color TEXT NOT NULL DEFAULT '',
                icon  TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_started_at ON sessions(started_at);",
        )?;
        Ok(())
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Cache a finished session locally.
    pub fn record_session(&self, session: &StudySession) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sessions
                 (id, task_name, category_id, duration_min, leave_count, started_at, ended_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.id.to_string(),
                session.task_name,
                session.category_id.map(|id| id.to_string()),
                session.duration_min,
                session.leave_count,
                session.started_at.to_rfc3339(),
                session.ended_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Sessions started within the last `days` days, newest first.
    pub fn sessions_since(&self, days: u32) -> Result<Vec<StudySession>, DatabaseError> {
        let cutoff = (Utc::now() - Duration::days(days as i64)).to_rfc3339();
        let mut stmt = self.conn.prepare(
            "SELECT id, task_name, category_id, duration_min, leave_count, started_at, ended_at
             FROM sessions WHERE started_at >= ?1 ORDER BY started_at DESC",
        )?;
        let rows = stmt.query_map(params![cutoff], session_from_row)?;
        collect_sessions(rows)
    }

    /// Sessions started within `[start, end)`, oldest first.
    pub fn sessions_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<StudySession>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_name, category_id, duration_min, leave_count, started_at, ended_at
             FROM sessions WHERE started_at >= ?1 AND started_at < ?2 ORDER BY started_at ASC",
        )?;
        let rows = stmt.query_map(params![start.to_rfc3339(), end.to_rfc3339()], session_from_row)?;
        collect_sessions(rows)
    }

    /// Replace the whole session cache (sync pull).
    pub fn replace_sessions(&mut self, sessions: &[StudySession]) -> Result<(), DatabaseError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM sessions", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO sessions
                     (id, task_name, category_id, duration_min, leave_count, started_at, ended_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for session in sessions {
                stmt.execute(params![
                    session.id.to_string(),
                    session.task_name,
                    session.category_id.map(|id| id.to_string()),
                    session.duration_min,
                    session.leave_count,
                    session.started_at.to_rfc3339(),
                    session.ended_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ── Categories ───────────────────────────────────────────────────

    pub fn upsert_category(&self, category: &Category) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO categories (id, name, color, icon) VALUES (?1, ?2, ?3, ?4)",
            params![
                category.id.to_string(),
                category.name,
                category.color,
                category.icon,
            ],
        )?;
        Ok(())
    }

    /// Delete a category. Historical sessions keep their category id.
    pub fn delete_category(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(
            "DELETE FROM categories WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(changed > 0)
    }

    pub fn list_categories(&self) -> Result<Vec<Category>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color, icon FROM categories ORDER BY name ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: parse_uuid(row.get::<_, String>(0)?, 0)?,
                name: row.get(1)?,
                color: row.get(2)?,
                icon: row.get(3)?,
            })
        })?;
        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    // ── Key-value ────────────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

fn session_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StudySession> {
    Ok(StudySession {
        id: parse_uuid(row.get::<_, String>(0)?, 0)?,
        task_name: row.get(1)?,
        category_id: row
            .get::<_, Option<String>>(2)?
            .map(|raw| parse_uuid(raw, 2))
            .transpose()?,
        duration_min: row.get(3)?,
        leave_count: row.get(4)?,
        started_at: parse_rfc3339(row.get::<_, String>(5)?, 5)?,
        ended_at: parse_rfc3339(row.get::<_, String>(6)?, 6)?,
    })
}

fn collect_sessions(
    rows: impl Iterator<Item = rusqlite::Result<StudySession>>,
) -> Result<Vec<StudySession>, DatabaseError> {
    let mut sessions = Vec::new();
    for row in rows {
        sessions.push(row?);
    }
    Ok(sessions)
}

fn parse_uuid(raw: String, idx: usize) -> rusqlite::Result<Uuid> {
    raw.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_rfc3339(raw: String, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
