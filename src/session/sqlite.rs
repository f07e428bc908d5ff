use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, SiftError};
use crate::session::SessionStore;
use crate::value::FilterValue;

/// Durable session store backed by sqlite, for hosts without server-side
/// session state of their own. Rows are keyed by (session id, path, field)
/// and values are stored as JSON.
pub struct SqliteStore {
    conn: Connection,
    session_id: Uuid,
}

impl SqliteStore {
    /// Open (or create) the store at the given path. Pass a session id from
    /// the host's session cookie, or `None` to mint a fresh one.
    pub fn open(path: &Path, session_id: Option<Uuid>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn, session_id, Some(path))
    }

    /// In-memory store, handy for tests and single-process hosts.
    pub fn in_memory(session_id: Option<Uuid>) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, session_id, None)
    }

    fn from_connection(
        conn: Connection,
        session_id: Option<Uuid>,
        path: Option<&Path>,
    ) -> Result<Self> {
        // Performance pragmas
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS filter_state (
                session_id TEXT NOT NULL,
                path TEXT NOT NULL,
                field TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (session_id, path, field)
            );",
        )?;

        let session_id = session_id.unwrap_or_else(Uuid::new_v4);

        if let Some(p) = path {
            info!("Opened filter session store: {} ({})", p.display(), session_id);
        }

        Ok(SqliteStore { conn, session_id })
    }

    /// Default store path: ~/.sift/sessions.db
    pub fn default_store_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(SiftError::NoHomeDir)?;
        Ok(home.join(".sift").join("sessions.db"))
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Drop every stored value for this session (e.g. on logout).
    pub fn clear_session(&mut self) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM filter_state WHERE session_id = ?1",
            [self.session_id.to_string()],
        )?;
        Ok(deleted)
    }
}

impl SessionStore for SqliteStore {
    fn get(&self, path: &str, field: &str) -> Result<Option<FilterValue>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM filter_state
                 WHERE session_id = ?1 AND path = ?2 AND field = ?3",
                rusqlite::params![self.session_id.to_string(), path, field],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, path: &str, field: &str, value: &FilterValue) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO filter_state (session_id, path, field, value, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(session_id, path, field) DO UPDATE SET value = ?4, updated_at = ?5",
            rusqlite::params![
                self.session_id.to_string(),
                path,
                field,
                json,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn remove(&mut self, path: &str, field: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM filter_state WHERE session_id = ?1 AND path = ?2 AND field = ?3",
            rusqlite::params![self.session_id.to_string(), path, field],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_values() {
        let mut store = SqliteStore::in_memory(None).unwrap();
        store
            .set("/users", "limit", &FilterValue::Int(25))
            .unwrap();
        store
            .set("/users", "limit", &FilterValue::Int(50))
            .unwrap();

        assert_eq!(
            store.get("/users", "limit").unwrap(),
            Some(FilterValue::Int(50))
        );

        store.remove("/users", "limit").unwrap();
        assert_eq!(store.get("/users", "limit").unwrap(), None);
    }

    #[test]
    fn sessions_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("sessions.db");

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        {
            let mut store = SqliteStore::open(&db, Some(a)).unwrap();
            store
                .set("/users", "status", &FilterValue::Text("active".into()))
                .unwrap();
        }

        // Same session id sees the value after re-open; a different one
        // does not.
        let store_a = SqliteStore::open(&db, Some(a)).unwrap();
        assert_eq!(
            store_a.get("/users", "status").unwrap(),
            Some(FilterValue::Text("active".into()))
        );

        let store_b = SqliteStore::open(&db, Some(b)).unwrap();
        assert_eq!(store_b.get("/users", "status").unwrap(), None);
    }

    #[test]
    fn default_store_path_is_under_home() {
        let path = SqliteStore::default_store_path().unwrap();
        assert!(path.ends_with(".sift/sessions.db"));
    }

    #[test]
    fn clear_session_removes_all_paths() {
        let mut store = SqliteStore::in_memory(None).unwrap();
        store
            .set("/users", "status", &FilterValue::Text("active".into()))
            .unwrap();
        store
            .set("/orders", "status", &FilterValue::Text("open".into()))
            .unwrap();

        assert_eq!(store.clear_session().unwrap(), 2);
        assert_eq!(store.get("/users", "status").unwrap(), None);
    }
}
