//! Snapshot stores

use parking_lot::Mutex;
use rusqlite::OptionalExtension;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use skiff_storage::Database;

use crate::snapshot::{ScopeId, SessionSnapshot};
use crate::Result;

/// Durable home of session snapshots, one per scope.
pub trait SessionStore: Send + Sync {
    fn save(&self, scope: &ScopeId, snapshot: &SessionSnapshot) -> Result<()>;

    fn load(&self, scope: &ScopeId) -> Result<Option<SessionSnapshot>>;

    /// Forget everything stored for the scope.
    fn clear_archive(&self, scope: &ScopeId) -> Result<()>;
}

/// SQLite-backed store using the `session_snapshots` table.
#[derive(Clone)]
pub struct SqliteSessionStore {
    db: Database,
}

impl SqliteSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl SessionStore for SqliteSessionStore {
    fn save(&self, scope: &ScopeId, snapshot: &SessionSnapshot) -> Result<()> {
        let payload = snapshot.to_json()?;
        let tab_count = snapshot.tabs.len() as i64;

        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO session_snapshots
                 (scope_id, payload, sequence, tab_count, saved_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    scope.as_str(),
                    payload,
                    snapshot.sequence as i64,
                    tab_count,
                    snapshot.saved_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;

        tracing::debug!(
            scope = %scope,
            sequence = snapshot.sequence,
            tab_count,
            "Saved session snapshot"
        );
        Ok(())
    }

    fn load(&self, scope: &ScopeId) -> Result<Option<SessionSnapshot>> {
        let payload: Option<String> = self.db.with_connection(|conn| {
            let payload = conn
                .query_row(
                    "SELECT payload FROM session_snapshots WHERE scope_id = ?1",
                    [scope.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(payload)
        })?;

        payload
            .map(|raw| SessionSnapshot::from_json(&raw))
            .transpose()
    }

    fn clear_archive(&self, scope: &ScopeId) -> Result<()> {
        let removed = self.db.with_connection(|conn| {
            let removed = conn.execute(
                "DELETE FROM session_snapshots WHERE scope_id = ?1",
                [scope.as_str()],
            )?;
            Ok(removed)
        })?;

        tracing::info!(scope = %scope, removed, "Cleared session archive");
        Ok(())
    }
}

/// Volatile store, for tests and for sessions that must not touch disk.
#[derive(Default)]
pub struct MemorySessionStore {
    snapshots: Mutex<HashMap<ScopeId, SessionSnapshot>>,
    saves: AtomicUsize,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `save` calls so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, scope: &ScopeId, snapshot: &SessionSnapshot) -> Result<()> {
        self.snapshots.lock().insert(scope.clone(), snapshot.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load(&self, scope: &ScopeId) -> Result<Option<SessionSnapshot>> {
        Ok(self.snapshots.lock().get(scope).cloned())
    }

    fn clear_archive(&self, scope: &ScopeId) -> Result<()> {
        self.snapshots.lock().remove(scope);
        Ok(())
    }
}
