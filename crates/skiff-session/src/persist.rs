//! Coalescing persistence queue
//!
//! Holds at most one pending snapshot. Scheduling a newer snapshot replaces
//! an unwritten one, so a burst of mutations costs a single write. Writes
//! are serialised and a snapshot older than the last completed write is
//! dropped.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::error::SessionError;
use crate::snapshot::{ScopeId, SessionSnapshot};
use crate::store::SessionStore;
use crate::Result;

struct Inner {
    store: Arc<dyn SessionStore>,
    scope: ScopeId,
    pending: Mutex<Option<SessionSnapshot>>,
    /// Serialises writes; holds the sequence of the last completed one
    last_written: Mutex<Option<u64>>,
    notify: Notify,
    closed: AtomicBool,
}

impl Inner {
    fn write(&self, snapshot: SessionSnapshot) -> Result<bool> {
        let mut last_written = self.last_written.lock();
        if let Some(last) = *last_written {
            if snapshot.sequence <= last {
                tracing::debug!(
                    scope = %self.scope,
                    sequence = snapshot.sequence,
                    last,
                    "Skipping stale session snapshot"
                );
                return Ok(false);
            }
        }

        self.store.save(&self.scope, &snapshot)?;
        *last_written = Some(snapshot.sequence);
        Ok(true)
    }
}

#[derive(Clone)]
pub struct PersistQueue {
    inner: Arc<Inner>,
}

impl PersistQueue {
    pub fn new(store: Arc<dyn SessionStore>, scope: ScopeId) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                scope,
                pending: Mutex::new(None),
                last_written: Mutex::new(None),
                notify: Notify::new(),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn scope(&self) -> &ScopeId {
        &self.inner.scope
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// Queue a snapshot, superseding any snapshot not yet written.
    pub fn schedule(&self, snapshot: SessionSnapshot) {
        let sequence = snapshot.sequence;
        if let Some(previous) = self.inner.pending.lock().replace(snapshot) {
            tracing::debug!(
                scope = %self.inner.scope,
                superseded = previous.sequence,
                sequence,
                "Coalesced session snapshot"
            );
        }
        self.inner.notify.notify_one();
    }

    pub fn has_pending(&self) -> bool {
        self.inner.pending.lock().is_some()
    }

    /// Write the pending snapshot on the calling thread.
    ///
    /// Returns false when nothing was written.
    pub fn flush(&self) -> Result<bool> {
        let snapshot = self.inner.pending.lock().take();
        match snapshot {
            Some(snapshot) => self.inner.write(snapshot),
            None => Ok(false),
        }
    }

    /// Start the background writer on the given runtime.
    pub fn spawn(&self, runtime: &Handle) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            loop {
                inner.notify.notified().await;
                if inner.closed.load(Ordering::SeqCst) {
                    break;
                }

                let pending = inner.pending.lock().take();
                let Some(snapshot) = pending else {
                    continue;
                };

                let writer = Arc::clone(&inner);
                let result = tokio::task::spawn_blocking(move || writer.write(snapshot))
                    .await
                    .map_err(|e| SessionError::Worker(e.to_string()))
                    .and_then(|result| result);

                if let Err(e) = result {
                    tracing::warn!(
                        scope = %inner.scope,
                        error = %e,
                        "Failed to persist session snapshot"
                    );
                }
            }
            tracing::debug!(scope = %inner.scope, "Persistence worker stopped");
        })
    }

    /// Stop the background writer. A pending snapshot stays pending; call
    /// `flush` to write it.
    pub fn shutdown(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.notify.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;
    use chrono::Utc;
    use std::time::Duration;

    struct FailingStore;

    impl SessionStore for FailingStore {
        fn save(&self, _: &ScopeId, _: &SessionSnapshot) -> Result<()> {
            Err(SessionError::Worker("disk full".to_string()))
        }

        fn load(&self, _: &ScopeId) -> Result<Option<SessionSnapshot>> {
            Ok(None)
        }

        fn clear_archive(&self, _: &ScopeId) -> Result<()> {
            Ok(())
        }
    }

    fn snapshot(sequence: u64) -> SessionSnapshot {
        SessionSnapshot::new(ScopeId::default(), sequence, Utc::now())
    }

    #[test]
    fn test_pending_snapshots_coalesce() {
        let store = Arc::new(MemorySessionStore::new());
        let queue = PersistQueue::new(store.clone(), ScopeId::default());

        queue.schedule(snapshot(1));
        queue.schedule(snapshot(2));
        queue.schedule(snapshot(3));
        assert!(queue.flush().unwrap());
        assert!(!queue.flush().unwrap());

        assert_eq!(store.save_count(), 1);
        let stored = store.load(&ScopeId::default()).unwrap().unwrap();
        assert_eq!(stored.sequence, 3);
    }

    #[test]
    fn test_stale_write_is_skipped() {
        let store = Arc::new(MemorySessionStore::new());
        let queue = PersistQueue::new(store.clone(), ScopeId::default());

        queue.schedule(snapshot(5));
        queue.flush().unwrap();
        queue.schedule(snapshot(4));
        assert!(!queue.flush().unwrap());

        assert_eq!(store.load(&ScopeId::default()).unwrap().unwrap().sequence, 5);
    }

    #[test]
    fn test_flush_surfaces_store_errors() {
        let queue = PersistQueue::new(Arc::new(FailingStore), ScopeId::default());
        queue.schedule(snapshot(1));

        assert!(queue.flush().is_err());
        assert!(!queue.has_pending());
    }

    #[tokio::test]
    async fn test_worker_writes_in_background() {
        let store = Arc::new(MemorySessionStore::new());
        let queue = PersistQueue::new(store.clone(), ScopeId::default());
        let worker = queue.spawn(&Handle::current());

        queue.schedule(snapshot(1));
        for _ in 0..100 {
            if store.save_count() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.save_count(), 1);

        queue.shutdown();
        worker.await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_survives_failures() {
        let queue = PersistQueue::new(Arc::new(FailingStore), ScopeId::default());
        let worker = queue.spawn(&Handle::current());

        queue.schedule(snapshot(1));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!worker.is_finished());

        queue.shutdown();
        worker.await.unwrap();
    }
}
