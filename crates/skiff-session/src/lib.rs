//! Skiff Session Persistence
//!
//! The tab manager hands full snapshots of its state to a [`PersistQueue`],
//! which coalesces them and writes the newest one to a [`SessionStore`].
//! Snapshots are keyed by [`ScopeId`], one per window or scene.

mod error;
mod persist;
mod snapshot;
mod store;

pub use error::SessionError;
pub use persist::PersistQueue;
pub use snapshot::{ScopeId, SessionSnapshot, SNAPSHOT_VERSION};
pub use store::{MemorySessionStore, SessionStore, SqliteSessionStore};

pub type Result<T> = std::result::Result<T, SessionError>;
