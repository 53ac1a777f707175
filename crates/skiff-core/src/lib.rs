//! Skiff Core
//!
//! The tab manager: sole owner of the ordered tab collection and the
//! selection. It derives groups and archived views, fans renderer
//! navigation callbacks out to observers, keeps the undo stack and
//! persists its state through a coalescing queue.

mod clock;
mod config;
mod control;
mod deferred;
mod error;
mod events;
mod manager;
mod partition;
mod recently_closed;
pub mod selection;
mod settings;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, DEFAULT_HOME_URL};
pub use control::{ControlMessage, ControlSender};
pub use error::CoreError;
pub use events::{EventBus, TabEvent, TabManagerEvent};
pub use manager::{AddTab, CreateOrSwitchResult, TabManager};
pub use recently_closed::RecentlyClosed;
pub use settings::TabSettings;

// Re-export the building blocks callers need alongside the manager
pub use skiff_navigation::{Navigation, NavigationDelegate, NavigationEvent, NavigationMultiplexer};
pub use skiff_session::{
    MemorySessionStore, PersistQueue, ScopeId, SessionSnapshot, SessionStore, SqliteSessionStore,
};
pub use skiff_storage::{Database, StorageError};
pub use skiff_tabs::{
    ArchiveAfter, LoadRequest, RendererConfig, RendererFactory, RendererSession, RootId,
    SavedTab, Tab, TabError, TabGroup, TabHandle, TabId, TabState,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
