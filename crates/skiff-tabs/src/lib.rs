//! Skiff Tab Model
//!
//! A tab is one browsing session: identity, navigation bookkeeping and
//! provenance (parent and group root). Tabs carry no policy of their own;
//! the tab manager in `skiff-core` owns and mutates them.

mod error;
mod group;
mod id;
mod renderer;
mod saved;
mod state;
mod tab;
pub mod urls;

pub use error::TabError;
pub use group::{choose_display_title, TabGroup, DEFAULT_GROUP_TITLE};
pub use id::{RootId, TabHandle, TabId};
pub use renderer::{LoadRequest, RendererConfig, RendererFactory, RendererSession};
pub use saved::SavedTab;
pub use state::TabState;
pub use tab::{ArchiveAfter, Tab};

pub type Result<T> = std::result::Result<T, TabError>;
