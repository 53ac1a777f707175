//! Renderer boundary
//!
//! The page renderer is an external collaborator. Tabs own one session each;
//! sessions are created from the shared per-partition configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::id::TabId;

/// A request for the renderer to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub url: Url,
    /// Internal pages are loaded with elevated privileges
    pub privileged: bool,
}

impl LoadRequest {
    pub fn new(url: Url) -> Self {
        let privileged = crate::urls::is_internal(&url);
        Self { url, privileged }
    }
}

/// One live renderer session, exclusively owned by a tab.
pub trait RendererSession: Send {
    fn load(&mut self, request: &LoadRequest);

    fn reload(&mut self);

    /// Tear the session down. Called exactly once, before the session is dropped.
    fn close(&mut self);
}

/// Creates renderer sessions for tabs.
pub trait RendererFactory: Send + Sync {
    fn create(&self, tab_id: TabId, config: &Arc<RendererConfig>) -> Box<dyn RendererSession>;
}

/// Shared renderer configuration for one partition.
///
/// Each configuration stands for its own process pool and data store, so
/// a fresh configuration (new `id`) shares no state with the previous one.
#[derive(Debug)]
pub struct RendererConfig {
    id: Uuid,
    incognito: bool,
    popups_allowed: AtomicBool,
}

impl RendererConfig {
    pub fn new(incognito: bool, popups_allowed: bool) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            incognito,
            popups_allowed: AtomicBool::new(popups_allowed),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Non-persistent data store when true
    pub fn is_incognito(&self) -> bool {
        self.incognito
    }

    pub fn popups_allowed(&self) -> bool {
        self.popups_allowed.load(Ordering::Relaxed)
    }

    pub fn set_popups_allowed(&self, allowed: bool) {
        self.popups_allowed.store(allowed, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_requests_are_privileged() {
        let home = LoadRequest::new(Url::parse("internal://local/about/home").unwrap());
        assert!(home.privileged);

        let page = LoadRequest::new(Url::parse("https://example.com").unwrap());
        assert!(!page.privileged);
    }

    #[test]
    fn test_config_is_shared_and_mutable() {
        let config = RendererConfig::new(true, false);
        let shared = Arc::clone(&config);
        shared.set_popups_allowed(true);

        assert!(config.popups_allowed());
        assert!(config.is_incognito());
        assert_ne!(config.id(), RendererConfig::new(true, false).id());
    }
}
