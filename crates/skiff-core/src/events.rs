//! Tab manager notifications

use tokio::sync::broadcast;

use skiff_tabs::{SavedTab, TabId};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum TabEvent {
    GainedFocus,
    LostFocus,
    Closed,
    UrlChanged,
    FaviconLoaded,
    TitleChanged,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TabManagerEvent {
    /// Tabs were added, removed, moved or regrouped
    CollectionChanged,
    SelectionChanged {
        previous: Option<TabId>,
        next: Option<TabId>,
    },
    /// Recovery after a removal found nothing to select
    SelectionEmpty,
    Tab {
        tab_id: TabId,
        event: TabEvent,
    },
    ArchivedTabsUpdated,
    /// Closed tabs to offer for undo, batched over a short window
    ClosedTabsToast(Vec<SavedTab>),
}

/// Broadcast channel for [`TabManagerEvent`]s.
///
/// Emitting with no subscribers is not an error.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TabManagerEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TabManagerEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: TabManagerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn emit_tab(&self, tab_id: TabId, event: TabEvent) {
        self.emit(TabManagerEvent::Tab { tab_id, event });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
