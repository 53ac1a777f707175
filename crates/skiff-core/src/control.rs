//! Control-context inbox
//!
//! The tab manager is single-writer. Work finishing elsewhere (renderer
//! callbacks, favicon fetches) posts a message here and the control context
//! applies it on its next `process_messages` pass. Every message names its
//! tab by handle, so results for a closed or recreated tab are dropped.

use tokio::sync::mpsc;
use url::Url;

use skiff_navigation::NavigationEvent;
use skiff_tabs::TabHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    FaviconLoaded { tab: TabHandle, url: Url },
    TitleChanged { tab: TabHandle, title: String },
    Progress { tab: TabHandle, progress: f64 },
    Navigation { tab: TabHandle, event: NavigationEvent },
}

impl ControlMessage {
    pub fn tab(&self) -> TabHandle {
        match self {
            ControlMessage::FaviconLoaded { tab, .. }
            | ControlMessage::TitleChanged { tab, .. }
            | ControlMessage::Progress { tab, .. }
            | ControlMessage::Navigation { tab, .. } => *tab,
        }
    }
}

/// Cloneable sender handed to background producers.
#[derive(Debug, Clone)]
pub struct ControlSender {
    tx: mpsc::UnboundedSender<ControlMessage>,
}

impl ControlSender {
    /// Returns false once the tab manager is gone.
    pub fn send(&self, message: ControlMessage) -> bool {
        self.tx.send(message).is_ok()
    }
}

pub(crate) fn channel() -> (ControlSender, mpsc::UnboundedReceiver<ControlMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ControlSender { tx }, rx)
}
