//! Renderer callbacks and the control inbox

use skiff_navigation::NavigationEvent;
use skiff_tabs::{urls, TabId};

use super::TabManager;
use crate::control::ControlMessage;
use crate::events::TabEvent;

impl TabManager {
    /// Apply a renderer navigation callback, then fan it out to the
    /// registered navigation delegates.
    pub fn handle_navigation_event(&mut self, event: &NavigationEvent) {
        self.assert_control_thread();
        let tab_id = event.tab_id();
        let Some(index) = self.index_of(tab_id) else {
            tracing::debug!(tab_id = %tab_id, event = event.name(), "Navigation event for unknown tab");
            return;
        };

        self.apply_navigation(index, event);
        self.navigation.dispatch(event);
    }

    /// Drain the control inbox. Returns how many messages were applied.
    pub fn process_messages(&mut self) -> usize {
        self.assert_control_thread();
        let mut applied = 0;

        while let Ok(message) = self.control_rx.try_recv() {
            let handle = message.tab();
            let Some(index) = self.resolve(handle) else {
                tracing::debug!(tab = %handle, "Dropping message for stale tab handle");
                continue;
            };

            match message {
                ControlMessage::FaviconLoaded { url, .. } => {
                    self.tabs[index].favicon_url = Some(url);
                    self.events.emit_tab(handle.id, TabEvent::FaviconLoaded);
                    self.schedule_persist();
                }
                ControlMessage::TitleChanged { title, .. } => {
                    self.tabs[index].title = title;
                    self.events.emit_tab(handle.id, TabEvent::TitleChanged);
                }
                ControlMessage::Progress { progress, .. } => {
                    self.tabs[index].estimated_progress = progress.clamp(0.0, 1.0);
                }
                ControlMessage::Navigation { event, .. } => {
                    if event.tab_id() != handle.id {
                        tracing::debug!(tab = %handle, "Dropping navigation event addressed to another tab");
                        continue;
                    }
                    self.apply_navigation(index, &event);
                    self.navigation.dispatch(&event);
                }
            }
            applied += 1;
        }

        applied
    }

    fn apply_navigation(&mut self, index: usize, event: &NavigationEvent) {
        let tab_id = self.tabs[index].id();
        tracing::trace!(tab_id = %tab_id, event = event.name(), "Navigation");

        match event {
            NavigationEvent::DidStartProvisionalNavigation(_) => {
                self.tabs[index].is_loading = true;
            }
            NavigationEvent::DidReceiveServerRedirect(navigation) => {
                if let Some(url) = &navigation.url {
                    self.tabs[index].set_url(Some(url.clone()));
                }
            }
            NavigationEvent::DidCommit(navigation) => {
                let tab = &mut self.tabs[index];
                tab.has_content_process = true;
                if let Some(url) = &navigation.url {
                    tab.set_url(Some(url.clone()));
                }
                self.events.emit_tab(tab_id, TabEvent::UrlChanged);
                self.recompute_views();
            }
            NavigationEvent::DidFinish(_) => {
                let tab = &mut self.tabs[index];
                tab.is_loading = false;
                tab.estimated_progress = 1.0;
                let restoring = tab.url().is_some_and(urls::is_session_restore);
                if !restoring {
                    self.schedule_persist();
                }
            }
            NavigationEvent::DidFail { .. } | NavigationEvent::DidFailProvisional { .. } => {
                self.tabs[index].is_loading = false;
            }
            NavigationEvent::ContentProcessDidTerminate { .. } => {
                self.handle_crash(tab_id);
            }
        }
    }

    /// A renderer's content process died. The selected tab is reloaded
    /// until it has crashed `max_crash_reloads` times in a row.
    fn handle_crash(&mut self, tab_id: TabId) {
        let Some(index) = self.index_of(tab_id) else {
            return;
        };
        let max_reloads = self.settings.max_crash_reloads;
        let selected = self.selected == Some(tab_id);

        let tab = &mut self.tabs[index];
        if let Err(e) = tab.mark_content_process_terminated() {
            tracing::warn!(tab_id = %tab_id, error = %e, "Failed to mark tab as crashed");
        }
        if !selected {
            tracing::info!(tab_id = %tab_id, "Background tab content process terminated");
            return;
        }

        if tab.consecutive_crashes < max_reloads {
            tab.consecutive_crashes += 1;
            tracing::info!(
                tab_id = %tab_id,
                attempt = tab.consecutive_crashes,
                "Reloading crashed tab"
            );
            if let Err(e) = tab.reload() {
                tracing::warn!(tab_id = %tab_id, error = %e, "Failed to reload crashed tab");
            }
        } else {
            tab.consecutive_crashes = 0;
            tracing::warn!(
                tab_id = %tab_id,
                max_reloads,
                "Tab keeps crashing, leaving it for the user to reload"
            );
        }
    }
}
