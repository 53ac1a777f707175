//! Selection and partition switching

use skiff_tabs::{Tab, TabId};

use super::remove::RemoveOptions;
use super::TabManager;
use crate::events::{TabEvent, TabManagerEvent};
use crate::selection::most_recent;

impl TabManager {
    /// Select a tab, or clear the selection with `None`.
    ///
    /// Selecting a tab of the other partition switches partitions. Unknown
    /// ids are ignored.
    pub fn select_tab(&mut self, id: Option<TabId>, notify: bool) {
        self.assert_control_thread();

        if let Some(id) = id {
            if self.index_of(id).is_none() {
                tracing::debug!(tab_id = %id, "Ignoring selection of unknown tab");
                return;
            }
        }

        let previous = self.selected;
        if id.is_some() && id == previous {
            let now = self.now();
            if let Some(index) = id.and_then(|id| self.index_of(id)) {
                self.tabs[index].touch(now);
            }
            self.schedule_persist();
            return;
        }

        self.select_internal(id, previous, notify);
    }

    /// Apply a selection and finish the mutation. `previous` is what
    /// subscribers are told was selected before; it may already be gone
    /// from the collection.
    pub(super) fn select_internal(
        &mut self,
        target: Option<TabId>,
        previous: Option<TabId>,
        notify: bool,
    ) {
        let changed = self.apply_selection(target, previous, notify);
        self.finish_mutation(notify && changed, true);
    }

    /// Point the selection at `target`, touching and materializing it, and
    /// emit focus and selection events if it changed. Returns whether it
    /// changed. The caller finishes the mutation.
    pub(super) fn apply_selection(
        &mut self,
        target: Option<TabId>,
        previous: Option<TabId>,
        notify: bool,
    ) -> bool {
        let now = self.now();
        let target_index = target.and_then(|id| self.index_of(id));

        match target_index {
            Some(index) => {
                let incognito = self.tabs[index].is_incognito();
                if incognito != self.incognito {
                    self.switch_partition(incognito);
                }
                // Leaving incognito may have removed tabs before this one
                let Some(index) = target.and_then(|id| self.index_of(id)) else {
                    return false;
                };

                self.selected = target;
                self.tabs[index].touch(now);
                self.materialize(index, false);
            }
            None => self.selected = None,
        }

        self.recompute_views();
        if previous == self.selected {
            return false;
        }

        if let Some(previous) = previous.filter(|id| self.index_of(*id).is_some()) {
            self.events.emit_tab(previous, TabEvent::LostFocus);
        }
        if let Some(next) = self.selected {
            self.events.emit_tab(next, TabEvent::GainedFocus);
        }
        if notify {
            self.events.emit(TabManagerEvent::SelectionChanged {
                previous,
                next: self.selected,
            });
        }
        true
    }

    pub fn toggle_incognito(&mut self) {
        let to = !self.incognito;
        self.set_incognito(to);
    }

    /// Switch the active partition and select its most recently used tab,
    /// or nothing if it has none.
    pub fn set_incognito(&mut self, incognito: bool) {
        self.assert_control_thread();
        if self.incognito == incognito {
            return;
        }

        let previous = self.selected;
        self.switch_partition(incognito);

        let target = most_recent(
            self.tabs
                .iter()
                .filter(|tab| tab.is_incognito() == incognito),
        )
        .map(Tab::id);
        self.apply_selection(target, previous, true);
        self.finish_mutation(true, true);
    }

    /// Flip the active partition, destroying incognito tabs on the way out
    /// when the settings ask for it.
    fn switch_partition(&mut self, incognito: bool) {
        let leaving_incognito = self.incognito && !incognito;
        self.incognito = incognito;

        if leaving_incognito && self.settings.close_incognito_tabs {
            let ids: Vec<TabId> = self.incognito_tabs().map(Tab::id).collect();
            self.remove_tabs_internal(&ids, RemoveOptions::discard());
        }

        tracing::info!(incognito, "Switched partition");
    }

    /// User-initiated reload. Clears the crash counter so automatic crash
    /// reloads start over.
    pub fn reload_tab(&mut self, id: TabId) {
        self.assert_control_thread();
        let Some(index) = self.index_of(id) else {
            tracing::debug!(tab_id = %id, "Ignoring reload of unknown tab");
            return;
        };

        let tab = &mut self.tabs[index];
        tab.consecutive_crashes = 0;
        if tab.has_renderer() {
            if let Err(e) = tab.reload() {
                tracing::warn!(tab_id = %id, error = %e, "Failed to reload tab");
            }
        } else {
            self.materialize(index, false);
        }
    }

    /// Reload the selected tab now and every other live tab when it is next
    /// selected.
    pub fn flag_all_tabs_to_reload(&mut self) {
        self.assert_control_thread();
        let selected = self.selected;

        for tab in self.tabs.iter_mut() {
            if Some(tab.id()) == selected {
                if let Err(e) = tab.reload() {
                    tracing::warn!(tab_id = %tab.id(), error = %e, "Failed to reload tab");
                }
            } else if tab.has_renderer() {
                tab.needs_reload_on_select = true;
            }
        }
    }

    /// Drop the renderer of every tab except the selected one and the
    /// `keep_alive` most recently used. Returns how many were dropped.
    pub fn make_tabs_into_zombies(&mut self, keep_alive: usize) -> usize {
        self.assert_control_thread();

        let mut order: Vec<usize> = (0..self.tabs.len()).collect();
        order.sort_by(|&a, &b| {
            self.tabs[b]
                .last_executed
                .cmp(&self.tabs[a].last_executed)
        });

        let mut zombified = 0;
        for (rank, index) in order.into_iter().enumerate() {
            let tab = &mut self.tabs[index];
            if rank < keep_alive || Some(tab.id()) == self.selected || !tab.has_renderer() {
                continue;
            }
            tab.close_renderer();
            zombified += 1;
        }

        tracing::info!(zombified, keep_alive, "Turned tabs into zombies");
        zombified
    }

    /// Shed renderers under memory pressure, keeping `tabs_to_keep_alive`.
    pub fn on_memory_warning(&mut self) -> usize {
        let keep_alive = self.settings.tabs_to_keep_alive;
        self.make_tabs_into_zombies(keep_alive)
    }
}
