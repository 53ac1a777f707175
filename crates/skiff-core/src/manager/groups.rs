//! Ordering, pinning and group membership

use skiff_tabs::{RootId, Tab, TabGroup, TabId};

use super::TabManager;
use crate::selection::most_recent;

impl TabManager {
    /// Move the tab at `from` to `to`.
    ///
    /// The moved tab joins the active group found at the destination, or
    /// leaves its group otherwise.
    pub fn rearrange(&mut self, from: usize, to: usize) {
        self.assert_control_thread();
        if from == to || from >= self.tabs.len() || to >= self.tabs.len() {
            return;
        }

        // Groups only exist among normal tabs
        let destination_root = self.tabs[to].root_id;
        let joins_group = !self.tabs[from].is_incognito()
            && self
                .active_groups()
                .iter()
                .any(|group| group.id == destination_root);

        let mut tab = self.tabs.remove(from);
        tab.root_id = if joins_group {
            destination_root
        } else {
            RootId::new()
        };
        tracing::debug!(tab_id = %tab.id(), from, to, joins_group, "Moved tab");
        self.tabs.insert(to, tab);

        self.finish_mutation(true, true);
    }

    /// Pin or unpin a tab. Returns the new pinned state.
    pub fn toggle_pinned(&mut self, id: TabId) -> Option<bool> {
        self.assert_control_thread();
        let index = self.index_of(id)?;
        let now = self.now();

        let tab = &mut self.tabs[index];
        tab.toggle_pinned(now);
        let pinned = tab.is_pinned;

        self.finish_mutation(true, true);
        Some(pinned)
    }

    /// Take a tab out of its group by giving it a root of its own.
    pub fn remove_tab_from_group(&mut self, id: TabId) {
        self.assert_control_thread();
        let Some(index) = self.index_of(id) else {
            tracing::debug!(tab_id = %id, "Ignoring ungroup of unknown tab");
            return;
        };

        self.tabs[index].root_id = RootId::new();
        self.finish_mutation(true, true);
    }

    /// The most recently used member of an active group.
    pub fn most_recent_child(&self, root: RootId) -> Option<&Tab> {
        let group = self.tab_group(root)?;
        most_recent(self.tabs.iter().filter(|tab| group.contains(tab.id())))
    }

    pub fn tab_group(&self, root: RootId) -> Option<&TabGroup> {
        self.active_groups().iter().find(|group| group.id == root)
    }

    /// The active group a tab belongs to, if any.
    pub fn tab_group_for(&self, id: TabId) -> Option<&TabGroup> {
        self.active_groups()
            .iter()
            .find(|group| group.contains(id))
    }
}
