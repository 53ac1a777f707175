//! Closing tabs

use std::collections::HashSet;

use skiff_tabs::{urls, RootId, SavedTab, Tab, TabId};

use super::TabManager;
use crate::events::{TabEvent, TabManagerEvent};
use crate::selection::{self, Removal};

#[derive(Debug, Clone, Copy)]
pub(super) struct RemoveOptions {
    /// Remember the closed tabs on the undo stack
    record_undo: bool,
    show_toast: bool,
    /// Re-establish a selection in the active partition
    recover: bool,
    notify: bool,
    persist: bool,
}

impl RemoveOptions {
    pub(super) fn user(show_undo: bool) -> Self {
        Self {
            record_undo: true,
            show_toast: show_undo,
            recover: true,
            notify: true,
            persist: true,
        }
    }

    /// Silent removal that leaves no undo trace
    pub(super) fn discard() -> Self {
        Self {
            record_undo: false,
            show_toast: false,
            recover: false,
            notify: false,
            persist: false,
        }
    }
}

impl TabManager {
    pub fn remove_tab(&mut self, id: TabId, show_undo: bool) {
        self.remove_tabs(&[id], show_undo);
    }

    /// Close several tabs as one undo batch. Unknown ids are skipped.
    pub fn remove_tabs(&mut self, ids: &[TabId], show_undo: bool) {
        self.assert_control_thread();
        self.remove_tabs_internal(ids, RemoveOptions::user(show_undo));
    }

    /// Close every tab of both partitions.
    pub fn remove_all_tabs(&mut self) {
        self.assert_control_thread();
        let ids: Vec<TabId> = self.tabs.iter().map(Tab::id).collect();
        self.remove_tabs_internal(&ids, RemoveOptions::user(false));
    }

    pub fn remove_all_incognito_tabs(&mut self) {
        self.assert_control_thread();
        let ids: Vec<TabId> = self.incognito_tabs().map(Tab::id).collect();
        self.remove_tabs_internal(&ids, RemoveOptions::user(false));
    }

    /// Close tabs left on `about:blank`, typically by links that opened an
    /// external app.
    pub fn remove_blank_tabs(&mut self) {
        self.assert_control_thread();
        let ids: Vec<TabId> = self
            .tabs
            .iter()
            .filter(|tab| tab.url().is_some_and(urls::is_blank))
            .map(Tab::id)
            .collect();
        self.remove_tabs_internal(&ids, RemoveOptions::user(false));
    }

    /// Close every member of an active tab group.
    pub fn close_tab_group(&mut self, root: RootId, show_undo: bool) {
        self.assert_control_thread();
        let Some(group) = self.tab_group(root) else {
            tracing::debug!(root = %root, "Ignoring close of unknown tab group");
            return;
        };
        let ids = group.children.clone();
        self.remove_tabs_internal(&ids, RemoveOptions::user(show_undo));
    }

    pub(super) fn remove_tabs_internal(&mut self, ids: &[TabId], options: RemoveOptions) -> usize {
        let doomed: HashSet<TabId> = ids
            .iter()
            .copied()
            .filter(|id| self.index_of(*id).is_some())
            .collect();
        if doomed.is_empty() {
            return 0;
        }

        let now = self.now();
        let previous = self.selected;
        let viability = self.viability();
        let removal = self.removal_reference(&doomed, &viability);

        let saved: Vec<SavedTab> = self
            .tabs
            .iter()
            .enumerate()
            .filter(|(_, tab)| doomed.contains(&tab.id()) && !tab.is_incognito())
            .map(|(index, tab)| tab.to_saved(Some(tab.id()) == previous, Some(index)))
            .collect();

        let (removed, kept): (Vec<Tab>, Vec<Tab>) = std::mem::take(&mut self.tabs)
            .into_iter()
            .partition(|tab| doomed.contains(&tab.id()));
        self.tabs = kept;

        for tab in self.tabs.iter_mut() {
            if tab.parent.is_some_and(|parent| doomed.contains(&parent)) {
                tab.parent = None;
            }
        }

        if previous.is_some_and(|id| doomed.contains(&id)) {
            self.selected = None;
        }

        let mut closed = Vec::with_capacity(removed.len());
        for mut tab in removed {
            tab.close_renderer();
            self.deferred.cancel(tab.id());
            tracing::info!(tab_id = %tab.id(), incognito = tab.is_incognito(), "Tab closed");
            closed.push((tab.id(), tab.is_incognito()));
        }

        for incognito in [false, true] {
            let emptied = closed.iter().any(|&(_, i)| i == incognito)
                && !self.tabs.iter().any(|tab| tab.is_incognito() == incognito);
            if emptied {
                self.renderer_configs.reset(incognito);
            }
        }

        for &(id, _) in &closed {
            self.events.emit_tab(id, TabEvent::Closed);
        }

        if options.record_undo {
            self.recently_closed.push(saved.clone());
            if options.show_toast {
                let interval = self.settings.toast_batch_interval();
                self.toast.add(&saved, now, interval);
            }
        }

        if options.recover {
            if let Some(removal) = removal {
                self.recover_selection(previous, removal, options.notify);
            }
        }

        self.finish_mutation(options.notify, options.persist);
        closed.len()
    }

    /// The tab selection recovery starts from: the selected tab if it is
    /// going away, else the first doomed tab of the active partition.
    /// `None` when the active partition is untouched.
    fn removal_reference(
        &self,
        doomed: &HashSet<TabId>,
        viability: &selection::Viability,
    ) -> Option<Removal> {
        let reference = self
            .selected
            .filter(|id| doomed.contains(id))
            .or_else(|| {
                self.tabs
                    .iter()
                    .find(|tab| doomed.contains(&tab.id()) && tab.is_incognito() == self.incognito)
                    .map(Tab::id)
            })?;

        let index = self.index_of(reference)?;
        let preceding = self.tabs[..index]
            .iter()
            .filter(|tab| !doomed.contains(&tab.id()) && viability.allows(tab))
            .count();

        Some(Removal {
            parent: self.tabs[index].parent,
            index: preceding,
        })
    }

    fn recover_selection(&mut self, previous: Option<TabId>, removal: Removal, notify: bool) {
        let viability = self.viability();
        let next = selection::recover(&self.tabs, self.selected, removal, &viability);

        match next {
            Some(id) if Some(id) == self.selected => {}
            Some(id) => {
                tracing::debug!(tab_id = %id, "Recovered selection after removal");
                self.apply_selection(Some(id), previous, notify);
            }
            None => {
                self.selected = None;
                if notify && previous.is_some() {
                    self.events.emit(TabManagerEvent::SelectionChanged {
                        previous,
                        next: None,
                    });
                }
                self.events.emit(TabManagerEvent::SelectionEmpty);
            }
        }
    }
}
