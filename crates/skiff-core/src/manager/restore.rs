//! Session snapshots and undo

use std::collections::{HashMap, HashSet};

use skiff_session::SessionSnapshot;
use skiff_tabs::{SavedTab, Tab, TabId};

use super::TabManager;
use crate::selection::most_recent;
use crate::Result;

impl TabManager {
    /// Queue a snapshot of the current state for the background writer.
    pub(super) fn schedule_persist(&mut self) {
        let snapshot = self.build_snapshot();
        self.persist.schedule(snapshot);
    }

    fn build_snapshot(&mut self) -> SessionSnapshot {
        self.persist_sequence += 1;
        let mut snapshot =
            SessionSnapshot::new(self.scope.clone(), self.persist_sequence, self.now());

        snapshot.selected = self.selected;
        snapshot.incognito = self.incognito;
        snapshot.tabs = self
            .tabs
            .iter()
            .enumerate()
            .map(|(index, tab)| tab.to_saved(Some(tab.id()) == self.selected, Some(index)))
            .collect();
        snapshot.recently_closed = self.recently_closed.to_vec();
        snapshot
    }

    /// Rebuild the collection from the stored snapshot of this scope.
    ///
    /// Unless `forced`, nothing happens when tabs already exist. Restored
    /// tabs are appended as zombies and the snapshot's undo stack replaces
    /// the live one. The recorded selection is selected again; when it did
    /// not survive, the most recently used restored tab is, preferring the
    /// recorded partition. Returns true if a snapshot was applied.
    pub fn restore_tabs(&mut self, forced: bool) -> bool {
        self.assert_control_thread();
        if !forced && !self.tabs.is_empty() {
            return false;
        }

        let snapshot = match self.persist.store().load(&self.scope) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                tracing::debug!(scope = %self.scope, "No session snapshot to restore");
                return false;
            }
            Err(e) => {
                tracing::warn!(scope = %self.scope, error = %e, "Failed to load session snapshot");
                return false;
            }
        };
        self.persist_sequence = self.persist_sequence.max(snapshot.sequence);

        let close_incognito = self.settings.close_incognito_tabs;
        let saved: Vec<&SavedTab> = snapshot
            .tabs
            .iter()
            .filter(|tab| !(close_incognito && tab.is_incognito))
            .collect();

        let mut ids: HashMap<TabId, TabId> = HashMap::with_capacity(saved.len());
        let mut restored = Vec::with_capacity(saved.len());
        for saved_tab in &saved {
            let tab = self.recreate(saved_tab, saved_tab.is_incognito);
            ids.insert(saved_tab.id, tab.id());
            restored.push(tab.id());
            self.tabs.push(tab);
        }
        self.relink_parents(saved.iter().copied(), &ids);
        self.recently_closed.replace(snapshot.recently_closed.clone());

        let partition = snapshot.incognito;
        let restored_tabs: Vec<&Tab> = self
            .tabs
            .iter()
            .filter(|tab| restored.contains(&tab.id()))
            .collect();
        let target = snapshot
            .selected
            .and_then(|id| ids.get(&id).copied())
            .or_else(|| {
                most_recent(
                    restored_tabs
                        .iter()
                        .copied()
                        .filter(|tab| tab.is_incognito() == partition),
                )
                .map(Tab::id)
            })
            .or_else(|| most_recent(restored_tabs.iter().copied()).map(Tab::id));

        let previous = self.selected;
        self.apply_selection(target, previous, true);
        self.finish_mutation(true, true);

        tracing::info!(
            scope = %self.scope,
            tabs = restored.len(),
            sequence = snapshot.sequence,
            "Restored session"
        );
        true
    }

    /// Bring back closed tabs as zombies.
    ///
    /// Each tab returns to its saved index when that is still in bounds,
    /// else next to its parent, else at the end. The saved selected tab (or
    /// the last one restored) is selected when `select` is set and either
    /// nothing is selected or `override_selected` is set.
    pub fn restore_saved_tabs(
        &mut self,
        saved: &[SavedTab],
        incognito: bool,
        select: bool,
        override_selected: bool,
    ) -> Option<TabId> {
        self.assert_control_thread();
        if saved.is_empty() {
            return None;
        }

        let mut ids: HashMap<TabId, TabId> = HashMap::with_capacity(saved.len());
        let mut last = None;
        for saved_tab in saved {
            let tab = self.recreate(saved_tab, incognito);
            let index = self.restore_index(saved_tab, &ids);
            ids.insert(saved_tab.id, tab.id());
            last = Some(tab.id());
            tracing::debug!(tab_id = %tab.id(), index, "Restored closed tab");
            self.tabs.insert(index, tab);
        }
        self.relink_parents(saved.iter(), &ids);

        let originals: HashSet<TabId> = saved.iter().map(|tab| tab.id).collect();
        self.recently_closed.remove(&originals);
        self.toast.remove(&originals);

        let target = saved
            .iter()
            .find(|tab| tab.is_selected)
            .and_then(|tab| ids.get(&tab.id).copied())
            .or(last);

        if select && (self.selected.is_none() || override_selected) {
            let previous = self.selected;
            self.apply_selection(target, previous, true);
        }

        tracing::info!(count = saved.len(), incognito, "Restored closed tabs");
        self.finish_mutation(true, true);
        target
    }

    /// Restore every batch on the undo stack, newest first.
    pub fn restore_all_closed_tabs(&mut self) -> Option<TabId> {
        let all: Vec<SavedTab> = self.recently_closed.batches().flatten().cloned().collect();
        self.restore_saved_tabs(&all, false, true, false)
    }

    /// Delete the stored snapshot for this scope.
    pub fn clear_archive(&self) -> Result<()> {
        self.persist.store().clear_archive(&self.scope)?;
        tracing::info!(scope = %self.scope, "Cleared session archive");
        Ok(())
    }

    /// Zombie tab for a saved projection, keeping its id unless that id is
    /// taken by a live tab.
    fn recreate(&mut self, saved: &SavedTab, incognito: bool) -> Tab {
        let id = if self.index_of(saved.id).is_some() {
            TabId::new()
        } else {
            saved.id
        };
        let generation = self.next_generation();
        Tab::from_saved(saved, id, incognito, generation)
    }

    fn restore_index(&self, saved: &SavedTab, restored: &HashMap<TabId, TabId>) -> usize {
        if let Some(index) = saved.tab_index.filter(|&index| index <= self.tabs.len()) {
            return index;
        }

        let parent = saved
            .parent_id
            .map(|parent| restored.get(&parent).copied().unwrap_or(parent))
            .and_then(|parent| self.index_of(parent));
        match parent {
            Some(index) => index + 1,
            None => self.tabs.len(),
        }
    }

    /// Point restored tabs at their restored parents. Parents outside the
    /// batch are not linked.
    fn relink_parents<'a>(
        &mut self,
        saved: impl Iterator<Item = &'a SavedTab>,
        ids: &HashMap<TabId, TabId>,
    ) {
        for saved_tab in saved {
            let Some(parent) = saved_tab.parent_id.and_then(|p| ids.get(&p).copied()) else {
                continue;
            };
            let Some(&child) = ids.get(&saved_tab.id) else {
                continue;
            };
            if let Some(index) = self.index_of(child) {
                self.tabs[index].parent = Some(parent);
            }
        }
    }
}
