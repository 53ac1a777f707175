//! Derived views: active and archived tabs, tab groups

use std::collections::{HashMap, HashSet};

use skiff_tabs::{choose_display_title, RootId, Tab, TabGroup, TabId};

use super::TabManager;
use crate::events::TabManagerEvent;

#[derive(Debug, Default)]
pub(super) struct Views {
    active: Vec<TabId>,
    archived: Vec<TabId>,
    active_groups: Vec<TabGroup>,
    archived_groups: Vec<TabGroup>,
}

impl TabManager {
    /// Tabs shown in the switcher: every incognito tab plus the normal tabs
    /// that are not archived, in collection order.
    pub fn active_tabs(&self) -> Vec<&Tab> {
        self.views
            .active
            .iter()
            .filter_map(|id| self.tab(*id))
            .collect()
    }

    pub fn archived_tabs(&self) -> Vec<&Tab> {
        self.views
            .archived
            .iter()
            .filter_map(|id| self.tab(*id))
            .collect()
    }

    pub fn active_groups(&self) -> &[TabGroup] {
        &self.views.active_groups
    }

    pub fn archived_groups(&self) -> &[TabGroup] {
        &self.views.archived_groups
    }

    /// Rebuild every derived view, announcing a changed archive.
    pub(super) fn recompute_views(&mut self) {
        if self.refresh_views() {
            self.events.emit(TabManagerEvent::ArchivedTabsUpdated);
        }
    }

    /// Rebuild every derived view. Returns whether the archived list changed.
    pub(super) fn refresh_views(&mut self) -> bool {
        let now = self.now();
        let archive_after = self.settings.archive_after;

        let mut active = Vec::new();
        let mut archived = Vec::new();
        for tab in &self.tabs {
            if tab.is_archived(now, archive_after) {
                archived.push(tab.id());
            } else {
                active.push(tab.id());
            }
        }

        // Members per root across all normal tabs, in collection order
        let mut roots: Vec<RootId> = Vec::new();
        let mut members: HashMap<RootId, Vec<usize>> = HashMap::new();
        for (index, tab) in self.tabs.iter().enumerate() {
            if tab.is_incognito() {
                continue;
            }
            let entry = members.entry(tab.root_id).or_default();
            if entry.is_empty() {
                roots.push(tab.root_id);
            }
            entry.push(index);
        }

        // Titles survive only for member sets that still exist
        let mut previous_titles = std::mem::take(&mut self.group_titles);
        let mut titles = HashMap::new();
        for root in &roots {
            let indices = &members[root];
            if indices.len() < 2 {
                continue;
            }
            let mut key: Vec<TabId> = indices.iter().map(|&i| self.tabs[i].id()).collect();
            key.sort();

            let title = previous_titles.remove(&key).unwrap_or_else(|| {
                let tabs: Vec<&Tab> = indices.iter().map(|&i| &self.tabs[i]).collect();
                choose_display_title(&tabs)
            });
            titles.insert(*root, title.clone());
            self.group_titles.insert(key, title);
        }

        let archived_set: HashSet<TabId> = archived.iter().copied().collect();
        let mut active_groups = Vec::new();
        let mut archived_groups = Vec::new();
        for root in &roots {
            let Some(title) = titles.get(root) else {
                continue;
            };
            let (archived_members, active_members): (Vec<TabId>, Vec<TabId>) = members[root]
                .iter()
                .map(|&i| self.tabs[i].id())
                .partition(|id| archived_set.contains(id));

            if active_members.len() >= 2 {
                active_groups.push(TabGroup {
                    id: *root,
                    children: active_members,
                    display_title: title.clone(),
                });
            }
            if !archived_members.is_empty() {
                archived_groups.push(TabGroup {
                    id: *root,
                    children: archived_members,
                    display_title: title.clone(),
                });
            }
        }

        let archive_changed = self.views.archived != archived;
        self.views = Views {
            active,
            archived,
            active_groups,
            archived_groups,
        };
        archive_changed
    }
}
