//! Adding tabs

use url::Url;

use skiff_tabs::{urls, RootId, Tab, TabId};

use super::TabManager;

/// Parameters for [`TabManager::add_tab`].
#[derive(Debug, Clone)]
pub struct AddTab {
    pub url: Option<Url>,
    pub parent: Option<TabId>,
    /// Used when it is within bounds; wins over every placement rule
    pub index: Option<usize>,
    pub incognito: bool,
    /// Metadata only; the renderer is created on first selection
    pub zombie: bool,
    /// Put the new tab in its parent's group
    pub keep_in_parent_group: bool,
    pub is_popup: bool,
    /// Select the new tab once it is in place. Zombie tabs stay in the
    /// background regardless.
    pub select: bool,
    pub notify: bool,
    pub persist: bool,
}

impl Default for AddTab {
    fn default() -> Self {
        Self {
            url: None,
            parent: None,
            index: None,
            incognito: false,
            zombie: false,
            keep_in_parent_group: false,
            is_popup: false,
            select: true,
            notify: true,
            persist: true,
        }
    }
}

impl AddTab {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_url(url: Url) -> Self {
        Self {
            url: Some(url),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: TabId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn incognito(mut self, incognito: bool) -> Self {
        self.incognito = incognito;
        self
    }

    pub fn zombie(mut self, zombie: bool) -> Self {
        self.zombie = zombie;
        self
    }

    pub fn keep_in_parent_group(mut self, keep: bool) -> Self {
        self.keep_in_parent_group = keep;
        self
    }

    /// Open without taking the selection
    pub fn background(mut self) -> Self {
        self.select = false;
        self
    }

    /// Neither notify subscribers nor persist
    pub fn quiet(mut self) -> Self {
        self.notify = false;
        self.persist = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOrSwitchResult {
    CreatedNewTab(TabId),
    SwitchedToExistingTab(TabId),
}

impl CreateOrSwitchResult {
    pub fn tab_id(&self) -> TabId {
        match self {
            CreateOrSwitchResult::CreatedNewTab(id)
            | CreateOrSwitchResult::SwitchedToExistingTab(id) => *id,
        }
    }
}

impl TabManager {
    /// Insert a tab and, unless it opens in the background, select it.
    pub fn add_tab(&mut self, request: AddTab) -> TabId {
        self.assert_control_thread();

        let id = self.insert_new_tab(&request);
        if request.select && !request.zombie {
            let previous = self.selected;
            self.apply_selection(Some(id), previous, request.notify);
        }
        self.finish_mutation(request.notify, request.persist);
        id
    }

    /// Add one tab per URL with a single notification and snapshot.
    ///
    /// With `root` set all new tabs form that group. With `select` set the
    /// last one is selected.
    pub fn add_tabs_for_urls(
        &mut self,
        urls: &[Url],
        zombie: bool,
        select: bool,
        incognito: bool,
        root: Option<RootId>,
    ) -> Vec<TabId> {
        self.assert_control_thread();
        if urls.is_empty() {
            return Vec::new();
        }

        let ids: Vec<TabId> = urls
            .iter()
            .map(|url| {
                let request = AddTab::for_url(url.clone())
                    .incognito(incognito)
                    .zombie(zombie)
                    .quiet();
                self.insert_new_tab(&request)
            })
            .collect();

        if let Some(root) = root {
            for tab in self.tabs.iter_mut().filter(|tab| ids.contains(&tab.id())) {
                tab.root_id = root;
            }
        }

        self.recompute_views();
        if select {
            if let Some(&last) = ids.last() {
                let previous = self.selected;
                self.apply_selection(Some(last), previous, true);
            }
        }

        tracing::info!(count = ids.len(), incognito, "Added tabs for URLs");
        self.finish_mutation(true, true);
        ids
    }

    /// Open a popup next to its opener. It is selected after a short delay
    /// unless it is closed first.
    pub fn add_popup_for_parent(&mut self, parent: TabId) -> Option<TabId> {
        self.assert_control_thread();
        let parent_index = self.index_of(parent)?;
        let incognito = self.tabs[parent_index].is_incognito();

        let request = AddTab {
            parent: Some(parent),
            incognito,
            keep_in_parent_group: true,
            is_popup: true,
            select: false,
            ..AddTab::default()
        };
        let id = self.add_tab(request);

        let due = self.now() + self.settings.popup_selection_delay();
        self.deferred.schedule(id, due);
        tracing::debug!(tab_id = %id, parent = %parent, "Opened popup");
        Some(id)
    }

    /// Copy a tab's URL into a new tab right after it and select the copy.
    pub fn duplicate_tab(&mut self, id: TabId, incognito: bool) -> Option<TabId> {
        self.assert_control_thread();
        let index = self.index_of(id)?;
        let url = self.tabs[index].url()?.clone();

        let request = AddTab::for_url(url)
            .with_parent(id)
            .at_index(index + 1)
            .incognito(incognito);
        Some(self.add_tab(request))
    }

    /// Find a tab of the active partition showing `url`. With a parent,
    /// only that parent's children match.
    pub fn tab_for_url(&self, url: &Url, parent: Option<TabId>) -> Option<TabId> {
        self.tabs
            .iter()
            .filter(|tab| tab.is_incognito() == self.incognito)
            .filter(|tab| parent.is_none() || tab.parent == parent)
            .find(|tab| {
                tab.url()
                    .map(|tab_url| {
                        urls::equivalent(url, tab_url)
                            || (urls::is_session_restore(tab_url)
                                && tab.initial_url().is_some_and(|u| urls::equivalent(url, u)))
                    })
                    .unwrap_or(false)
            })
            .map(Tab::id)
    }

    pub fn create_or_switch_to_tab(
        &mut self,
        url: Url,
        parent: Option<TabId>,
        keep_in_parent_group: bool,
    ) -> CreateOrSwitchResult {
        self.assert_control_thread();

        let lookup_parent = if keep_in_parent_group { parent } else { None };
        if let Some(existing) = self.tab_for_url(&url, lookup_parent) {
            self.select_tab(Some(existing), true);
            return CreateOrSwitchResult::SwitchedToExistingTab(existing);
        }

        let mut request = AddTab::for_url(url)
            .incognito(self.incognito)
            .keep_in_parent_group(keep_in_parent_group);
        request.parent = parent;
        CreateOrSwitchResult::CreatedNewTab(self.add_tab(request))
    }

    /// Create, place and (unless zombie) materialize a tab. No notification.
    pub(super) fn insert_new_tab(&mut self, request: &AddTab) -> TabId {
        let now = self.now();
        let generation = self.next_generation();
        let mut tab = Tab::new(request.incognito, generation, now);
        tab.set_url(request.url.clone());

        let parent_index = request.parent.and_then(|parent| self.index_of(parent));
        if let Some(parent_index) = parent_index {
            tab.parent = Some(self.tabs[parent_index].id());
        }

        let index = self.placement(&mut tab, request, parent_index);
        let id = tab.id();
        self.tabs.insert(index, tab);

        if !request.zombie {
            self.materialize(index, request.is_popup);
        }

        tracing::info!(
            tab_id = %id,
            incognito = request.incognito,
            index,
            zombie = request.zombie,
            "Tab created"
        );
        id
    }

    /// Where a new tab goes, adjusting its root when it joins a group.
    fn placement(&mut self, tab: &mut Tab, request: &AddTab, parent_index: Option<usize>) -> usize {
        if let Some(index) = request.index {
            if index <= self.tabs.len() {
                return index;
            }
        }

        if let Some(url) = tab.url().cloned() {
            let origin = self.tabs.iter().position(|candidate| {
                candidate.is_incognito() == tab.is_incognito()
                    && candidate
                        .initial_url()
                        .is_some_and(|initial| urls::equivalent(initial, &url))
            });
            if let Some(origin) = origin {
                self.fuse(tab, origin);
                return origin;
            }
        }

        if let Some(parent_index) = parent_index {
            let parent_id = self.tabs[parent_index].id();
            let mut index = parent_index + 1;
            while index < self.tabs.len() && self.is_descendant(index, parent_id) {
                index += 1;
            }
            if request.keep_in_parent_group {
                tab.root_id = self.tabs[parent_index].root_id;
            }
            return index;
        }

        self.tabs.len()
    }

    /// Group a new tab with the tab whose first page it reopens. An
    /// ungrouped tab joins the newcomer's root; a grouped one absorbs it.
    fn fuse(&mut self, tab: &mut Tab, origin: usize) {
        let origin_root = self.tabs[origin].root_id;
        let origin_grouped = self
            .tabs
            .iter()
            .enumerate()
            .any(|(i, other)| i != origin && other.root_id == origin_root);

        if origin_grouped {
            tab.root_id = origin_root;
        } else {
            self.tabs[origin].root_id = tab.root_id;
        }

        tracing::debug!(
            tab_id = %tab.id(),
            origin = %self.tabs[origin].id(),
            root = %tab.root_id,
            "Grouped tab with its origin"
        );
    }

    /// Whether the tab at `index` descends from `ancestor`.
    pub(super) fn is_descendant(&self, index: usize, ancestor: TabId) -> bool {
        let mut current = self.tabs[index].parent;
        // Bounded walk so a malformed parent cycle cannot spin
        for _ in 0..self.tabs.len() {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = self.tab(id).and_then(|tab| tab.parent),
                None => return false,
            }
        }
        false
    }

    pub fn tab_count_for_current_partition(&self) -> usize {
        if self.incognito {
            self.incognito_tabs().count()
        } else {
            self.active_tabs()
                .into_iter()
                .filter(|tab| !tab.is_incognito())
                .count()
        }
    }
}
