//! Tab Manager
//!
//! Owns the ordered tab collection (both partitions interleaved) and the
//! selection. All mutation goes through `&mut self` on the control context;
//! everything else talks to the manager through [`ControlSender`].
//!
//! Each mutating call follows the same order: mutate, recompute views,
//! notify subscribers, schedule persistence.

mod add;
mod groups;
mod navigation;
mod remove;
mod restore;
mod select;
mod views;

pub use add::{AddTab, CreateOrSwitchResult};

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use url::Url;

use skiff_navigation::NavigationMultiplexer;
use skiff_session::{PersistQueue, ScopeId, SessionStore, SqliteSessionStore};
use skiff_storage::Database;
use skiff_tabs::{RendererFactory, SavedTab, Tab, TabHandle, TabId};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::control::{self, ControlMessage, ControlSender};
use crate::deferred::DeferredSelections;
use crate::events::{EventBus, TabManagerEvent};
use crate::partition::RendererConfigs;
use crate::recently_closed::{RecentlyClosed, ToastBatcher};
use crate::selection::Viability;
use crate::settings::TabSettings;
use crate::Result;

use views::Views;

pub struct TabManager {
    tabs: Vec<Tab>,
    selected: Option<TabId>,
    /// Active partition
    incognito: bool,
    next_generation: u64,
    settings: TabSettings,
    home_url: Url,
    scope: ScopeId,
    clock: Arc<dyn Clock>,
    renderer_factory: Arc<dyn RendererFactory>,
    renderer_configs: RendererConfigs,
    navigation: Arc<NavigationMultiplexer>,
    events: EventBus,
    control_tx: ControlSender,
    control_rx: mpsc::UnboundedReceiver<ControlMessage>,
    persist: PersistQueue,
    persist_sequence: u64,
    recently_closed: RecentlyClosed,
    toast: ToastBatcher,
    deferred: DeferredSelections,
    views: Views,
    /// Group titles keyed by sorted member ids
    group_titles: HashMap<Vec<TabId>, String>,
    control_thread: ThreadId,
}

impl TabManager {
    pub fn new(
        config: &Config,
        renderer_factory: Arc<dyn RendererFactory>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let settings = config.settings.clone();
        let (control_tx, control_rx) = control::channel();

        Self {
            tabs: Vec::new(),
            selected: None,
            incognito: false,
            next_generation: 0,
            home_url: config.home_url.clone(),
            scope: config.scope.clone(),
            clock: Arc::new(SystemClock),
            renderer_factory,
            renderer_configs: RendererConfigs::new(!settings.block_popups),
            navigation: Arc::new(NavigationMultiplexer::new()),
            events: EventBus::new(),
            control_tx,
            control_rx,
            persist: PersistQueue::new(store, config.scope.clone()),
            persist_sequence: 0,
            recently_closed: RecentlyClosed::new(settings.max_recently_closed_batches),
            toast: ToastBatcher::default(),
            deferred: DeferredSelections::default(),
            views: Views::default(),
            group_titles: HashMap::new(),
            control_thread: thread::current().id(),
            settings,
        }
    }

    /// Open the database at `config.database_path` and persist sessions there.
    ///
    /// Stored tab settings take precedence over `config.settings`.
    pub fn open(config: &Config, renderer_factory: Arc<dyn RendererFactory>) -> Result<Self> {
        let db = Database::open(&config.database_path)?;

        let mut config = config.clone();
        if let Some(settings) = TabSettings::load(&db) {
            config.settings = settings;
        }

        tracing::info!(
            path = %config.database_path.display(),
            scope = %config.scope,
            "Opened tab manager database"
        );

        let store = Arc::new(SqliteSessionStore::new(db));
        Ok(Self::new(&config, renderer_factory, store))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start writing snapshots in the background on the given runtime.
    pub fn spawn_persistence(&self, runtime: &Handle) -> JoinHandle<()> {
        self.persist.spawn(runtime)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TabManagerEvent> {
        self.events.subscribe()
    }

    pub fn control_sender(&self) -> ControlSender {
        self.control_tx.clone()
    }

    /// Observers of renderer navigation callbacks register here.
    pub fn navigation(&self) -> &Arc<NavigationMultiplexer> {
        &self.navigation
    }

    pub fn settings(&self) -> &TabSettings {
        &self.settings
    }

    pub fn scope(&self) -> &ScopeId {
        &self.scope
    }

    pub fn home_url(&self) -> &Url {
        &self.home_url
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn tab(&self, id: TabId) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.id() == id)
    }

    pub fn handle(&self, id: TabId) -> Option<TabHandle> {
        self.tab(id).map(Tab::handle)
    }

    pub fn selected_tab_id(&self) -> Option<TabId> {
        self.selected
    }

    pub fn selected_tab(&self) -> Option<&Tab> {
        self.selected.and_then(|id| self.tab(id))
    }

    pub fn is_incognito(&self) -> bool {
        self.incognito
    }

    pub fn normal_tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter().filter(|tab| !tab.is_incognito())
    }

    pub fn incognito_tabs(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter().filter(|tab| tab.is_incognito())
    }

    pub fn recently_closed(&self) -> &RecentlyClosed {
        &self.recently_closed
    }

    pub fn recently_closed_tab_for_url(&self, url: &Url) -> Option<&SavedTab> {
        self.recently_closed.find_by_url(url)
    }

    /// Push new preferences into the manager and every live renderer
    /// configuration.
    pub fn on_settings_changed(&mut self, settings: TabSettings) {
        self.assert_control_thread();

        self.renderer_configs
            .set_popups_allowed(!settings.block_popups);
        self.recently_closed
            .set_capacity(settings.max_recently_closed_batches);
        self.settings = settings;

        self.refresh_views();
        self.events.emit(TabManagerEvent::ArchivedTabsUpdated);
        tracing::debug!(
            archive_after = ?self.settings.archive_after,
            block_popups = self.settings.block_popups,
            "Applied tab settings"
        );
    }

    /// Run deferred work that has come due: popup selections and the
    /// closed-tabs toast.
    pub fn tick(&mut self) {
        self.assert_control_thread();
        let now = self.now();

        for id in self.deferred.take_due(now) {
            if self.index_of(id).is_some() {
                tracing::debug!(tab_id = %id, "Selecting popup");
                self.select_tab(Some(id), true);
            }
        }

        if let Some(batch) = self.toast.take_due(now) {
            if !batch.is_empty() {
                self.events.emit(TabManagerEvent::ClosedTabsToast(batch));
            }
        }
    }

    /// Write any pending snapshot now. Returns true if something was written.
    pub fn flush_persistence(&self) -> bool {
        match self.persist.flush() {
            Ok(written) => written,
            Err(e) => {
                tracing::warn!(scope = %self.scope, error = %e, "Failed to flush session snapshot");
                false
            }
        }
    }

    fn assert_control_thread(&self) {
        debug_assert_eq!(
            thread::current().id(),
            self.control_thread,
            "TabManager mutated off its control thread"
        );
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn index_of(&self, id: TabId) -> Option<usize> {
        self.tabs.iter().position(|tab| tab.id() == id)
    }

    /// Index of the exact tab incarnation behind a handle
    fn resolve(&self, handle: TabHandle) -> Option<usize> {
        self.index_of(handle.id)
            .filter(|&index| self.tabs[index].generation() == handle.generation)
    }

    fn viability(&self) -> Viability {
        Viability {
            incognito: self.incognito,
            now: self.now(),
            time_based_switcher: self.settings.time_based_switcher,
        }
    }

    /// Give the tab at `index` a renderer, or reload it if it needs one.
    fn materialize(&mut self, index: usize, popup: bool) {
        let config = Arc::clone(self.renderer_configs.get(self.tabs[index].is_incognito()));
        let factory = Arc::clone(&self.renderer_factory);
        let home = self.home_url.clone();
        let tab = &mut self.tabs[index];

        let result = if popup {
            tab.attach_renderer(factory.as_ref(), &config)
        } else {
            tab.create_renderer_or_reload_if_needed(factory.as_ref(), &config, &home)
                .map(|_| ())
        };

        if let Err(e) = result {
            tracing::warn!(tab_id = %tab.id(), error = %e, "Failed to prepare renderer");
        }
    }

    /// Tell observers the collection changed and queue a snapshot.
    fn finish_mutation(&mut self, notify: bool, persist: bool) {
        self.recompute_views();
        if notify {
            self.events.emit(TabManagerEvent::CollectionChanged);
        }
        if persist {
            self.schedule_persist();
        }
    }
}
