//! Tab data structure

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::error::TabError;
use crate::id::{RootId, TabHandle, TabId};
use crate::renderer::{LoadRequest, RendererConfig, RendererFactory, RendererSession};
use crate::saved::SavedTab;
use crate::state::TabState;
use crate::Result;

/// How long a normal tab may stay unused before it counts as archived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveAfter {
    #[default]
    Never,
    Week,
    Month,
}

impl ArchiveAfter {
    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            ArchiveAfter::Never => None,
            ArchiveAfter::Week => Some(Duration::days(7)),
            ArchiveAfter::Month => Some(Duration::days(30)),
        }
    }
}

pub struct Tab {
    id: TabId,
    generation: u64,
    is_incognito: bool,
    /// When the tab was created
    pub created_at: DateTime<Utc>,
    url: Option<Url>,
    initial_url: Option<Url>,
    pub title: String,
    pub favicon_url: Option<Url>,
    pub is_loading: bool,
    /// 0.0 ..= 1.0
    pub estimated_progress: f64,
    pub last_executed: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    pub pinned_at: Option<DateTime<Utc>>,
    pub consecutive_crashes: u32,
    /// Tab that opened this one. Only an id; resolve against the collection.
    pub parent: Option<TabId>,
    pub root_id: RootId,
    pub has_content_process: bool,
    pub needs_reload_on_select: bool,
    state: TabState,
    renderer: Option<Box<dyn RendererSession>>,
}

impl Tab {
    pub fn new(is_incognito: bool, generation: u64, now: DateTime<Utc>) -> Self {
        Self::with_id(TabId::new(), is_incognito, generation, now)
    }

    pub fn with_id(id: TabId, is_incognito: bool, generation: u64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            generation,
            is_incognito,
            created_at: now,
            url: None,
            initial_url: None,
            title: String::new(),
            favicon_url: None,
            is_loading: false,
            estimated_progress: 0.0,
            last_executed: Some(now),
            is_pinned: false,
            pinned_at: None,
            consecutive_crashes: 0,
            parent: None,
            root_id: RootId::new(),
            has_content_process: false,
            needs_reload_on_select: false,
            state: TabState::Zombie,
            renderer: None,
        }
    }

    /// Rebuild a zombie tab from its saved projection.
    ///
    /// The parent id is not copied; callers relink parents once every tab
    /// of the batch exists.
    pub fn from_saved(saved: &SavedTab, id: TabId, is_incognito: bool, generation: u64) -> Self {
        let mut tab = Self::with_id(id, is_incognito, generation, saved.created_at);
        tab.url = saved.url.clone();
        tab.initial_url = saved.url.clone();
        tab.title = saved.title.clone();
        tab.favicon_url = saved.favicon_url.clone();
        tab.root_id = saved.root_id;
        tab.last_executed = saved.last_executed;
        tab.is_pinned = saved.is_pinned;
        tab.pinned_at = saved.pinned_at;
        tab
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn handle(&self) -> TabHandle {
        TabHandle {
            id: self.id,
            generation: self.generation,
        }
    }

    pub fn is_incognito(&self) -> bool {
        self.is_incognito
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// First URL this tab ever had; used by the same-origin grouping rule
    pub fn initial_url(&self) -> Option<&Url> {
        self.initial_url.as_ref()
    }

    pub fn state(&self) -> TabState {
        self.state
    }

    pub fn is_zombie(&self) -> bool {
        self.state == TabState::Zombie
    }

    /// Update the current URL. Returns true if it changed.
    pub fn set_url(&mut self, url: Option<Url>) -> bool {
        if self.initial_url.is_none() {
            self.initial_url = url.clone();
        }

        if self.url == url {
            return false;
        }
        self.url = url;
        true
    }

    /// Attempt to transition to a new state
    pub fn transition_to(&mut self, new_state: TabState) -> Result<()> {
        if !self.state.can_transition_to(new_state) {
            return Err(TabError::InvalidTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }

        if self.state != new_state {
            tracing::debug!(
                tab_id = %self.id,
                from = %self.state,
                to = %new_state,
                "Tab state transition"
            );
        }

        self.state = new_state;
        Ok(())
    }

    /// Give a zombie tab a renderer and load its URL, or reload a live tab
    /// that was flagged for reload or whose content process died.
    ///
    /// Returns true if a renderer session was created.
    pub fn create_renderer_or_reload_if_needed(
        &mut self,
        factory: &dyn RendererFactory,
        config: &Arc<RendererConfig>,
        fallback: &Url,
    ) -> Result<bool> {
        if self.renderer.is_none() {
            self.attach_renderer(factory, config)?;
            let url = self.url.clone().unwrap_or_else(|| fallback.clone());
            self.load(&LoadRequest::new(url));
            self.needs_reload_on_select = false;
            return Ok(true);
        }

        if self.needs_reload_on_select || self.state == TabState::Crashed {
            self.reload()?;
        }
        Ok(false)
    }

    /// Create a renderer session without loading anything. Popups start this
    /// way; their opener drives the first load.
    pub fn attach_renderer(
        &mut self,
        factory: &dyn RendererFactory,
        config: &Arc<RendererConfig>,
    ) -> Result<()> {
        if self.renderer.is_some() {
            return Ok(());
        }
        self.renderer = Some(factory.create(self.id, config));
        self.transition_to(TabState::Live)
    }

    /// Load a request in the attached renderer, if any.
    pub fn load(&mut self, request: &LoadRequest) {
        self.set_url(Some(request.url.clone()));
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.load(request);
        }
    }

    pub fn reload(&mut self) -> Result<()> {
        self.needs_reload_on_select = false;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.reload();
            self.transition_to(TabState::Live)?;
        }
        Ok(())
    }

    /// Drop the renderer session, turning the tab into a zombie.
    pub fn close_renderer(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.close();
        }
        self.has_content_process = false;
        self.is_loading = false;
        self.state = TabState::Zombie;
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// The content process behind the renderer went away.
    pub fn mark_content_process_terminated(&mut self) -> Result<()> {
        self.has_content_process = false;
        self.is_loading = false;
        if self.renderer.is_some() {
            self.transition_to(TabState::Crashed)?;
        }
        Ok(())
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_executed = Some(now);
    }

    pub fn toggle_pinned(&mut self, now: DateTime<Utc>) {
        self.is_pinned = !self.is_pinned;
        self.pinned_at = if self.is_pinned { Some(now) } else { None };
    }

    /// Archived tabs are normal, unpinned tabs unused for longer than the window.
    pub fn is_archived(&self, now: DateTime<Utc>, archive_after: ArchiveAfter) -> bool {
        if self.is_incognito || self.is_pinned {
            return false;
        }
        match (archive_after.as_duration(), self.last_executed) {
            (Some(window), Some(last)) => now - last > window,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    pub fn was_executed_today(&self, now: DateTime<Utc>) -> bool {
        self.last_executed
            .map(|last| last.date_naive() == now.date_naive())
            .unwrap_or(false)
    }

    pub fn is_pinned_or_executed_today(&self, now: DateTime<Utc>) -> bool {
        self.is_pinned || self.was_executed_today(now)
    }

    pub fn to_saved(&self, is_selected: bool, tab_index: Option<usize>) -> SavedTab {
        SavedTab {
            id: self.id,
            url: self.url.clone(),
            title: self.title.clone(),
            favicon_url: self.favicon_url.clone(),
            parent_id: self.parent,
            root_id: self.root_id,
            is_selected,
            tab_index,
            is_incognito: self.is_incognito,
            created_at: self.created_at,
            last_executed: self.last_executed,
            is_pinned: self.is_pinned,
            pinned_at: self.pinned_at,
        }
    }
}

impl Drop for Tab {
    fn drop(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.close();
        }
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .field("is_incognito", &self.is_incognito)
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("title", &self.title)
            .field("state", &self.state)
            .field("parent", &self.parent)
            .field("root_id", &self.root_id)
            .field("last_executed", &self.last_executed)
            .field("is_pinned", &self.is_pinned)
            .finish_non_exhaustive()
    }
}
