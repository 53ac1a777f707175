//! Shared fixtures for the tab manager integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use tokio::sync::broadcast;
use url::Url;

use skiff_core::{
    Config, LoadRequest, ManualClock, MemorySessionStore, RendererConfig, RendererFactory,
    RendererSession, SessionStore, TabId, TabManager, TabManagerEvent, TabSettings,
};

#[derive(Debug, Clone, PartialEq)]
pub enum RendererCall {
    Create { tab: TabId, incognito: bool, config: String },
    Load { tab: TabId, url: Url },
    Reload { tab: TabId },
    Close { tab: TabId },
}

/// Renderer factory that records every call its sessions receive.
#[derive(Default)]
pub struct Recorder {
    calls: Mutex<Vec<RendererCall>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<RendererCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn loads_for(&self, tab: TabId) -> Vec<Url> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RendererCall::Load { tab: t, url } if t == tab => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn reloads_for(&self, tab: TabId) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RendererCall::Reload { tab: t } if *t == tab))
            .count()
    }

    pub fn closes_for(&self, tab: TabId) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, RendererCall::Close { tab: t } if *t == tab))
            .count()
    }

    /// Configuration id each session was created with, in creation order
    pub fn configs(&self) -> Vec<(TabId, bool, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                RendererCall::Create {
                    tab,
                    incognito,
                    config,
                } => Some((tab, incognito, config)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RendererCall) {
        self.calls.lock().unwrap().push(call);
    }
}

struct RecordingSession {
    tab: TabId,
    recorder: Arc<Recorder>,
}

impl RendererSession for RecordingSession {
    fn load(&mut self, request: &LoadRequest) {
        self.recorder.record(RendererCall::Load {
            tab: self.tab,
            url: request.url.clone(),
        });
    }

    fn reload(&mut self) {
        self.recorder.record(RendererCall::Reload { tab: self.tab });
    }

    fn close(&mut self) {
        self.recorder.record(RendererCall::Close { tab: self.tab });
    }
}

pub struct RecordingFactory(pub Arc<Recorder>);

impl RendererFactory for RecordingFactory {
    fn create(&self, tab: TabId, config: &Arc<RendererConfig>) -> Box<dyn RendererSession> {
        self.0.record(RendererCall::Create {
            tab,
            incognito: config.is_incognito(),
            config: config.id().to_string(),
        });
        Box::new(RecordingSession {
            tab,
            recorder: Arc::clone(&self.0),
        })
    }
}

pub struct Harness {
    pub manager: TabManager,
    pub renderer: Arc<Recorder>,
    pub store: Arc<MemorySessionStore>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_settings(TabSettings::default())
    }

    pub fn with_settings(settings: TabSettings) -> Self {
        Self::with_store(settings, Arc::new(MemorySessionStore::new()))
    }

    /// A manager sharing `store`, e.g. to simulate a relaunch.
    pub fn with_store(settings: TabSettings, store: Arc<MemorySessionStore>) -> Self {
        let mut config = Config::new(PathBuf::from("/nonexistent/skiff-tests"));
        config.settings = settings;

        let renderer = Arc::new(Recorder::default());
        let clock = Arc::new(ManualClock::new(start_time()));
        let manager = TabManager::new(
            &config,
            Arc::new(RecordingFactory(Arc::clone(&renderer))),
            Arc::clone(&store) as Arc<dyn SessionStore>,
        )
        .with_clock(Arc::clone(&clock) as Arc<dyn skiff_core::Clock>);

        Self {
            manager,
            renderer,
            store,
            clock,
        }
    }

    pub fn advance_ms(&self, ms: i64) {
        self.clock.advance(chrono::Duration::milliseconds(ms));
    }
}

/// Midday, so advancing a few hours never crosses into another day
pub fn start_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 12, 0, 0).unwrap()
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

pub fn drain(rx: &mut broadcast::Receiver<TabManagerEvent>) -> Vec<TabManagerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Ids of the manager's tabs in collection order
pub fn order(manager: &TabManager) -> Vec<TabId> {
    manager.tabs().iter().map(|tab| tab.id()).collect()
}
