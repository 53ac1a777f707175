//! Session snapshot format

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skiff_tabs::{SavedTab, TabId};
use std::fmt;

use crate::error::SessionError;
use crate::Result;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Identifies one window or scene whose tabs are persisted together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeId(String);

impl ScopeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ScopeId {
    fn default() -> Self {
        Self("default".to_string())
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Everything needed to rebuild a tab collection after process death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub scope: ScopeId,
    pub saved_at: DateTime<Utc>,
    /// Orders writes; a snapshot never replaces a newer one
    pub sequence: u64,
    #[serde(default)]
    pub selected: Option<TabId>,
    /// Full collection in order, both partitions
    #[serde(default)]
    pub tabs: Vec<SavedTab>,
    /// Undo batches, newest first
    #[serde(default)]
    pub recently_closed: Vec<Vec<SavedTab>>,
    /// Whether the incognito partition was active
    #[serde(default)]
    pub incognito: bool,
}

impl SessionSnapshot {
    pub fn new(scope: ScopeId, sequence: u64, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            scope,
            saved_at,
            sequence,
            selected: None,
            tabs: Vec::new(),
            recently_closed: Vec::new(),
            incognito: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty() && self.recently_closed.is_empty()
    }

    /// The recorded selection, by id or by the per-tab flag.
    pub fn selected_tab(&self) -> Option<&SavedTab> {
        self.selected
            .and_then(|id| self.tabs.iter().find(|tab| tab.id == id))
            .or_else(|| self.tabs.iter().find(|tab| tab.is_selected))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let snapshot: SessionSnapshot = serde_json::from_str(raw)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SessionError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skiff_tabs::RootId;

    fn saved(selected: bool) -> SavedTab {
        SavedTab {
            id: TabId::new(),
            url: None,
            title: String::new(),
            favicon_url: None,
            parent_id: None,
            root_id: RootId::new(),
            is_selected: selected,
            tab_index: None,
            is_incognito: false,
            created_at: Utc::now(),
            last_executed: None,
            is_pinned: false,
            pinned_at: None,
        }
    }

    #[test]
    fn test_selected_tab_prefers_recorded_id() {
        let mut snapshot = SessionSnapshot::new(ScopeId::default(), 1, Utc::now());
        snapshot.tabs = vec![saved(true), saved(false)];
        assert_eq!(snapshot.selected_tab().unwrap().id, snapshot.tabs[0].id);

        snapshot.selected = Some(snapshot.tabs[1].id);
        assert_eq!(snapshot.selected_tab().unwrap().id, snapshot.tabs[1].id);
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut snapshot = SessionSnapshot::new(ScopeId::from("main"), 1, Utc::now());
        snapshot.version = SNAPSHOT_VERSION + 1;
        let raw = serde_json::to_string(&snapshot).unwrap();

        assert!(matches!(
            SessionSnapshot::from_json(&raw),
            Err(SessionError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn test_corrupt_payload_is_an_error() {
        assert!(matches!(
            SessionSnapshot::from_json("{\"version\": 1, \"tabs\": ["),
            Err(SessionError::Json(_))
        ));
    }
}
