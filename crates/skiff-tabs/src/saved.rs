//! Serializable projection of a tab

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::id::{RootId, TabId};

/// What survives of a tab once it is closed or written to disk.
///
/// Used both for the recently-closed undo stack and for session snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTab {
    pub id: TabId,
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub favicon_url: Option<Url>,
    #[serde(default)]
    pub parent_id: Option<TabId>,
    pub root_id: RootId,
    #[serde(default)]
    pub is_selected: bool,
    /// Position in the full collection when the projection was taken
    #[serde(default)]
    pub tab_index: Option<usize>,
    #[serde(default)]
    pub is_incognito: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_executed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub pinned_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_default() {
        let id = TabId::new();
        let root = RootId::new();
        let json = format!(
            r#"{{"id":"{}","root_id":"{}","created_at":"2024-05-01T10:00:00Z"}}"#,
            id, root
        );

        let saved: SavedTab = serde_json::from_str(&json).unwrap();
        assert_eq!(saved.id, id);
        assert_eq!(saved.root_id, root);
        assert!(saved.url.is_none());
        assert!(!saved.is_selected);
        assert_eq!(saved.tab_index, None);
    }
}
