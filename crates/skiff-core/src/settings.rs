//! User-facing tab preferences

use chrono::Duration;
use serde::{Deserialize, Serialize};

use skiff_storage::Database;
use skiff_tabs::ArchiveAfter;

use crate::Result;

const SETTINGS_KEY: &str = "tab_settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabSettings {
    /// Destroy incognito tabs when leaving the incognito partition
    pub close_incognito_tabs: bool,
    pub archive_after: ArchiveAfter,
    /// Only pinned tabs or tabs used today are candidates for selection
    pub time_based_switcher: bool,
    pub block_popups: bool,
    pub popup_selection_delay_ms: u64,
    /// Closes within this window share one undo toast
    pub toast_batch_interval_ms: u64,
    pub max_crash_reloads: u32,
    pub max_recently_closed_batches: usize,
    pub tabs_to_keep_alive: usize,
}

impl Default for TabSettings {
    fn default() -> Self {
        Self {
            close_incognito_tabs: false,
            archive_after: ArchiveAfter::Never,
            time_based_switcher: false,
            block_popups: true,
            popup_selection_delay_ms: 100,
            toast_batch_interval_ms: 1500,
            max_crash_reloads: 3,
            max_recently_closed_batches: 20,
            tabs_to_keep_alive: 10,
        }
    }
}

impl TabSettings {
    pub fn popup_selection_delay(&self) -> Duration {
        Duration::milliseconds(self.popup_selection_delay_ms as i64)
    }

    pub fn toast_batch_interval(&self) -> Duration {
        Duration::milliseconds(self.toast_batch_interval_ms as i64)
    }

    /// Read stored settings. Missing or unreadable settings yield `None`.
    pub fn load(db: &Database) -> Option<Self> {
        match db.get_json::<TabSettings>(SETTINGS_KEY) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read tab settings, using defaults");
                None
            }
        }
    }

    pub fn save(&self, db: &Database) -> Result<()> {
        db.set_json(SETTINGS_KEY, self)?;
        Ok(())
    }
}
