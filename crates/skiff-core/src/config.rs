//! Tab manager configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use skiff_session::ScopeId;

use crate::error::CoreError;
use crate::settings::TabSettings;
use crate::Result;

pub const DEFAULT_HOME_URL: &str = "internal://local/about/home";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Loaded by new tabs that have no URL of their own
    pub home_url: Url,
    /// Window or scene whose tabs this manager owns
    pub scope: ScopeId,
    /// Used when nothing is stored yet
    pub settings: TabSettings,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("skiff.db"),
            home_url: default_home_url(),
            scope: ScopeId::default(),
            settings: TabSettings::default(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Skiff"))
            .unwrap_or_else(|| PathBuf::from(".skiff"))
    }

    pub fn with_home_url(mut self, home_url: &str) -> Result<Self> {
        self.home_url = Url::parse(home_url)
            .map_err(|e| CoreError::Config(format!("invalid home URL {home_url:?}: {e}")))?;
        Ok(self)
    }

    pub fn with_scope(mut self, scope: ScopeId) -> Self {
        self.scope = scope;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

fn default_home_url() -> Url {
    // Constant input, parsing cannot fail
    Url::parse(DEFAULT_HOME_URL).unwrap_or_else(|_| unreachable!())
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_derive_from_data_dir() {
        let config = Config::new(PathBuf::from("/tmp/skiff-test"));
        assert_eq!(config.database_path, PathBuf::from("/tmp/skiff-test/skiff.db"));
        assert_eq!(config.home_url.as_str(), DEFAULT_HOME_URL);
        assert_eq!(config.scope, ScopeId::default());
    }

    #[test]
    fn test_invalid_home_url() {
        let config = Config::new(PathBuf::from("/tmp")).with_home_url("not a url");
        assert!(matches!(config, Err(CoreError::Config(_))));
    }
}
