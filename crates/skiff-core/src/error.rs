//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] skiff_storage::StorageError),

    #[error("Tab error: {0}")]
    Tab(#[from] skiff_tabs::TabError),

    #[error("Session error: {0}")]
    Session(#[from] skiff_session::SessionError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
