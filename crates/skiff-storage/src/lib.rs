//! Skiff Storage Layer
//!
//! SQLite-backed persistence shared by the browser crates: versioned
//! schema, key/value settings and the per-window session snapshot table.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
