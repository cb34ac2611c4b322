use thiserror::Error;
use uuid::Uuid;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error (corrupt file, disk full, locked database, ...).
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The adapter was used before `open` succeeded.
    #[error("Recipe store is not open")]
    NotOpen,

    /// No recipe with this id is persisted.
    #[error("Recipe not found: {0}")]
    NotFound(Uuid),

    /// A recipe with this id is already persisted.
    #[error("Recipe already exists: {0}")]
    Duplicate(Uuid),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),

    /// Ingredient / instruction list (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
