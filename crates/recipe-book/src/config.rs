//! Recipe book configuration loaded from environment variables.
//!
//! All settings have defaults so the book works with zero configuration.

use std::path::PathBuf;

use recipe_store::StoreLocation;

pub const ENV_DB_PATH: &str = "RECIPE_BOOK_DB";
pub const ENV_IN_MEMORY: &str = "RECIPE_BOOK_IN_MEMORY";

/// Recipe book configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookConfig {
    /// Explicit database file.
    /// Env: `RECIPE_BOOK_DB`
    /// Default: none (platform data directory).
    pub db_path: Option<PathBuf>,

    /// Keep recipes in a transient in-memory database.
    /// Env: `RECIPE_BOOK_IN_MEMORY` (true/false)
    /// Default: `false`
    pub in_memory: bool,
}

impl BookConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DB_PATH) {
            if path.trim().is_empty() {
                tracing::warn!("Empty {ENV_DB_PATH}, using default location");
            } else {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup(ENV_IN_MEMORY) {
            match parse_flag(&val) {
                Some(flag) => config.in_memory = flag,
                None => tracing::warn!(value = %val, "Invalid {ENV_IN_MEMORY}, ignoring"),
            }
        }

        config
    }

    /// Where the SQLite adapter should open its database.
    ///
    /// `in_memory` wins over `db_path`.
    pub fn location(&self) -> StoreLocation {
        if self.in_memory {
            StoreLocation::InMemory
        } else if let Some(path) = &self.db_path {
            StoreLocation::Path(path.clone())
        } else {
            StoreLocation::Default
        }
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
