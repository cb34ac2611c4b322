//! # recipe-book
//!
//! The in-memory recipe book and the draft builder that feeds it.
//!
//! [`RecipeBook`] is the single writer of the recipe list shown by the UI; it
//! mirrors a [`RecipeAdapter`] and publishes a [`BookState`] snapshot after
//! every change.  [`RecipeBuilder`] stages one create/edit session and commits
//! it back through the book.

pub mod book;
pub mod builder;
pub mod config;
pub mod error;
pub mod image;
pub mod state;

#[cfg(test)]
mod testing;

use tracing_subscriber::{fmt, EnvFilter};

pub use book::{DeleteReport, RecipeBook};
pub use builder::{DraftMode, RecipeBuilder, ValidationError};
pub use config::BookConfig;
pub use error::{BookError, CommitError};
pub use image::{available_sources, request_image, ImageCallback, ImagePicker, ImageSource};
pub use state::{BookState, BookView, LoadStatus};

pub use recipe_store::{Recipe, RecipeAdapter, SqliteAdapter, StoreError, StoreLocation};

/// Install the global `tracing` subscriber.
///
/// Honours `RUST_LOG`; later calls are ignored once a subscriber is set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("recipe_book=debug,recipe_store=info,warn"));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
