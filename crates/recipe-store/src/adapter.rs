//! The persistence seam used by the recipe book.
//!
//! [`RecipeAdapter`] is synchronous; callers on an async executor drive it
//! from a blocking task.

use std::path::PathBuf;

use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Recipe;

/// Durable storage for recipes.
///
/// Every mutating call either applies completely or not at all.
pub trait RecipeAdapter: Send + 'static {
    /// Open the backing store.  Calling it again after a successful open is a
    /// no-op.
    fn open(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// All persisted recipes in store order.
    fn fetch_all(&self) -> Result<Vec<Recipe>>;

    /// Persist a new recipe.  Fails if the id already exists.
    fn insert(&mut self, recipe: &Recipe) -> Result<()>;

    /// Persist changes to an existing recipe.  Fails if the id is unknown.
    fn update(&mut self, recipe: &Recipe) -> Result<()>;

    /// Remove a recipe.  Removing an id that is not stored succeeds.
    fn delete(&mut self, id: Uuid) -> Result<()>;

    /// Release the backing store.  A later `open` reopens it.
    fn close(&mut self);
}

/// Where a [`SqliteAdapter`] keeps its database.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreLocation {
    /// The platform data directory, see [`Database::new`].
    #[default]
    Default,
    /// An explicit database file.
    Path(PathBuf),
    /// A transient database, lost on close.
    InMemory,
}

/// [`RecipeAdapter`] backed by a SQLite [`Database`].
pub struct SqliteAdapter {
    location: StoreLocation,
    db: Option<Database>,
}

impl SqliteAdapter {
    pub fn new(location: StoreLocation) -> Self {
        Self { location, db: None }
    }

    fn db(&self) -> Result<&Database> {
        self.db.as_ref().ok_or(StoreError::NotOpen)
    }
}

impl Default for SqliteAdapter {
    fn default() -> Self {
        Self::new(StoreLocation::Default)
    }
}

impl RecipeAdapter for SqliteAdapter {
    fn open(&mut self) -> Result<()> {
        if self.db.is_some() {
            return Ok(());
        }

        let db = match &self.location {
            StoreLocation::Default => Database::new()?,
            StoreLocation::Path(path) => {
                tracing::info!(path = %path.display(), "opening recipe database");
                Database::open_at(path)?
            }
            StoreLocation::InMemory => {
                tracing::info!("opening in-memory recipe database");
                Database::open_in_memory()?
            }
        };

        self.db = Some(db);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.db.is_some()
    }

    fn fetch_all(&self) -> Result<Vec<Recipe>> {
        self.db()?.list_recipes()
    }

    fn insert(&mut self, recipe: &Recipe) -> Result<()> {
        self.db()?.insert_recipe(recipe)?;
        tracing::debug!(id = %recipe.id, "recipe inserted");
        Ok(())
    }

    fn update(&mut self, recipe: &Recipe) -> Result<()> {
        self.db()?.update_recipe(recipe)?;
        tracing::debug!(id = %recipe.id, "recipe updated");
        Ok(())
    }

    fn delete(&mut self, id: Uuid) -> Result<()> {
        if self.db()?.delete_recipe(id)? {
            tracing::debug!(%id, "recipe deleted");
        } else {
            tracing::debug!(%id, "recipe already absent, nothing to delete");
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.db.take().is_some() {
            tracing::info!("recipe database closed");
        }
    }
}
