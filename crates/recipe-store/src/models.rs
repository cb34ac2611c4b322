//! Domain model structs persisted in the local SQLite database.
//!
//! Every struct derives `Serialize` and `Deserialize` so it can be handed
//! directly to the UI layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A single recipe entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    /// Unique recipe identifier, assigned at creation and never changed.
    pub id: Uuid,
    /// Display name.  Never empty once committed.
    pub name: String,
    /// Ingredients in display order.
    pub ingredients: Vec<String>,
    /// Instructions in execution order.
    pub instructions: Vec<String>,
    /// Encoded photo, if one was attached.
    pub image: Option<Vec<u8>>,
}

impl Recipe {
    /// Build a recipe with a freshly generated id.
    pub fn new(
        name: impl Into<String>,
        ingredients: Vec<String>,
        instructions: Vec<String>,
        image: Option<Vec<u8>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            ingredients,
            instructions,
            image,
        }
    }
}
