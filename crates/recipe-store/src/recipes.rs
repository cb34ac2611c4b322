//! CRUD operations for [`Recipe`] records.

use rusqlite::{params, ErrorCode};
use uuid::Uuid;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::Recipe;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new recipe.  Fails with [`StoreError::Duplicate`] if the id is
    /// already taken.
    pub fn insert_recipe(&self, recipe: &Recipe) -> Result<()> {
        let ingredients = serde_json::to_string(&recipe.ingredients)?;
        let instructions = serde_json::to_string(&recipe.instructions)?;

        self.conn()
            .execute(
                "INSERT INTO recipes (id, name, ingredients, instructions, image)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    recipe.id.to_string(),
                    recipe.name,
                    ingredients,
                    instructions,
                    recipe.image,
                ],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(ref err, _)
                    if err.code == ErrorCode::ConstraintViolation
                        && err.extended_code == PRIMARY_KEY_VIOLATION =>
                {
                    StoreError::Duplicate(recipe.id)
                }
                other => StoreError::Sqlite(other),
            })?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single recipe by UUID.
    pub fn get_recipe(&self, id: Uuid) -> Result<Recipe> {
        self.conn()
            .query_row(
                "SELECT id, name, ingredients, instructions, image
                 FROM recipes
                 WHERE id = ?1",
                params![id.to_string()],
                row_to_recipe,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(id),
                other => StoreError::Sqlite(other),
            })
    }

    /// List all recipes in insertion order.
    pub fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, name, ingredients, instructions, image
             FROM recipes
             ORDER BY rowid ASC",
        )?;

        let rows = stmt.query_map([], row_to_recipe)?;

        let mut recipes = Vec::new();
        for row in rows {
            recipes.push(row?);
        }
        Ok(recipes)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Overwrite every field of an existing recipe, keyed by its id.
    pub fn update_recipe(&self, recipe: &Recipe) -> Result<()> {
        let ingredients = serde_json::to_string(&recipe.ingredients)?;
        let instructions = serde_json::to_string(&recipe.instructions)?;

        let affected = self.conn().execute(
            "UPDATE recipes
             SET name = ?2, ingredients = ?3, instructions = ?4, image = ?5
             WHERE id = ?1",
            params![
                recipe.id.to_string(),
                recipe.name,
                ingredients,
                instructions,
                recipe.image,
            ],
        )?;

        if affected == 0 {
            return Err(StoreError::NotFound(recipe.id));
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a recipe by UUID.  Returns `true` if a row was deleted.
    pub fn delete_recipe(&self, id: Uuid) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM recipes WHERE id = ?1", params![id.to_string()])?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `SQLITE_CONSTRAINT_PRIMARYKEY`
const PRIMARY_KEY_VIOLATION: std::os::raw::c_int = 1555;

fn conversion_failure(
    column: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
}

/// Map a `rusqlite::Row` to a [`Recipe`].
fn row_to_recipe(row: &rusqlite::Row<'_>) -> rusqlite::Result<Recipe> {
    let id_str: String = row.get(0)?;
    let name: String = row.get(1)?;
    let ingredients_json: String = row.get(2)?;
    let instructions_json: String = row.get(3)?;
    let image: Option<Vec<u8>> = row.get(4)?;

    let id = Uuid::parse_str(&id_str).map_err(|e| conversion_failure(0, e))?;

    let ingredients: Vec<String> =
        serde_json::from_str(&ingredients_json).map_err(|e| conversion_failure(2, e))?;

    let instructions: Vec<String> =
        serde_json::from_str(&instructions_json).map_err(|e| conversion_failure(3, e))?;

    Ok(Recipe {
        id,
        name,
        ingredients,
        instructions,
        image,
    })
}
