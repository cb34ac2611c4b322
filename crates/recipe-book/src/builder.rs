//! Staging area for one create/edit session.
//!
//! A [`RecipeBuilder`] is created when the recipe form opens, bound to the
//! form fields, and dropped when the form closes, whether or not the commit
//! went through.

use std::collections::BTreeSet;

use recipe_store::{Recipe, RecipeAdapter, SqliteAdapter};
use thiserror::Error;
use uuid::Uuid;

use crate::book::RecipeBook;
use crate::error::CommitError;

/// Whether a commit inserts a new recipe or overwrites an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Edit(Uuid),
}

/// User input that fails a local check; nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Recipe name must not be empty")]
    EmptyName,
}

/// Mutable staging copy of a recipe.
pub struct RecipeBuilder<A: RecipeAdapter = SqliteAdapter> {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub image: Option<Vec<u8>>,
    mode: DraftMode,
    book: RecipeBook<A>,
}

impl<A: RecipeAdapter> RecipeBuilder<A> {
    /// An empty draft that will insert a new recipe.
    pub fn create(book: &RecipeBook<A>) -> Self {
        Self {
            name: String::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            image: None,
            mode: DraftMode::Create,
            book: book.clone(),
        }
    }

    /// A draft seeded from `recipe` that will overwrite it in place.
    pub fn edit(book: &RecipeBook<A>, recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            image: recipe.image.clone(),
            mode: DraftMode::Edit(recipe.id),
            book: book.clone(),
        }
    }

    pub fn mode(&self) -> DraftMode {
        self.mode
    }

    // ------------------------------------------------------------------
    // Field editing
    // ------------------------------------------------------------------

    /// Append an ingredient.  Blank entries are ignored.
    pub fn push_ingredient(&mut self, ingredient: impl Into<String>) {
        push_entry(&mut self.ingredients, ingredient.into());
    }

    /// Append an instruction step.  Blank entries are ignored.
    pub fn push_instruction(&mut self, instruction: impl Into<String>) {
        push_entry(&mut self.instructions, instruction.into());
    }

    pub fn remove_ingredients(&mut self, positions: &BTreeSet<usize>) {
        remove_positions(&mut self.ingredients, positions);
    }

    pub fn remove_instructions(&mut self, positions: &BTreeSet<usize>) {
        remove_positions(&mut self.instructions, positions);
    }

    /// Replace the staged photo.  The bytes are not inspected.
    pub fn set_image(&mut self, bytes: Vec<u8>) {
        self.image = Some(bytes);
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Completion handler for an image picker: a cancelled pick (`None`)
    /// keeps whatever photo was staged before.
    pub fn accept_image(&mut self, bytes: Option<Vec<u8>>) {
        if let Some(bytes) = bytes {
            self.set_image(bytes);
        }
    }

    // ------------------------------------------------------------------
    // Commit
    // ------------------------------------------------------------------

    /// The recipe a commit would write, or why it would be rejected.
    ///
    /// In `Create` mode every call yields a fresh id.
    pub fn validate(&self) -> Result<Recipe, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let id = match self.mode {
            DraftMode::Create => Uuid::new_v4(),
            DraftMode::Edit(id) => id,
        };

        Ok(Recipe {
            id,
            name: name.to_string(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            image: self.image.clone(),
        })
    }

    /// Validate and write the draft through the recipe book.
    ///
    /// The staged fields are left untouched whatever the outcome.  After a
    /// success the draft should be dropped; committing it again is not
    /// supported.
    pub async fn commit(&self) -> Result<Recipe, CommitError> {
        self.book.commit(self).await
    }
}

fn push_entry(list: &mut Vec<String>, entry: String) {
    if !entry.trim().is_empty() {
        list.push(entry);
    }
}

fn remove_positions(list: &mut Vec<String>, positions: &BTreeSet<usize>) {
    let mut index = 0;
    list.retain(|_| {
        let keep = !positions.contains(&index);
        index += 1;
        keep
    });
}
