//! The snapshot published by [`RecipeBook`](crate::RecipeBook).

use recipe_store::Recipe;

/// Load status of the book.
///
/// `Failed` is not terminal: a later successful refresh moves back to
/// `Loaded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Uninitialized,
    Loading,
    Loaded,
    Failed,
}

/// What the recipe list screen should present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookView<'a> {
    Loading,
    /// The database could not be loaded.
    Unavailable,
    Empty,
    List(&'a [Recipe]),
}

/// Published recipe book state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookState {
    pub(crate) status: LoadStatus,
    pub(crate) recipes: Vec<Recipe>,
}

impl BookState {
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn load_failed(&self) -> bool {
        self.status == LoadStatus::Failed
    }

    /// Recipes from the last successful fetch, possibly stale after a failure.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// The recipe list, or `None` when the store could not be loaded.
    pub fn listing(&self) -> Option<&[Recipe]> {
        if self.load_failed() {
            None
        } else {
            Some(&self.recipes)
        }
    }

    pub fn view(&self) -> BookView<'_> {
        match self.status {
            LoadStatus::Uninitialized | LoadStatus::Loading => BookView::Loading,
            LoadStatus::Failed => BookView::Unavailable,
            LoadStatus::Loaded if self.recipes.is_empty() => BookView::Empty,
            LoadStatus::Loaded => BookView::List(&self.recipes),
        }
    }
}
