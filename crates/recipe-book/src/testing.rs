//! In-memory adapter with call recording and failure injection.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use recipe_store::{Recipe, RecipeAdapter, Result, StoreError};
use uuid::Uuid;

pub fn recipe(name: &str) -> Recipe {
    Recipe::new(name, vec![format!("{name} base")], vec!["Cook".into()], None)
}

pub fn pasta() -> Recipe {
    Recipe::new(
        "Pasta",
        vec!["Pasta".into(), "Sauce".into()],
        vec!["Boil".into(), "Mix".into()],
        None,
    )
}

#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub opens: usize,
    pub closes: usize,
    pub inserts: Vec<Uuid>,
    pub updates: Vec<Uuid>,
    pub deletes: Vec<Uuid>,
}

#[derive(Default)]
struct Inner {
    open: bool,
    stored: Vec<Recipe>,
    calls: Calls,
    open_error: Option<StoreError>,
    fail_fetch: bool,
    fail_writes: bool,
    fail_delete: HashSet<Uuid>,
    panic_delete: HashSet<Uuid>,
}

/// Cloning shares the underlying state, so a test keeps a handle while the
/// book owns the adapter.
#[derive(Clone, Default)]
pub struct RecordingAdapter {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingAdapter {
    pub fn with_recipes(recipes: Vec<Recipe>) -> Self {
        let adapter = Self::default();
        adapter.lock().stored = recipes;
        adapter
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic injected by `panic_on_delete_of` must not wedge later calls.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> Calls {
        self.lock().calls.clone()
    }

    pub fn stored(&self) -> Vec<Recipe> {
        self.lock().stored.clone()
    }

    pub fn remove_stored(&self, id: Uuid) {
        self.lock().stored.retain(|r| r.id != id);
    }

    pub fn fail_open(&self, error: StoreError) {
        self.lock().open_error = Some(error);
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.lock().fail_fetch = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn fail_delete_of(&self, id: Uuid) {
        self.lock().fail_delete.insert(id);
    }

    pub fn panic_on_delete_of(&self, id: Uuid) {
        self.lock().panic_delete.insert(id);
    }
}

fn injected() -> StoreError {
    StoreError::Io(std::io::Error::other("injected failure"))
}

impl RecipeAdapter for RecordingAdapter {
    fn open(&mut self) -> Result<()> {
        let mut inner = self.lock();
        if inner.open {
            return Ok(());
        }
        if let Some(e) = inner.open_error.take() {
            return Err(e);
        }
        inner.calls.opens += 1;
        inner.open = true;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.lock().open
    }

    fn fetch_all(&self) -> Result<Vec<Recipe>> {
        let inner = self.lock();
        if !inner.open {
            return Err(StoreError::NotOpen);
        }
        if inner.fail_fetch {
            return Err(injected());
        }
        Ok(inner.stored.clone())
    }

    fn insert(&mut self, recipe: &Recipe) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.inserts.push(recipe.id);
        if inner.fail_writes {
            return Err(injected());
        }
        if inner.stored.iter().any(|r| r.id == recipe.id) {
            return Err(StoreError::Duplicate(recipe.id));
        }
        inner.stored.push(recipe.clone());
        Ok(())
    }

    fn update(&mut self, recipe: &Recipe) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.updates.push(recipe.id);
        if inner.fail_writes {
            return Err(injected());
        }
        match inner.stored.iter_mut().find(|r| r.id == recipe.id) {
            Some(slot) => {
                *slot = recipe.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(recipe.id)),
        }
    }

    fn delete(&mut self, id: Uuid) -> Result<()> {
        let mut inner = self.lock();
        inner.calls.deletes.push(id);
        if inner.panic_delete.contains(&id) {
            drop(inner);
            panic!("storage worker crashed deleting {id}");
        }
        if inner.fail_delete.contains(&id) {
            return Err(injected());
        }
        inner.stored.retain(|r| r.id != id);
        Ok(())
    }

    fn close(&mut self) {
        let mut inner = self.lock();
        if inner.open {
            inner.open = false;
            inner.calls.closes += 1;
        }
    }
}
