//! The recipe book: single in-memory source of truth for the UI.
//!
//! Every intent runs on the blocking pool while holding the adapter lock, and
//! publishes its state change from that same task right after the storage
//! call.  Publications therefore follow intent order, and a write that reached
//! disk is always mirrored even if the caller stops waiting for it.

use std::collections::BTreeSet;
use std::sync::Arc;

use recipe_store::{Recipe, RecipeAdapter, SqliteAdapter, StoreError};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::builder::{DraftMode, RecipeBuilder};
use crate::config::BookConfig;
use crate::error::{BookError, CommitError};
use crate::state::{BookState, LoadStatus};

/// Reactive, single-writer mirror of the persisted recipe collection.
///
/// Cloning is cheap; every clone routes through the same adapter and
/// publishes to the same subscribers.
pub struct RecipeBook<A: RecipeAdapter = SqliteAdapter> {
    adapter: Arc<Mutex<A>>,
    state: Arc<watch::Sender<BookState>>,
}

impl<A: RecipeAdapter> Clone for RecipeBook<A> {
    fn clone(&self) -> Self {
        Self {
            adapter: Arc::clone(&self.adapter),
            state: Arc::clone(&self.state),
        }
    }
}

/// Outcome of a batch delete.
#[derive(Debug, Default)]
pub struct DeleteReport {
    /// Ids whose deletion durably applied (including ones already absent).
    pub deleted: Vec<Uuid>,
    /// Requested positions that were outside the list.
    pub missing_positions: Vec<usize>,
    /// Ids the adapter failed to delete; they are still listed.
    pub failed: Vec<(Uuid, StoreError)>,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl RecipeBook<SqliteAdapter> {
    /// A SQLite-backed book at the configured location.  Not yet opened.
    pub fn from_config(config: &BookConfig) -> Self {
        Self::new(SqliteAdapter::new(config.location()))
    }
}

impl<A: RecipeAdapter> RecipeBook<A> {
    /// Wrap an adapter.  The book starts `Uninitialized` with no recipes; call
    /// [`initialize`](Self::initialize) to open the store.
    pub fn new(adapter: A) -> Self {
        let (state, _) = watch::channel(BookState::default());
        Self {
            adapter: Arc::new(Mutex::new(adapter)),
            state: Arc::new(state),
        }
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Receive a notification after every change to the published state.
    pub fn subscribe(&self) -> watch::Receiver<BookState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> BookState {
        self.state.borrow().clone()
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.state.borrow().recipes.clone()
    }

    pub fn load_failed(&self) -> bool {
        self.state.borrow().load_failed()
    }

    pub fn status(&self) -> LoadStatus {
        self.state.borrow().status
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Open the backing store and perform the initial fetch.
    ///
    /// A failure is published as `Failed` and the recipe list keeps its
    /// current value; the error is also returned to the caller.
    pub async fn initialize(&self) -> Result<(), BookError> {
        let outcome = self
            .run_blocking(|adapter, state| {
                publish(state, |s| {
                    if s.status != LoadStatus::Loaded {
                        s.status = LoadStatus::Loading;
                    }
                });

                let fetched = adapter.open().and_then(|()| adapter.fetch_all());
                if fetched.is_ok() {
                    info!("recipe store opened");
                }
                apply_fetch(state, fetched, "open")
            })
            .await;

        self.settle_load(outcome, "open")
    }

    /// Start [`initialize`](Self::initialize) in the background.
    ///
    /// Until it completes the book reports `Loading` with its previous
    /// recipes.  Must be called from within a Tokio runtime.
    pub fn spawn_initialize(&self) -> JoinHandle<Result<(), BookError>> {
        let book = self.clone();
        tokio::spawn(async move { book.initialize().await })
    }

    /// Re-read every recipe from the store.
    ///
    /// On failure the list is left as it was (stale but consistent) and the
    /// book is marked `Failed`.
    pub async fn refresh(&self) -> Result<(), BookError> {
        let outcome = self
            .run_blocking(|adapter, state| apply_fetch(state, adapter.fetch_all(), "refresh"))
            .await;

        self.settle_load(outcome, "refresh")
    }

    /// Close the backing store.  The last list stays readable and the book
    /// returns to `Uninitialized`.
    pub async fn shutdown(&self) {
        let mut adapter = self.adapter.lock().await;
        adapter.close();
        publish(&self.state, |s| s.status = LoadStatus::Uninitialized);
        info!("recipe book shut down");
    }

    // ------------------------------------------------------------------
    // Intents
    // ------------------------------------------------------------------

    /// Delete the recipes at the given positions of the current list.
    ///
    /// Every position is resolved to a recipe id before the first deletion,
    /// so earlier removals cannot shift later targets.  A failed deletion is
    /// reported and the rest of the batch still runs.  Each id leaves the
    /// list as soon as its removal is durable.
    ///
    /// If the storage worker dies mid-batch the book re-reads the store so
    /// the list never shows recipes that are already gone.
    pub async fn delete(&self, positions: &BTreeSet<usize>) -> Result<DeleteReport, BookError> {
        let positions = positions.clone();
        let outcome = self
            .run_blocking(move |adapter, state| delete_batch(adapter, state, &positions))
            .await;

        match outcome {
            Ok(report) => {
                debug!(
                    deleted = report.deleted.len(),
                    failed = report.failed.len(),
                    "batch delete finished"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(error = %e, "batch delete aborted, re-reading recipes");
                let _ = self.refresh().await;
                Err(e)
            }
        }
    }

    /// Validate a draft and write it through to durable storage.
    ///
    /// `Create` inserts a new recipe, `Edit` overwrites the existing one in
    /// place.  The in-memory list only changes after the write succeeded.
    pub async fn commit(&self, draft: &RecipeBuilder<A>) -> Result<Recipe, CommitError> {
        let recipe = draft.validate()?;
        let mode = draft.mode();

        let written = recipe.clone();
        let outcome = self
            .run_blocking(move |adapter, state| {
                let result = match mode {
                    DraftMode::Create => adapter.insert(&written),
                    DraftMode::Edit(_) => adapter.update(&written),
                };
                if result.is_ok() {
                    publish(state, |s| {
                        match s.recipes.iter_mut().find(|r| r.id == written.id) {
                            Some(slot) => *slot = written.clone(),
                            None => s.recipes.push(written.clone()),
                        }
                    });
                }
                result
            })
            .await;

        match outcome {
            Ok(Ok(())) => {
                debug!(id = %recipe.id, ?mode, "recipe committed");
                Ok(recipe)
            }
            Ok(Err(e)) => {
                warn!(id = %recipe.id, error = %e, "failed to save recipe");
                Err(e.into())
            }
            Err(e) => {
                warn!(id = %recipe.id, error = %e, "save aborted, re-reading recipes");
                let _ = self.refresh().await;
                Err(e.into())
            }
        }
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Run `op` against the locked adapter on the blocking pool.
    ///
    /// The lock is released when `op` returns, on the blocking thread, so the
    /// write and its publication complete together even if this future is
    /// dropped while waiting.
    async fn run_blocking<T, F>(&self, op: F) -> Result<T, BookError>
    where
        T: Send + 'static,
        F: FnOnce(&mut A, &watch::Sender<BookState>) -> T + Send + 'static,
    {
        let mut adapter = self.adapter.clone().lock_owned().await;
        let state = Arc::clone(&self.state);
        let out = tokio::task::spawn_blocking(move || op(&mut *adapter, &*state)).await?;
        Ok(out)
    }

    fn settle_load(
        &self,
        outcome: Result<recipe_store::Result<()>, BookError>,
        during: &'static str,
    ) -> Result<(), BookError> {
        match outcome {
            Ok(result) => result.map_err(BookError::from),
            Err(e) => {
                warn!(error = %e, during, "could not load recipes");
                publish(&self.state, |s| s.status = LoadStatus::Failed);
                Err(e)
            }
        }
    }
}

/// Apply `modify` and notify subscribers if the state changed.
fn publish(state: &watch::Sender<BookState>, modify: impl FnOnce(&mut BookState)) {
    state.send_if_modified(|s| {
        let before = s.clone();
        modify(s);
        *s != before
    });
}

fn apply_fetch(
    state: &watch::Sender<BookState>,
    fetched: recipe_store::Result<Vec<Recipe>>,
    during: &'static str,
) -> recipe_store::Result<()> {
    match fetched {
        Ok(recipes) => {
            debug!(count = recipes.len(), during, "recipes fetched");
            publish(state, |s| {
                s.status = LoadStatus::Loaded;
                s.recipes = recipes;
            });
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, during, "could not load recipes");
            publish(state, |s| s.status = LoadStatus::Failed);
            Err(e)
        }
    }
}

fn delete_batch<A: RecipeAdapter>(
    adapter: &mut A,
    state: &watch::Sender<BookState>,
    positions: &BTreeSet<usize>,
) -> DeleteReport {
    let mut report = DeleteReport::default();
    let targets: Vec<Uuid> = {
        let current = state.borrow();
        positions
            .iter()
            .filter_map(|&pos| match current.recipes.get(pos) {
                Some(recipe) => Some(recipe.id),
                None => {
                    report.missing_positions.push(pos);
                    None
                }
            })
            .collect()
    };

    for pos in &report.missing_positions {
        warn!(position = pos, "delete requested for a position outside the list");
    }

    for id in targets {
        match adapter.delete(id) {
            Ok(()) => {
                publish(state, |s| s.recipes.retain(|r| r.id != id));
                report.deleted.push(id);
            }
            Err(e) => {
                warn!(%id, error = %e, "failed to delete recipe");
                report.failed.push((id, e));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::{pasta, recipe, RecordingAdapter};

    async fn loaded_book(
        recipes: Vec<Recipe>,
    ) -> (RecipeBook<RecordingAdapter>, RecordingAdapter) {
        let adapter = RecordingAdapter::with_recipes(recipes);
        let storage = adapter.clone();
        let book = RecipeBook::new(adapter);
        book.initialize().await.unwrap();
        (book, storage)
    }

    fn positions(p: &[usize]) -> BTreeSet<usize> {
        p.iter().copied().collect()
    }

    #[tokio::test]
    async fn starts_uninitialized_and_empty() {
        let book = RecipeBook::new(RecordingAdapter::default());
        assert_eq!(book.status(), LoadStatus::Uninitialized);
        assert!(book.recipes().is_empty());
        assert!(!book.load_failed());
    }

    #[tokio::test]
    async fn initialize_loads_persisted_recipes() {
        let stored = vec![pasta(), recipe("Soup")];
        let (book, storage) = loaded_book(stored.clone()).await;

        assert_eq!(book.status(), LoadStatus::Loaded);
        assert_eq!(book.recipes(), stored);
        assert_eq!(storage.calls().opens, 1);
    }

    #[tokio::test]
    async fn open_failure_sets_load_failed_without_touching_recipes() {
        let adapter = RecordingAdapter::default();
        adapter.fail_open(StoreError::Io(std::io::Error::other("disk full")));
        let book = RecipeBook::new(adapter);

        let err = book.initialize().await.unwrap_err();
        assert!(matches!(err, BookError::Store(StoreError::Io(_))));
        assert!(book.load_failed());
        assert!(book.recipes().is_empty());
        assert!(book.state().listing().is_none());
    }

    #[tokio::test]
    async fn refresh_failure_keeps_stale_list_and_recovers() {
        let (book, storage) = loaded_book(vec![pasta()]).await;
        let before = book.recipes();

        storage.fail_fetch(true);
        assert!(book.refresh().await.is_err());
        assert!(book.load_failed());
        assert_eq!(book.recipes(), before);

        storage.fail_fetch(false);
        book.refresh().await.unwrap();
        assert_eq!(book.status(), LoadStatus::Loaded);
        assert_eq!(book.recipes(), before);
    }

    #[tokio::test]
    async fn spawned_initialize_completes_after_return() {
        let book = RecipeBook::new(RecordingAdapter::with_recipes(vec![pasta()]));
        let mut rx = book.subscribe();

        let handle = book.spawn_initialize();
        handle.await.unwrap().unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().recipes().len(), 1);
        assert_eq!(book.status(), LoadStatus::Loaded);
    }

    #[tokio::test]
    async fn batch_delete_resolves_ids_before_deleting() {
        let (a, b, c) = (recipe("A"), recipe("B"), recipe("C"));
        let (book, storage) = loaded_book(vec![a.clone(), b.clone(), c.clone()]).await;

        let report = book.delete(&positions(&[0, 2])).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.deleted, vec![a.id, c.id]);
        assert_eq!(storage.calls().deletes, vec![a.id, c.id]);
        assert_eq!(book.recipes(), vec![b.clone()]);
        assert_eq!(storage.stored(), vec![b]);
    }

    #[tokio::test]
    async fn batch_delete_continues_past_failures() {
        let (a, b, c) = (recipe("A"), recipe("B"), recipe("C"));
        let (book, storage) = loaded_book(vec![a.clone(), b.clone(), c.clone()]).await;
        storage.fail_delete_of(a.id);

        let report = book.delete(&positions(&[0, 1, 2])).await.unwrap();

        assert_eq!(report.deleted, vec![b.id, c.id]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, a.id);
        // Only what durably went away leaves the list.
        assert_eq!(book.recipes(), vec![a.clone()]);
        assert_eq!(storage.stored(), vec![a]);
    }

    #[tokio::test]
    async fn worker_crash_mid_batch_rereads_the_store() {
        let (a, b, c) = (recipe("A"), recipe("B"), recipe("C"));
        let (book, storage) = loaded_book(vec![a.clone(), b.clone(), c.clone()]).await;
        storage.panic_on_delete_of(b.id);

        let err = book.delete(&positions(&[0, 1, 2])).await.unwrap_err();

        assert!(matches!(err, BookError::Worker(_)));
        // `a` went away before the crash and must not linger in the list.
        assert_eq!(storage.stored(), vec![b.clone(), c.clone()]);
        assert_eq!(book.recipes(), storage.stored());
        assert_eq!(book.status(), LoadStatus::Loaded);
    }

    #[tokio::test]
    async fn abandoned_commit_is_still_mirrored() {
        let (book, storage) = loaded_book(Vec::new()).await;
        let mut rx = book.subscribe();
        rx.borrow_and_update();

        let mut draft = RecipeBuilder::create(&book);
        draft.name = "Pasta".into();

        // Poll the commit once, then drop it while the write is in flight.
        tokio::select! {
            biased;
            _ = draft.commit() => {}
            _ = std::future::ready(()) => {}
        }

        tokio::time::timeout(Duration::from_secs(5), rx.changed())
            .await
            .expect("commit was never published")
            .unwrap();
        assert_eq!(storage.stored().len(), 1);
        assert_eq!(book.recipes(), storage.stored());
    }

    #[tokio::test]
    async fn delete_ignores_positions_outside_the_list() {
        let (book, storage) = loaded_book(vec![pasta()]).await;

        let report = book.delete(&positions(&[5])).await.unwrap();

        assert_eq!(report.missing_positions, vec![5]);
        assert!(storage.calls().deletes.is_empty());
        assert_eq!(book.recipes().len(), 1);
    }

    #[tokio::test]
    async fn deleting_an_already_absent_recipe_is_harmless() {
        let r = pasta();
        let (book, storage) = loaded_book(vec![r.clone()]).await;
        // Gone from storage behind the book's back.
        storage.remove_stored(r.id);

        let report = book.delete(&positions(&[0])).await.unwrap();
        assert!(report.is_complete());
        assert!(book.recipes().is_empty());

        book.refresh().await.unwrap();
        assert!(book.recipes().is_empty());
    }

    #[tokio::test]
    async fn unchanged_refresh_does_not_notify() {
        let (book, _storage) = loaded_book(vec![pasta()]).await;
        let mut rx = book.subscribe();
        rx.borrow_and_update();

        book.refresh().await.unwrap();
        assert!(!rx.has_changed().unwrap());

        book.delete(&positions(&[0])).await.unwrap();
        assert!(rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn shutdown_closes_the_adapter() {
        let (book, storage) = loaded_book(vec![pasta()]).await;

        book.shutdown().await;

        assert_eq!(book.status(), LoadStatus::Uninitialized);
        assert_eq!(book.recipes().len(), 1);
        assert_eq!(storage.calls().closes, 1);

        book.initialize().await.unwrap();
        assert_eq!(book.status(), LoadStatus::Loaded);
    }
}
