//! # recipe-store
//!
//! On-device persistence for the recipe book, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` with typed CRUD helpers for [`Recipe`] records, and
//! the [`RecipeAdapter`] seam through which the in-memory recipe book talks to
//! durable storage.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod recipes;

mod error;

pub use adapter::{RecipeAdapter, SqliteAdapter, StoreLocation};
pub use database::Database;
pub use error::{Result, StoreError};
pub use models::*;
