//! # roster-store
//!
//! Local persistence for the Roster client, backed by SQLite.
//!
//! The client saves its whole users state as an opaque JSON snapshot and
//! restores it on the next start.  The crate exposes a synchronous
//! `Database` handle that wraps a `rusqlite::Connection` and provides typed
//! helpers to save, load and delete snapshots by key.

pub mod database;
pub mod migrations;
pub mod models;
pub mod snapshots;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
