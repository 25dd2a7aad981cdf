//! # sonica-store
//!
//! Relational persistence for the sonica conversion service, backed by
//! SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for the two domain
//! models: registered users and converted audio records.  The handle is
//! constructed explicitly by the caller and injected wherever persistence is
//! needed; there is no process-wide connection state.

pub mod database;
pub mod migrations;
pub mod models;
pub mod records;
pub mod users;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
