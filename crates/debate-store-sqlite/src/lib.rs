//! SQLite backend for the debate store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every write runs inside a
//! `BEGIN IMMEDIATE` transaction; the read helpers in `queries` are shared
//! between plain reads and those transactions.

mod encode;
mod lifecycle;
mod queries;
mod schema;
mod store;
mod votes;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
