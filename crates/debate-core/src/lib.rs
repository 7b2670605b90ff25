//! Core types, the storage trait and the two services of the debate engine:
//! the [`ledger::VotingLedger`] and the [`lifecycle::LifecycleManager`].
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`store::DebateStore`]; AI and archival providers implement the
//! traits in [`collab`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod collab;
pub mod debate;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod store;
pub mod topics;
pub mod user;
pub mod vote;

pub use error::{Error, ErrorKind, Result};
