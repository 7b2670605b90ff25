//! JSON REST API for the daily debate.
//!
//! Exposes an axum [`Router`] backed by a [`VotingLedger`] over any
//! [`DebateStore`]. The caller is identified by headers set by an upstream
//! identity provider (see [`identity`]); TLS and authentication proper are
//! the deployer's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", debate_api::api_router(ledger.clone()))
//! ```

pub mod debates;
pub mod error;
pub mod identity;
pub mod leaderboard;
pub mod users;
pub mod votes;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use debate_core::{collab::ContentModerator, ledger::VotingLedger, store::DebateStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `ledger`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, M>(ledger: Arc<VotingLedger<S, M>>) -> Router<()>
where
  S: DebateStore + 'static,
  M: ContentModerator + 'static,
{
  Router::new()
    // Debates
    .route("/debates", get(debates::history::<S, M>))
    .route("/debates/today", get(debates::today::<S, M>))
    .route("/debates/{day}", get(debates::by_day::<S, M>))
    // Entries and votes
    .route("/entries", post(votes::submit::<S, M>))
    .route("/votes", post(votes::cast::<S, M>))
    .route("/votes/{entry_id}", delete(votes::retract::<S, M>))
    // Users
    .route("/leaderboard", get(leaderboard::handler::<S, M>))
    .route("/me", get(users::me::<S, M>))
    .route("/users/{user_id}", get(users::by_id::<S, M>))
    .with_state(ledger)
}
