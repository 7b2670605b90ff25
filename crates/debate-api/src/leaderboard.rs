//! `GET /leaderboard[?limit=<n>]`: users with at least one win, with the
//! votes their entries received.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use debate_core::{
  collab::ContentModerator,
  ledger::VotingLedger,
  store::{DebateStore, Lift},
  user::LeaderboardEntry,
};
use serde::Deserialize;

use crate::error::ApiError;

const DEFAULT_LIMIT: usize = 10;
const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct Params {
  pub limit: Option<usize>,
}

pub async fn handler<S, M>(
  State(ledger): State<Arc<VotingLedger<S, M>>>,
  Query(params): Query<Params>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError>
where
  S: DebateStore,
  M: ContentModerator,
{
  let limit = match params.limit {
    None => DEFAULT_LIMIT,
    Some(0) => return Err(ApiError::BadRequest("limit must be at least 1".into())),
    Some(n) => n.min(MAX_LIMIT),
  };
  let users = ledger.store().leaderboard(limit).await.lift()?;
  Ok(Json(users))
}
