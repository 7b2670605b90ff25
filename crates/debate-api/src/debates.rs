//! Handlers for `/debates` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/debates` | Every debate, newest first, with totals and winner |
//! | `GET`  | `/debates/today` | The active debate's board; 404 when none is open |
//! | `GET`  | `/debates/{day}` | The board for a given day number |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use debate_core::{
  Error as CoreError,
  collab::ContentModerator,
  debate::DebateSummary,
  entry::DebateBoard,
  ledger::VotingLedger,
  store::{DebateStore, Lift},
};

use crate::{error::ApiError, identity::Viewer};

/// `GET /debates`
pub async fn history<S, M>(
  State(ledger): State<Arc<VotingLedger<S, M>>>,
) -> Result<Json<Vec<DebateSummary>>, ApiError>
where
  S: DebateStore,
  M: ContentModerator,
{
  let history = ledger.store().history().await.lift()?;
  Ok(Json(history))
}

/// `GET /debates/today`
pub async fn today<S, M>(
  State(ledger): State<Arc<VotingLedger<S, M>>>,
  viewer: Viewer,
) -> Result<Json<DebateBoard>, ApiError>
where
  S: DebateStore,
  M: ContentModerator,
{
  let store = ledger.store();
  let active = store
    .active_debate()
    .await
    .lift()?
    .ok_or(CoreError::NoActiveDebate)?;
  let board = store
    .board(active.debate_id, viewer.user_id())
    .await
    .lift()?
    .ok_or(CoreError::NoActiveDebate)?;
  Ok(Json(board))
}

/// `GET /debates/{day}`
pub async fn by_day<S, M>(
  State(ledger): State<Arc<VotingLedger<S, M>>>,
  Path(day): Path<u32>,
  viewer: Viewer,
) -> Result<Json<DebateBoard>, ApiError>
where
  S: DebateStore,
  M: ContentModerator,
{
  let store = ledger.store();
  let debate = store
    .debate_by_day(day)
    .await
    .lift()?
    .ok_or(CoreError::DayNotFound(day))?;
  let board = store
    .board(debate.debate_id, viewer.user_id())
    .await
    .lift()?
    .ok_or(CoreError::DayNotFound(day))?;
  Ok(Json(board))
}
