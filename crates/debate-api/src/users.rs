//! Per-user profiles.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/me` | The caller's profile; 401 without an identity |
//! | `GET`  | `/users/{user_id}` | Anyone's profile; empty for unknown users |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use debate_core::{
  collab::ContentModerator,
  ledger::VotingLedger,
  store::{DebateStore, Lift},
  user::{UserId, UserProfile},
};

use crate::{error::ApiError, identity::Caller};

/// `GET /me`
pub async fn me<S, M>(
  State(ledger): State<Arc<VotingLedger<S, M>>>,
  Caller(caller): Caller,
) -> Result<Json<UserProfile>, ApiError>
where
  S: DebateStore,
  M: ContentModerator,
{
  let profile = ledger.store().profile(caller.user_id).await.lift()?;
  Ok(Json(profile))
}

/// `GET /users/{user_id}`
pub async fn by_id<S, M>(
  State(ledger): State<Arc<VotingLedger<S, M>>>,
  Path(raw): Path<String>,
) -> Result<Json<UserProfile>, ApiError>
where
  S: DebateStore,
  M: ContentModerator,
{
  let user_id =
    UserId::new(&raw).ok_or_else(|| ApiError::BadRequest("user id must not be blank".into()))?;
  let profile = ledger.store().profile(user_id).await.lift()?;
  Ok(Json(profile))
}
