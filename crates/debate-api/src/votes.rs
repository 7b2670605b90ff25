//! Handlers for entry submission and voting.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/entries` | Body: `{"content": "...", "debate_id"?: "<uuid>"}` → 201 |
//! | `POST`   | `/votes` | Body: `{"entry_id": "<uuid>"}` → 201, or 200 when the vote moved |
//! | `DELETE` | `/votes/{entry_id}` | 404 if the caller has no vote there |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use debate_core::{collab::ContentModerator, ledger::VotingLedger, store::DebateStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::ApiError, identity::Caller};

// ─── Submit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub content:   String,
  #[serde(default)]
  pub debate_id: Option<Uuid>,
}

/// `POST /entries`
pub async fn submit<S, M>(
  State(ledger): State<Arc<VotingLedger<S, M>>>,
  Caller(author): Caller,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DebateStore,
  M: ContentModerator,
{
  let entry = ledger
    .submit_entry(&author, body.debate_id, &body.content)
    .await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Cast ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CastBody {
  pub entry_id: Uuid,
}

/// `POST /votes`
pub async fn cast<S, M>(
  State(ledger): State<Arc<VotingLedger<S, M>>>,
  Caller(voter): Caller,
  Json(body): Json<CastBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DebateStore,
  M: ContentModerator,
{
  let receipt = ledger.cast_vote(&voter.user_id, body.entry_id).await?;
  let status = if receipt.is_switch() { StatusCode::OK } else { StatusCode::CREATED };
  Ok((status, Json(receipt)))
}

// ─── Retract ──────────────────────────────────────────────────────────────────

/// `DELETE /votes/{entry_id}`
pub async fn retract<S, M>(
  State(ledger): State<Arc<VotingLedger<S, M>>>,
  Caller(voter): Caller,
  Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DebateStore,
  M: ContentModerator,
{
  let receipt = ledger.retract_vote(&voter.user_id, entry_id).await?;
  Ok(Json(receipt))
}
