//! Scheduler-facing lifecycle endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/cron/new-debate` | Open the next day's debate → 201 |
//! | `GET`  | `/cron/new-debate` | Active debate, total count and next day number |
//! | `POST` | `/cron/close-debate` | Close the active debate → 200 with its summary |
//! | `GET`  | `/cron/close-debate` | Totals, top entries and would-be winner, read-only |
//!
//! Every route requires [`CronAuthorized`].

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use debate_core::{
  collab::{Archiver, Generator},
  debate::{ClosePreview, DebateSummary, OpenStatus},
  store::DebateStore,
};

use crate::{AppState, auth::CronAuthorized, error::Error};

/// `POST /cron/new-debate`
pub async fn open<S, G, A>(
  _auth: CronAuthorized,
  State(state): State<AppState<S, G, A>>,
) -> Result<impl IntoResponse, Error>
where
  S: DebateStore,
  G: Generator,
  A: Archiver,
{
  let debate = state.lifecycle.open_new_debate().await?;
  Ok((StatusCode::CREATED, Json(debate)))
}

/// `GET /cron/new-debate`
pub async fn open_status<S, G, A>(
  _auth: CronAuthorized,
  State(state): State<AppState<S, G, A>>,
) -> Result<Json<OpenStatus>, Error>
where
  S: DebateStore,
  G: Generator,
  A: Archiver,
{
  Ok(Json(state.lifecycle.open_status().await?))
}

/// `POST /cron/close-debate`
pub async fn close<S, G, A>(
  _auth: CronAuthorized,
  State(state): State<AppState<S, G, A>>,
) -> Result<Json<DebateSummary>, Error>
where
  S: DebateStore,
  G: Generator,
  A: Archiver,
{
  Ok(Json(state.lifecycle.close_active_debate().await?))
}

/// `GET /cron/close-debate`
pub async fn preview<S, G, A>(
  _auth: CronAuthorized,
  State(state): State<AppState<S, G, A>>,
) -> Result<Json<ClosePreview>, Error>
where
  S: DebateStore,
  G: Generator,
  A: Archiver,
{
  Ok(Json(state.lifecycle.preview_close().await?))
}
