//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use debate_core::ErrorKind;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("missing or blank x-user-id header")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] debate_core::Error),
}

impl ApiError {
  fn status(&self) -> (StatusCode, &'static str) {
    match self {
      Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
      Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "validation"),
      Self::Core(e) => match e.kind() {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, "validation"),
        ErrorKind::InvalidState => (StatusCode::BAD_REQUEST, "invalid_state"),
        ErrorKind::LimitExceeded => (StatusCode::BAD_REQUEST, "limit_exceeded"),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not_found"),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "conflict"),
        ErrorKind::DependencyFailure => (StatusCode::BAD_GATEWAY, "dependency_failure"),
        ErrorKind::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind) = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    }
    let message = match &self {
      // Storage details stay in the log.
      Self::Core(e) if e.kind() == ErrorKind::Internal => "internal error".to_owned(),
      other => other.to_string(),
    };
    (status, Json(json!({ "error": message, "kind": kind }))).into_response()
  }
}
