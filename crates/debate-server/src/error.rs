//! Error type for the cron endpoints and its `IntoResponse` implementation.

use axum::{
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use debate_api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unauthorized")]
  Unauthorized,

  #[error("invalid cron secret hash: {0}")]
  BadSecretHash(String),

  #[error(transparent)]
  Core(#[from] debate_core::Error),
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => {
        let mut res = (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Bearer realm=\"cron\""),
        );
        res
      }
      Error::BadSecretHash(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
      // Same JSON body and status mapping as the public API.
      Error::Core(e) => ApiError::from(e).into_response(),
    }
  }
}
