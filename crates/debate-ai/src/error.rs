//! Error type for `debate-ai`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{what} returned {status}: {body}")]
  Status {
    what:   &'static str,
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("inference response had no content")]
  EmptyCompletion,

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for debate_core::Error {
  fn from(e: Error) -> Self { debate_core::Error::Dependency(e.to_string()) }
}
