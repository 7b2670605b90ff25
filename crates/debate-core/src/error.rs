//! Error taxonomy shared by every layer of the debate engine.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("entry content cannot be empty")]
  EmptyEntry,

  #[error("entry content must be {max} characters or less (got {len})")]
  EntryTooLong { len: usize, max: usize },

  #[error("entry was not approved by moderation: {reason}")]
  Rejected { reason: String },

  #[error("entry not found: {0}")]
  EntryNotFound(Uuid),

  #[error("debate not found: {0}")]
  DebateNotFound(Uuid),

  #[error("no debate for day {0}")]
  DayNotFound(u32),

  #[error("no active debate")]
  NoActiveDebate,

  #[error("you have not voted for entry {0}")]
  VoteNotFound(Uuid),

  #[error("debate {0} is no longer active")]
  DebateNotActive(Uuid),

  #[error("no debate is open for submissions")]
  SubmissionsClosed,

  #[error("you have already voted for entry {0}")]
  AlreadyVoted(Uuid),

  #[error("an active debate already exists (day {day_number})")]
  ActiveDebateExists { debate_id: Uuid, day_number: u32 },

  #[error("day number {0} is already taken")]
  DayNumberTaken(u32),

  #[error("the {max_days}-day debate challenge has ended")]
  ChallengeComplete { max_days: u32 },

  #[error("dependency failure: {0}")]
  Dependency(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Coarse classification used by outer layers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  Validation,
  NotFound,
  InvalidState,
  Conflict,
  LimitExceeded,
  DependencyFailure,
  Internal,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::EmptyEntry | Self::EntryTooLong { .. } | Self::Rejected { .. } => {
        ErrorKind::Validation
      }
      Self::EntryNotFound(_)
      | Self::DebateNotFound(_)
      | Self::DayNotFound(_)
      | Self::NoActiveDebate
      | Self::VoteNotFound(_) => ErrorKind::NotFound,
      Self::DebateNotActive(_) | Self::SubmissionsClosed => {
        ErrorKind::InvalidState
      }
      Self::AlreadyVoted(_)
      | Self::ActiveDebateExists { .. }
      | Self::DayNumberTaken(_) => ErrorKind::Conflict,
      Self::ChallengeComplete { .. } => ErrorKind::LimitExceeded,
      Self::Dependency(_) => ErrorKind::DependencyFailure,
      Self::Store(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
