//! Entries — short answers submitted against a debate's topic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, debate::Debate, user::UserId};

/// Maximum entry length, counted in characters after trimming.
pub const MAX_ENTRY_CHARS: usize = 280;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
  pub entry_id:   Uuid,
  pub debate_id:  Uuid,
  pub user_id:    UserId,
  pub content:    String,
  pub approved:   bool,
  /// Cached count of live votes; only the ledger's transactions write it.
  pub vote_count: u32,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::DebateStore::insert_entry`]. The id, timestamp
/// and vote count are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewEntry {
  pub debate_id:   Uuid,
  pub user_id:     UserId,
  pub author_name: Option<String>,
  /// Already normalised by [`normalize_content`].
  pub content:     String,
}

/// Trim `raw` and enforce the length bounds.
pub fn normalize_content(raw: &str) -> Result<String> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::EmptyEntry);
  }
  let len = trimmed.chars().count();
  if len > MAX_ENTRY_CHARS {
    return Err(Error::EntryTooLong { len, max: MAX_ENTRY_CHARS });
  }
  Ok(trimmed.to_owned())
}

/// An entry together with its author's display name, in ranking order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
  #[serde(flatten)]
  pub entry:       Entry,
  pub author_name: Option<String>,
}

/// An entry as presented to a particular viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardEntry {
  #[serde(flatten)]
  pub standing:     Standing,
  pub has_voted:    bool,
  pub is_own_entry: bool,
}

/// A debate with its approved entries, most votes first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateBoard {
  #[serde(flatten)]
  pub debate:             Debate,
  pub entries:            Vec<BoardEntry>,
  pub user_has_submitted: bool,
  pub user_entry_id:      Option<Uuid>,
}
