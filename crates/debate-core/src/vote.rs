//! Votes and the receipts the ledger hands back for them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

/// A live vote. Unique on `(entry_id, user_id)`, and at most one per user
/// per debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
  pub vote_id:    Uuid,
  pub entry_id:   Uuid,
  pub debate_id:  Uuid,
  pub user_id:    UserId,
  pub created_at: DateTime<Utc>,
}

/// Result of a cast or retract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
  /// The newly created vote; `None` after a retraction.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub vote_id:           Option<Uuid>,
  pub entry_id:          Uuid,
  pub vote_count:        u32,
  pub has_voted:         bool,
  /// Set when casting moved the user's vote away from another entry.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub previous_entry_id: Option<Uuid>,
}

impl VoteReceipt {
  pub fn is_switch(&self) -> bool { self.previous_entry_id.is_some() }
}

/// An entry whose cached vote count disagrees with its live vote rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountDrift {
  pub entry_id: Uuid,
  pub cached:   i64,
  pub actual:   i64,
}
