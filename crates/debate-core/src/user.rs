//! Users as seen by the engine: an opaque identity plus a win counter.
//!
//! Authentication happens elsewhere. The engine only ever receives a stable
//! identifier (and optionally a display name) from the identity provider.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable, opaque user identifier supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
  /// Returns `None` for blank identifiers.
  pub fn new(raw: &str) -> Option<Self> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// The caller of a request, as asserted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub user_id:      UserId,
  pub display_name: Option<String>,
}

impl Identity {
  pub fn new(user_id: UserId) -> Self {
    Self { user_id, display_name: None }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.display_name = Some(name.into());
    self
  }
}

/// The persisted projection of a user owned by this engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
  pub user_id:      UserId,
  pub display_name: Option<String>,
  /// Incremented exactly once per debate the user wins.
  pub wins_count:   u32,
  pub created_at:   DateTime<Utc>,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  #[serde(flatten)]
  pub user:        UserRecord,
  /// Votes received across all of the user's entries, counted from the
  /// live vote rows.
  pub total_votes: u32,
}

/// A user's record across every debate.
///
/// Users the store has never seen get an empty profile rather than an
/// error: voters have no row until they submit an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
  pub user_id:       UserId,
  pub display_name:  Option<String>,
  pub wins_count:    u32,
  pub total_entries: u32,
  pub total_votes:   u32,
  /// One more than the number of users with strictly more wins; `None`
  /// until the user has won once.
  pub rank:          Option<u32>,
  /// Newest first.
  pub entries:       Vec<ProfileEntry>,
}

impl UserProfile {
  pub fn empty(user_id: UserId) -> Self {
    Self {
      user_id,
      display_name: None,
      wins_count: 0,
      total_entries: 0,
      total_votes: 0,
      rank: None,
      entries: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEntry {
  pub entry_id:   Uuid,
  pub debate_id:  Uuid,
  pub topic:      String,
  pub day_number: u32,
  pub content:    String,
  pub vote_count: u32,
  pub is_winner:  bool,
  pub created_at: DateTime<Utc>,
}

/// Name shown for users who never supplied one.
pub fn name_or_anonymous(name: Option<&str>) -> &str {
  match name {
    Some(n) if !n.trim().is_empty() => n,
    _ => "Anonymous",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_user_ids_are_rejected() {
    assert!(UserId::new("").is_none());
    assert!(UserId::new("   ").is_none());
    assert_eq!(UserId::new(" u-1 ").unwrap().as_str(), "u-1");
  }

  #[test]
  fn anonymous_fallback() {
    assert_eq!(name_or_anonymous(None), "Anonymous");
    assert_eq!(name_or_anonymous(Some("  ")), "Anonymous");
    assert_eq!(name_or_anonymous(Some("Ada")), "Ada");
  }
}
