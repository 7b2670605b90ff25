//! Debates, the daily unit of competition, and their summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  entry::Standing,
  user::{UserId, name_or_anonymous},
};

/// Lifecycle state of a debate. `Active → Closed` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateStatus {
  Active,
  Closed,
}

impl DebateStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Closed => "closed",
    }
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debate {
  pub debate_id:         Uuid,
  pub topic:             String,
  /// Unique and strictly increasing in creation order.
  pub day_number:        u32,
  pub status:            DebateStatus,
  pub created_at:        DateTime<Utc>,
  pub closed_at:         Option<DateTime<Utc>>,
  /// `None` until closed, and stays `None` when there were no entries.
  pub winning_entry_id:  Option<Uuid>,
  pub winner_commentary: Option<String>,
}

impl Debate {
  pub fn is_active(&self) -> bool { self.status == DebateStatus::Active }
}

/// The winning entry of a closed debate, or the leader of an open one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerDetail {
  pub entry_id:  Uuid,
  pub content:   String,
  pub user_id:   UserId,
  pub user_name: Option<String>,
  pub votes:     u32,
}

impl WinnerDetail {
  pub fn from_standing(standing: &Standing) -> Self {
    Self {
      entry_id:  standing.entry.entry_id,
      content:   standing.entry.content.clone(),
      user_id:   standing.entry.user_id.clone(),
      user_name: standing.author_name.clone(),
      votes:     standing.entry.vote_count,
    }
  }

  pub fn display_name(&self) -> &str {
    name_or_anonymous(self.user_name.as_deref())
  }
}

/// A debate with fresh totals. Returned by the close operation and by the
/// history reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSummary {
  #[serde(flatten)]
  pub debate:        Debate,
  pub total_entries: u32,
  /// Counted from live vote rows, not summed from the cached counters.
  pub total_votes:   u32,
  pub winner:        Option<WinnerDetail>,
}

/// What closing the active debate right now would produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosePreview {
  pub summary:          DebateSummary,
  pub top_entries:      Vec<Standing>,
  pub potential_winner: Option<WinnerDetail>,
}

/// Scheduler-facing status of the open side of the lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenStatus {
  pub active_debate:   Option<Debate>,
  pub total_debates:   u32,
  pub next_day_number: u32,
}
