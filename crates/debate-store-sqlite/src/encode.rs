//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision, so lexical order matches chronological order. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use debate_core::{
  debate::{Debate, DebateStatus},
  entry::{Entry, Standing},
  user::{ProfileEntry, UserId, UserRecord},
  vote::Vote,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_user_id(s: &str) -> Result<UserId> {
  UserId::new(s).ok_or_else(|| Error::Decode("blank user_id".into()))
}

pub fn decode_count(n: i64, column: &str) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::Decode(format!("{column} out of range: {n}")))
}

pub fn decode_status(s: &str) -> Result<DebateStatus> {
  match s {
    "active" => Ok(DebateStatus::Active),
    "closed" => Ok(DebateStatus::Closed),
    other => Err(Error::Decode(format!("unknown debate status: {other:?}"))),
  }
}

// ─── Debate ──────────────────────────────────────────────────────────────────

pub const DEBATE_COLUMNS: &str = "d.debate_id, d.topic, d.day_number, d.status, d.created_at, \
   d.closed_at, d.winning_entry_id, d.winner_commentary";

/// Raw column values for a `debates` row, as read from SQLite.
pub struct RawDebate {
  pub debate_id:         String,
  pub topic:             String,
  pub day_number:        i64,
  pub status:            String,
  pub created_at:        String,
  pub closed_at:         Option<String>,
  pub winning_entry_id:  Option<String>,
  pub winner_commentary: Option<String>,
}

impl RawDebate {
  /// Reads the columns listed in [`DEBATE_COLUMNS`].
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      debate_id:         row.get(0)?,
      topic:             row.get(1)?,
      day_number:        row.get(2)?,
      status:            row.get(3)?,
      created_at:        row.get(4)?,
      closed_at:         row.get(5)?,
      winning_entry_id:  row.get(6)?,
      winner_commentary: row.get(7)?,
    })
  }

  pub fn into_debate(self) -> Result<Debate> {
    Ok(Debate {
      debate_id:         decode_uuid(&self.debate_id)?,
      topic:             self.topic,
      day_number:        decode_count(self.day_number, "day_number")?,
      status:            decode_status(&self.status)?,
      created_at:        decode_dt(&self.created_at)?,
      closed_at:         self.closed_at.as_deref().map(decode_dt).transpose()?,
      winning_entry_id:  self
        .winning_entry_id
        .as_deref()
        .map(decode_uuid)
        .transpose()?,
      winner_commentary: self.winner_commentary,
    })
  }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// Entry columns plus the author's display name; callers must
/// `LEFT JOIN users u ON u.user_id = e.user_id`.
pub const STANDING_COLUMNS: &str = "e.entry_id, e.debate_id, e.user_id, e.content, e.approved, \
   e.vote_count, e.created_at, u.display_name";

pub struct RawStanding {
  pub entry_id:    String,
  pub debate_id:   String,
  pub user_id:     String,
  pub content:     String,
  pub approved:    bool,
  pub vote_count:  i64,
  pub created_at:  String,
  pub author_name: Option<String>,
}

impl RawStanding {
  /// Reads the columns listed in [`STANDING_COLUMNS`].
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:    row.get(0)?,
      debate_id:   row.get(1)?,
      user_id:     row.get(2)?,
      content:     row.get(3)?,
      approved:    row.get(4)?,
      vote_count:  row.get(5)?,
      created_at:  row.get(6)?,
      author_name: row.get(7)?,
    })
  }

  pub fn into_standing(self) -> Result<Standing> {
    Ok(Standing {
      entry:       Entry {
        entry_id:   decode_uuid(&self.entry_id)?,
        debate_id:  decode_uuid(&self.debate_id)?,
        user_id:    decode_user_id(&self.user_id)?,
        content:    self.content,
        approved:   self.approved,
        vote_count: decode_count(self.vote_count, "vote_count")?,
        created_at: decode_dt(&self.created_at)?,
      },
      author_name: self.author_name,
    })
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "user_id, display_name, wins_count, created_at";

pub struct RawUser {
  pub user_id:      String,
  pub display_name: Option<String>,
  pub wins_count:   i64,
  pub created_at:   String,
}

impl RawUser {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:      row.get(0)?,
      display_name: row.get(1)?,
      wins_count:   row.get(2)?,
      created_at:   row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<UserRecord> {
    Ok(UserRecord {
      user_id:      decode_user_id(&self.user_id)?,
      display_name: self.display_name,
      wins_count:   decode_count(self.wins_count, "wins_count")?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// An entry as listed on its author's profile; callers must
/// `JOIN debates d ON d.debate_id = e.debate_id`.
pub const PROFILE_ENTRY_COLUMNS: &str = "e.entry_id, e.debate_id, d.topic, d.day_number, \
   e.content, e.vote_count, COALESCE(d.winning_entry_id = e.entry_id, 0), e.created_at";

pub struct RawProfileEntry {
  pub entry_id:   String,
  pub debate_id:  String,
  pub topic:      String,
  pub day_number: i64,
  pub content:    String,
  pub vote_count: i64,
  pub is_winner:  bool,
  pub created_at: String,
}

impl RawProfileEntry {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:   row.get(0)?,
      debate_id:  row.get(1)?,
      topic:      row.get(2)?,
      day_number: row.get(3)?,
      content:    row.get(4)?,
      vote_count: row.get(5)?,
      is_winner:  row.get(6)?,
      created_at: row.get(7)?,
    })
  }

  pub fn into_profile_entry(self) -> Result<ProfileEntry> {
    Ok(ProfileEntry {
      entry_id:   decode_uuid(&self.entry_id)?,
      debate_id:  decode_uuid(&self.debate_id)?,
      topic:      self.topic,
      day_number: decode_count(self.day_number, "day_number")?,
      content:    self.content,
      vote_count: decode_count(self.vote_count, "vote_count")?,
      is_winner:  self.is_winner,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

// ─── Vote ────────────────────────────────────────────────────────────────────

pub const VOTE_COLUMNS: &str = "vote_id, entry_id, debate_id, user_id, created_at";

pub struct RawVote {
  pub vote_id:    String,
  pub entry_id:   String,
  pub debate_id:  String,
  pub user_id:    String,
  pub created_at: String,
}

impl RawVote {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vote_id:    row.get(0)?,
      entry_id:   row.get(1)?,
      debate_id:  row.get(2)?,
      user_id:    row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      vote_id:    decode_uuid(&self.vote_id)?,
      entry_id:   decode_uuid(&self.entry_id)?,
      debate_id:  decode_uuid(&self.debate_id)?,
      user_id:    decode_user_id(&self.user_id)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let a = Utc.with_ymd_and_hms(2025, 1, 9, 23, 59, 59).unwrap();
    let b = a + chrono::Duration::microseconds(1);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn unknown_status_is_a_decode_error() {
    assert!(matches!(decode_status("archived"), Err(Error::Decode(_))));
  }
}
