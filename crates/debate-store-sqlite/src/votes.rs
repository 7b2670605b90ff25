//! Vote and entry write transactions.
//!
//! Each function opens one `BEGIN IMMEDIATE` transaction, so the write lock
//! is taken before the first read and the checks it makes cannot go stale
//! before commit. Vote rows and `entries.vote_count` only change together.

use chrono::Utc;
use debate_core::{
  Error as CoreError,
  entry::{Entry, NewEntry},
  user::UserId,
  vote::VoteReceipt,
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{decode_count, decode_uuid, encode_dt, encode_uuid},
  error::is_unique_violation,
};

/// The debate an entry belongs to and that debate's status.
fn entry_debate(conn: &Connection, entry_id: &str) -> Result<Option<(String, String)>> {
  Ok(
    conn
      .query_row(
        "SELECT d.debate_id, d.status FROM entries e
         JOIN debates d ON d.debate_id = e.debate_id
         WHERE e.entry_id = ?1",
        params![entry_id],
        |r| Ok((r.get(0)?, r.get(1)?)),
      )
      .optional()?,
  )
}

/// Resolve `entry_id` to its debate, rejecting unknown entries and closed
/// debates.
fn open_entry_debate(conn: &Connection, entry_id: Uuid, entry_str: &str) -> Result<String> {
  let (debate_id, status) =
    entry_debate(conn, entry_str)?.ok_or(CoreError::EntryNotFound(entry_id))?;
  if status != "active" {
    return Err(CoreError::DebateNotActive(decode_uuid(&debate_id)?).into());
  }
  Ok(debate_id)
}

fn adjust_count(conn: &Connection, entry_id: &str, delta: i64) -> Result<u32> {
  conn.execute(
    "UPDATE entries SET vote_count = vote_count + ?2 WHERE entry_id = ?1",
    params![entry_id, delta],
  )?;
  let count: i64 = conn.query_row(
    "SELECT vote_count FROM entries WHERE entry_id = ?1",
    params![entry_id],
    |r| r.get(0),
  )?;
  decode_count(count, "vote_count")
}

// ─── Cast ────────────────────────────────────────────────────────────────────

pub fn cast_vote(conn: &mut Connection, user: &UserId, entry_id: Uuid) -> Result<VoteReceipt> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let entry_str = encode_uuid(entry_id);
  let debate_id = open_entry_debate(&tx, entry_id, &entry_str)?;

  let already: bool = tx
    .query_row(
      "SELECT 1 FROM votes WHERE entry_id = ?1 AND user_id = ?2",
      params![entry_str, user.as_str()],
      |_| Ok(true),
    )
    .optional()?
    .unwrap_or(false);
  if already {
    return Err(CoreError::AlreadyVoted(entry_id).into());
  }

  // A vote elsewhere in the same debate moves rather than duplicates.
  let previous: Option<(String, String)> = tx
    .query_row(
      "SELECT vote_id, entry_id FROM votes WHERE debate_id = ?1 AND user_id = ?2",
      params![debate_id, user.as_str()],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()?;
  let previous_entry_id = match previous {
    Some((vote_id, prev_entry)) => {
      tx.execute("DELETE FROM votes WHERE vote_id = ?1", params![vote_id])?;
      adjust_count(&tx, &prev_entry, -1)?;
      Some(decode_uuid(&prev_entry)?)
    }
    None => None,
  };

  let vote_id = Uuid::new_v4();
  let inserted = tx.execute(
    "INSERT INTO votes (vote_id, entry_id, debate_id, user_id, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      encode_uuid(vote_id),
      entry_str,
      debate_id,
      user.as_str(),
      encode_dt(Utc::now()),
    ],
  );
  match inserted {
    Ok(_) => {}
    Err(e) if is_unique_violation(&e) => {
      return Err(CoreError::AlreadyVoted(entry_id).into());
    }
    Err(e) => return Err(e.into()),
  }
  let vote_count = adjust_count(&tx, &entry_str, 1)?;

  tx.commit()?;
  Ok(VoteReceipt {
    vote_id: Some(vote_id),
    entry_id,
    vote_count,
    has_voted: true,
    previous_entry_id,
  })
}

// ─── Retract ─────────────────────────────────────────────────────────────────

pub fn retract_vote(
  conn: &mut Connection,
  user: &UserId,
  entry_id: Uuid,
) -> Result<VoteReceipt> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let entry_str = encode_uuid(entry_id);
  open_entry_debate(&tx, entry_id, &entry_str)?;

  let removed = tx.execute(
    "DELETE FROM votes WHERE entry_id = ?1 AND user_id = ?2",
    params![entry_str, user.as_str()],
  )?;
  if removed == 0 {
    return Err(CoreError::VoteNotFound(entry_id).into());
  }
  let vote_count = adjust_count(&tx, &entry_str, -1)?;

  tx.commit()?;
  Ok(VoteReceipt {
    vote_id: None,
    entry_id,
    vote_count,
    has_voted: false,
    previous_entry_id: None,
  })
}

// ─── Entries ─────────────────────────────────────────────────────────────────

/// Insert an approved entry, refreshing the author's display name.
pub fn insert_entry(conn: &mut Connection, input: NewEntry) -> Result<Entry> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let debate_str = encode_uuid(input.debate_id);

  let status: Option<String> = tx
    .query_row(
      "SELECT status FROM debates WHERE debate_id = ?1",
      params![debate_str],
      |r| r.get(0),
    )
    .optional()?;
  match status.as_deref() {
    None => return Err(CoreError::DebateNotFound(input.debate_id).into()),
    Some("active") => {}
    Some(_) => return Err(CoreError::DebateNotActive(input.debate_id).into()),
  }

  let now = Utc::now();
  let now_str = encode_dt(now);
  tx.execute(
    "INSERT INTO users (user_id, display_name, wins_count, created_at)
     VALUES (?1, ?2, 0, ?3)
     ON CONFLICT(user_id) DO UPDATE
       SET display_name = COALESCE(excluded.display_name, users.display_name)",
    params![input.user_id.as_str(), input.author_name, now_str],
  )?;

  let entry = Entry {
    entry_id:   Uuid::new_v4(),
    debate_id:  input.debate_id,
    user_id:    input.user_id,
    content:    input.content,
    approved:   true,
    vote_count: 0,
    created_at: now,
  };
  tx.execute(
    "INSERT INTO entries
       (entry_id, debate_id, user_id, content, approved, vote_count, created_at)
     VALUES (?1, ?2, ?3, ?4, 1, 0, ?5)",
    params![
      encode_uuid(entry.entry_id),
      debate_str,
      entry.user_id.as_str(),
      entry.content,
      now_str,
    ],
  )?;

  tx.commit()?;
  Ok(entry)
}
