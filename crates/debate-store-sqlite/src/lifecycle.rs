//! Debate open and close transactions.

use chrono::Utc;
use debate_core::{
  Error as CoreError,
  debate::{Debate, DebateStatus},
  lifecycle::{TOP_ENTRIES, select_winner},
  store::{CloseOutcome, CloseRequest},
};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior, params};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{decode_uuid, encode_dt, encode_uuid},
  error::is_unique_violation,
  queries,
};

// ─── Open ────────────────────────────────────────────────────────────────────

pub fn create_debate(conn: &mut Connection, topic: String, day_number: u32) -> Result<Debate> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let active: Option<(String, u32)> = tx
    .query_row(
      "SELECT debate_id, day_number FROM debates WHERE status = 'active'",
      [],
      |r| Ok((r.get(0)?, r.get(1)?)),
    )
    .optional()?;
  if let Some((debate_id, day)) = active {
    return Err(
      CoreError::ActiveDebateExists { debate_id: decode_uuid(&debate_id)?, day_number: day }
        .into(),
    );
  }

  if queries::next_day_number(&tx)? != day_number {
    return Err(CoreError::DayNumberTaken(day_number).into());
  }

  let debate = Debate {
    debate_id: Uuid::new_v4(),
    topic,
    day_number,
    status: DebateStatus::Active,
    created_at: Utc::now(),
    closed_at: None,
    winning_entry_id: None,
    winner_commentary: None,
  };
  let inserted = tx.execute(
    "INSERT INTO debates (debate_id, topic, day_number, status, created_at)
     VALUES (?1, ?2, ?3, 'active', ?4)",
    params![
      encode_uuid(debate.debate_id),
      debate.topic,
      debate.day_number,
      encode_dt(debate.created_at),
    ],
  );
  match inserted {
    Ok(_) => {}
    Err(e) if is_unique_violation(&e) => {
      return Err(CoreError::DayNumberTaken(day_number).into());
    }
    Err(e) => return Err(e.into()),
  }

  tx.commit()?;
  Ok(debate)
}

// ─── Close ───────────────────────────────────────────────────────────────────

/// Select the winner, credit the winner's author and mark the debate closed,
/// all in one transaction.
///
/// The winner is re-derived from the rows seen under the write lock. If it
/// differs from `request.expected_winner` the commentary (written for the
/// expected winner) is dropped rather than attached to the wrong entry.
pub fn finalize_close(conn: &mut Connection, request: CloseRequest) -> Result<CloseOutcome> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
  let debate_id = request.debate_id;

  let debate = queries::debate_by_id(&tx, debate_id)?
    .ok_or(CoreError::DebateNotFound(debate_id))?;
  if !debate.is_active() {
    return Err(CoreError::DebateNotActive(debate_id).into());
  }

  let ranked = queries::standings(&tx, debate_id, None)?;
  let winner = select_winner(ranked.iter().map(|s| &s.entry));
  let winner_id = winner.map(|e| e.entry_id);

  let commentary = match winner_id {
    Some(_) if winner_id == request.expected_winner => request.commentary.clone(),
    _ => None,
  };
  let commentary_discarded = request.commentary.is_some() && commentary.is_none();

  if let Some(entry) = winner {
    let credited = tx.execute(
      "UPDATE users SET wins_count = wins_count + 1 WHERE user_id = ?1",
      params![entry.user_id.as_str()],
    )?;
    if credited != 1 {
      return Err(Error::Decode(format!(
        "winning entry {} has no author row",
        entry.entry_id
      )));
    }
  }

  let closed = tx.execute(
    "UPDATE debates
     SET status = 'closed', closed_at = ?2, winning_entry_id = ?3, winner_commentary = ?4
     WHERE debate_id = ?1 AND status = 'active'",
    params![
      encode_uuid(debate_id),
      encode_dt(Utc::now()),
      winner_id.map(encode_uuid),
      commentary,
    ],
  )?;
  if closed != 1 {
    return Err(CoreError::DebateNotActive(debate_id).into());
  }

  let summary = queries::summary(&tx, debate_id)?.ok_or(CoreError::DebateNotFound(debate_id))?;
  tx.commit()?;

  let top_entries = ranked.into_iter().take(TOP_ENTRIES).collect();
  Ok(CloseOutcome { summary, top_entries, commentary_discarded })
}
