//! Read queries shared by the store's read methods and its write
//! transactions (a `Transaction` derefs to `Connection`).

use std::collections::HashSet;

use debate_core::{
  debate::{Debate, DebateSummary, WinnerDetail},
  entry::{BoardEntry, DebateBoard, Entry, Standing},
  user::{LeaderboardEntry, UserId, UserProfile, UserRecord},
  vote::{CountDrift, Vote},
};
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use crate::{
  Result,
  encode::{
    DEBATE_COLUMNS, PROFILE_ENTRY_COLUMNS, RawDebate, RawProfileEntry, RawStanding, RawUser,
    RawVote, STANDING_COLUMNS, USER_COLUMNS, VOTE_COLUMNS, decode_count, decode_uuid,
    encode_uuid,
  },
};

// ─── Debates ─────────────────────────────────────────────────────────────────

pub fn debate_by_id(conn: &Connection, debate_id: Uuid) -> Result<Option<Debate>> {
  let sql = format!("SELECT {DEBATE_COLUMNS} FROM debates d WHERE d.debate_id = ?1");
  conn
    .query_row(&sql, params![encode_uuid(debate_id)], RawDebate::read)
    .optional()?
    .map(RawDebate::into_debate)
    .transpose()
}

pub fn active_debate(conn: &Connection) -> Result<Option<Debate>> {
  let sql = format!("SELECT {DEBATE_COLUMNS} FROM debates d WHERE d.status = 'active'");
  conn
    .query_row(&sql, [], RawDebate::read)
    .optional()?
    .map(RawDebate::into_debate)
    .transpose()
}

pub fn debate_by_day(conn: &Connection, day_number: u32) -> Result<Option<Debate>> {
  let sql = format!("SELECT {DEBATE_COLUMNS} FROM debates d WHERE d.day_number = ?1");
  conn
    .query_row(&sql, params![day_number], RawDebate::read)
    .optional()?
    .map(RawDebate::into_debate)
    .transpose()
}

/// All debates, newest day first.
pub fn all_debates(conn: &Connection) -> Result<Vec<Debate>> {
  let sql = format!("SELECT {DEBATE_COLUMNS} FROM debates d ORDER BY d.day_number DESC");
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map([], RawDebate::read)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawDebate::into_debate).collect()
}

pub fn next_day_number(conn: &Connection) -> Result<u32> {
  let next: i64 = conn.query_row(
    "SELECT COALESCE(MAX(day_number), 0) + 1 FROM debates",
    [],
    |r| r.get(0),
  )?;
  decode_count(next, "day_number")
}

pub fn debate_count(conn: &Connection) -> Result<u32> {
  let n: i64 = conn.query_row("SELECT COUNT(*) FROM debates", [], |r| r.get(0))?;
  decode_count(n, "debate count")
}

pub fn previous_topics(conn: &Connection) -> Result<Vec<String>> {
  let mut stmt = conn.prepare("SELECT topic FROM debates ORDER BY day_number DESC")?;
  let topics = stmt
    .query_map([], |r| r.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(topics)
}

// ─── Entries ─────────────────────────────────────────────────────────────────

pub fn entry_standing(conn: &Connection, entry_id: Uuid) -> Result<Option<Standing>> {
  let sql = format!(
    "SELECT {STANDING_COLUMNS} FROM entries e
     LEFT JOIN users u ON u.user_id = e.user_id
     WHERE e.entry_id = ?1"
  );
  conn
    .query_row(&sql, params![encode_uuid(entry_id)], RawStanding::read)
    .optional()?
    .map(RawStanding::into_standing)
    .transpose()
}

pub fn get_entry(conn: &Connection, entry_id: Uuid) -> Result<Option<Entry>> {
  Ok(entry_standing(conn, entry_id)?.map(|s| s.entry))
}

/// Approved entries ranked by votes (desc), then creation time and insertion
/// order (asc). The first row is the entry `select_winner` would pick.
pub fn standings(
  conn: &Connection,
  debate_id: Uuid,
  limit: Option<usize>,
) -> Result<Vec<Standing>> {
  // SQLite treats a negative LIMIT as "no limit".
  let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
  let sql = format!(
    "SELECT {STANDING_COLUMNS} FROM entries e
     LEFT JOIN users u ON u.user_id = e.user_id
     WHERE e.debate_id = ?1 AND e.approved = 1
     ORDER BY e.vote_count DESC, e.created_at ASC, e.rowid ASC
     LIMIT ?2"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params![encode_uuid(debate_id), limit], RawStanding::read)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawStanding::into_standing).collect()
}

/// Cached counters that disagree with the live vote rows.
pub fn count_drift(conn: &Connection, debate_id: Uuid) -> Result<Vec<CountDrift>> {
  let mut stmt = conn.prepare(
    "SELECT entry_id, cached, actual FROM (
       SELECT e.entry_id AS entry_id,
              e.vote_count AS cached,
              (SELECT COUNT(*) FROM votes v WHERE v.entry_id = e.entry_id) AS actual,
              e.rowid AS seq
       FROM entries e
       WHERE e.debate_id = ?1
     )
     WHERE cached != actual
     ORDER BY seq",
  )?;
  let rows = stmt
    .query_map(params![encode_uuid(debate_id)], |r| {
      Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?, r.get::<_, i64>(2)?))
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  rows
    .into_iter()
    .map(|(id, cached, actual)| {
      Ok(CountDrift { entry_id: decode_uuid(&id)?, cached, actual })
    })
    .collect()
}

// ─── Votes ───────────────────────────────────────────────────────────────────

pub fn live_vote(conn: &Connection, user: &UserId, debate_id: Uuid) -> Result<Option<Vote>> {
  let sql = format!("SELECT {VOTE_COLUMNS} FROM votes WHERE debate_id = ?1 AND user_id = ?2");
  conn
    .query_row(&sql, params![encode_uuid(debate_id), user.as_str()], RawVote::read)
    .optional()?
    .map(RawVote::into_vote)
    .transpose()
}

// ─── Summaries and boards ────────────────────────────────────────────────────

/// Totals are recomputed from the rows rather than trusted from counters.
pub fn summarize(conn: &Connection, debate: Debate) -> Result<DebateSummary> {
  let id = encode_uuid(debate.debate_id);

  let total_entries: i64 = conn.query_row(
    "SELECT COUNT(*) FROM entries WHERE debate_id = ?1",
    params![id],
    |r| r.get(0),
  )?;
  let total_votes: i64 = conn.query_row(
    "SELECT COUNT(*) FROM votes v
     JOIN entries e ON e.entry_id = v.entry_id
     WHERE e.debate_id = ?1",
    params![id],
    |r| r.get(0),
  )?;

  let winner = match debate.winning_entry_id {
    Some(entry_id) => entry_standing(conn, entry_id)?
      .as_ref()
      .map(WinnerDetail::from_standing),
    None => None,
  };

  Ok(DebateSummary {
    debate,
    total_entries: decode_count(total_entries, "total_entries")?,
    total_votes: decode_count(total_votes, "total_votes")?,
    winner,
  })
}

pub fn summary(conn: &Connection, debate_id: Uuid) -> Result<Option<DebateSummary>> {
  debate_by_id(conn, debate_id)?
    .map(|d| summarize(conn, d))
    .transpose()
}

pub fn history(conn: &Connection) -> Result<Vec<DebateSummary>> {
  all_debates(conn)?
    .into_iter()
    .map(|d| summarize(conn, d))
    .collect()
}

pub fn board(
  conn: &Connection,
  debate_id: Uuid,
  viewer: Option<&UserId>,
) -> Result<Option<DebateBoard>> {
  let Some(debate) = debate_by_id(conn, debate_id)? else {
    return Ok(None);
  };
  let ranked = standings(conn, debate_id, None)?;

  let voted: HashSet<Uuid> = match viewer {
    Some(user) => {
      let mut stmt =
        conn.prepare("SELECT entry_id FROM votes WHERE debate_id = ?1 AND user_id = ?2")?;
      let ids = stmt
        .query_map(params![encode_uuid(debate_id), user.as_str()], |r| {
          r.get::<_, String>(0)
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
      ids.iter().map(|s| decode_uuid(s)).collect::<Result<_>>()?
    }
    None => HashSet::new(),
  };

  let user_entry_id = viewer.and_then(|user| {
    ranked
      .iter()
      .find(|s| &s.entry.user_id == user)
      .map(|s| s.entry.entry_id)
  });

  let entries = ranked
    .into_iter()
    .map(|standing| BoardEntry {
      has_voted: voted.contains(&standing.entry.entry_id),
      is_own_entry: viewer.is_some_and(|u| &standing.entry.user_id == u),
      standing,
    })
    .collect();

  Ok(Some(DebateBoard {
    debate,
    entries,
    user_has_submitted: user_entry_id.is_some(),
    user_entry_id,
  }))
}

// ─── Users ───────────────────────────────────────────────────────────────────

pub fn get_user(conn: &Connection, user: &UserId) -> Result<Option<UserRecord>> {
  let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1");
  conn
    .query_row(&sql, params![user.as_str()], RawUser::read)
    .optional()?
    .map(RawUser::into_user)
    .transpose()
}

/// Wins, fresh vote totals, rank and entries of `user`.
pub fn profile(conn: &Connection, user: &UserId) -> Result<UserProfile> {
  let Some(record) = get_user(conn, user)? else {
    return Ok(UserProfile::empty(user.clone()));
  };

  let sql = format!(
    "SELECT {PROFILE_ENTRY_COLUMNS} FROM entries e
     JOIN debates d ON d.debate_id = e.debate_id
     WHERE e.user_id = ?1
     ORDER BY e.created_at DESC, e.rowid DESC"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(params![user.as_str()], RawProfileEntry::read)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  let entries = raws
    .into_iter()
    .map(RawProfileEntry::into_profile_entry)
    .collect::<Result<Vec<_>>>()?;

  let total_votes: i64 = conn.query_row(
    "SELECT COUNT(*) FROM votes v
     JOIN entries e ON e.entry_id = v.entry_id
     WHERE e.user_id = ?1",
    params![user.as_str()],
    |r| r.get(0),
  )?;

  let rank = if record.wins_count > 0 {
    let ahead: i64 = conn.query_row(
      "SELECT COUNT(*) FROM users WHERE wins_count > ?1",
      params![record.wins_count],
      |r| r.get(0),
    )?;
    Some(decode_count(ahead + 1, "rank")?)
  } else {
    None
  };

  Ok(UserProfile {
    user_id: record.user_id,
    display_name: record.display_name,
    wins_count: record.wins_count,
    total_entries: u32::try_from(entries.len()).unwrap_or(u32::MAX),
    total_votes: decode_count(total_votes, "total_votes")?,
    rank,
    entries,
  })
}

/// Winners ranked by wins, each with the votes received across all of
/// their entries.
pub fn leaderboard(conn: &Connection, limit: usize) -> Result<Vec<LeaderboardEntry>> {
  let limit = i64::try_from(limit).unwrap_or(i64::MAX);
  let mut stmt = conn.prepare(
    "SELECT u.user_id, u.display_name, u.wins_count, u.created_at, COUNT(v.vote_id)
     FROM users u
     LEFT JOIN entries e ON e.user_id = u.user_id
     LEFT JOIN votes v ON v.entry_id = e.entry_id
     WHERE u.wins_count > 0
     GROUP BY u.user_id
     ORDER BY u.wins_count DESC, u.created_at ASC, u.user_id ASC
     LIMIT ?1",
  )?;
  let raws = stmt
    .query_map(params![limit], |r| Ok((RawUser::read(r)?, r.get::<_, i64>(4)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws
    .into_iter()
    .map(|(raw, votes)| {
      Ok(LeaderboardEntry {
        user:        raw.into_user()?,
        total_votes: decode_count(votes, "total_votes")?,
      })
    })
    .collect()
}
