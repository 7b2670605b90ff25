//! [`SqliteStore`] — the SQLite implementation of [`DebateStore`].

use std::path::Path;

use debate_core::{
  debate::{Debate, DebateSummary},
  entry::{DebateBoard, Entry, NewEntry, Standing},
  store::{CloseOutcome, CloseRequest, DebateStore},
  user::{LeaderboardEntry, UserId, UserProfile},
  vote::{CountDrift, Vote, VoteReceipt},
};
use rusqlite::Connection;
use uuid::Uuid;

use crate::{Error, Result, lifecycle, queries, schema::SCHEMA, votes};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A debate store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All clones
/// share one connection thread, so writes are serialised even before SQLite's
/// own locking applies.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the connection thread, keeping its own error type.
  async fn run<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── DebateStore impl ────────────────────────────────────────────────────────

impl DebateStore for SqliteStore {
  type Error = Error;

  // ── Ledger ────────────────────────────────────────────────────────────────

  async fn cast_vote(&self, user: UserId, entry_id: Uuid) -> Result<VoteReceipt> {
    self.run(move |conn| votes::cast_vote(conn, &user, entry_id)).await
  }

  async fn retract_vote(&self, user: UserId, entry_id: Uuid) -> Result<VoteReceipt> {
    self.run(move |conn| votes::retract_vote(conn, &user, entry_id)).await
  }

  async fn live_vote(&self, user: UserId, debate_id: Uuid) -> Result<Option<Vote>> {
    self.run(move |conn| queries::live_vote(conn, &user, debate_id)).await
  }

  async fn insert_entry(&self, input: NewEntry) -> Result<Entry> {
    self.run(move |conn| votes::insert_entry(conn, input)).await
  }

  async fn get_entry(&self, entry_id: Uuid) -> Result<Option<Entry>> {
    self.run(move |conn| queries::get_entry(conn, entry_id)).await
  }

  async fn audit_vote_counts(&self, debate_id: Uuid) -> Result<Vec<CountDrift>> {
    self.run(move |conn| queries::count_drift(conn, debate_id)).await
  }

  // ── Lifecycle ─────────────────────────────────────────────────────────────

  async fn create_debate(&self, topic: String, day_number: u32) -> Result<Debate> {
    self
      .run(move |conn| lifecycle::create_debate(conn, topic, day_number))
      .await
  }

  async fn finalize_close(&self, request: CloseRequest) -> Result<CloseOutcome> {
    self.run(move |conn| lifecycle::finalize_close(conn, request)).await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_debate(&self, debate_id: Uuid) -> Result<Option<Debate>> {
    self.run(move |conn| queries::debate_by_id(conn, debate_id)).await
  }

  async fn active_debate(&self) -> Result<Option<Debate>> {
    self.run(|conn| queries::active_debate(conn)).await
  }

  async fn debate_by_day(&self, day_number: u32) -> Result<Option<Debate>> {
    self.run(move |conn| queries::debate_by_day(conn, day_number)).await
  }

  async fn next_day_number(&self) -> Result<u32> {
    self.run(|conn| queries::next_day_number(conn)).await
  }

  async fn debate_count(&self) -> Result<u32> {
    self.run(|conn| queries::debate_count(conn)).await
  }

  async fn previous_topics(&self) -> Result<Vec<String>> {
    self.run(|conn| queries::previous_topics(conn)).await
  }

  async fn standings(&self, debate_id: Uuid, limit: Option<usize>) -> Result<Vec<Standing>> {
    self
      .run(move |conn| queries::standings(conn, debate_id, limit))
      .await
  }

  async fn board(&self, debate_id: Uuid, viewer: Option<UserId>) -> Result<Option<DebateBoard>> {
    self
      .run(move |conn| queries::board(conn, debate_id, viewer.as_ref()))
      .await
  }

  async fn summary(&self, debate_id: Uuid) -> Result<Option<DebateSummary>> {
    self.run(move |conn| queries::summary(conn, debate_id)).await
  }

  async fn history(&self) -> Result<Vec<DebateSummary>> {
    self.run(|conn| queries::history(conn)).await
  }

  async fn profile(&self, user: UserId) -> Result<UserProfile> {
    self.run(move |conn| queries::profile(conn, &user)).await
  }

  async fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
    self.run(move |conn| queries::leaderboard(conn, limit)).await
  }
}
