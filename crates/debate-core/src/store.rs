//! The `DebateStore` trait and its request/outcome types.
//!
//! Implemented by storage backends (e.g. `debate-store-sqlite`). The ledger
//! and lifecycle services depend on this abstraction, not on any concrete
//! backend.
//!
//! Every write method is one atomic unit: either all of its row changes land
//! or none do. In particular the vote rows and the cached `vote_count` on
//! entries are only ever changed together.

use std::future::Future;

use uuid::Uuid;

use crate::{
  debate::{Debate, DebateSummary},
  entry::{DebateBoard, Entry, NewEntry, Standing},
  user::{LeaderboardEntry, UserId, UserProfile},
  vote::{CountDrift, Vote, VoteReceipt},
};

// ─── Close types ─────────────────────────────────────────────────────────────

/// Input to [`DebateStore::finalize_close`].
#[derive(Debug, Clone)]
pub struct CloseRequest {
  pub debate_id:       Uuid,
  /// The winner the commentary was written for, as seen before the
  /// transaction started.
  pub expected_winner: Option<Uuid>,
  pub commentary:      Option<String>,
}

/// Everything the close transaction produced.
#[derive(Debug, Clone)]
pub struct CloseOutcome {
  pub summary:              DebateSummary,
  /// Approved entries ranked at close time, at most five.
  pub top_entries:          Vec<Standing>,
  /// The winner changed between the commentary call and the transaction,
  /// so the commentary was not recorded.
  pub commentary_discarded: bool,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a debate store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DebateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  // ── Ledger ────────────────────────────────────────────────────────────

  /// Cast `user`'s vote for `entry_id`, moving any vote the user holds on
  /// another entry of the same debate.
  ///
  /// Fails with `EntryNotFound`, `DebateNotActive` or `AlreadyVoted`. A
  /// concurrent duplicate insert also surfaces as `AlreadyVoted`.
  fn cast_vote(
    &self,
    user: UserId,
    entry_id: Uuid,
  ) -> impl Future<Output = Result<VoteReceipt, Self::Error>> + Send + '_;

  /// Withdraw `user`'s vote for `entry_id`.
  ///
  /// Fails with `EntryNotFound`, `DebateNotActive` or `VoteNotFound`.
  fn retract_vote(
    &self,
    user: UserId,
    entry_id: Uuid,
  ) -> impl Future<Output = Result<VoteReceipt, Self::Error>> + Send + '_;

  /// The vote `user` currently holds in `debate_id`, if any.
  fn live_vote(
    &self,
    user: UserId,
    debate_id: Uuid,
  ) -> impl Future<Output = Result<Option<Vote>, Self::Error>> + Send + '_;

  /// Persist an approved entry. Fails with `DebateNotActive` if the debate
  /// closed in the meantime.
  fn insert_entry(
    &self,
    input: NewEntry,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  fn get_entry(
    &self,
    entry_id: Uuid,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send + '_;

  /// Recount live votes for every entry of `debate_id` and report entries
  /// whose cached counter disagrees. Empty when the ledger is consistent.
  fn audit_vote_counts(
    &self,
    debate_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CountDrift>, Self::Error>> + Send + '_;

  // ── Lifecycle ─────────────────────────────────────────────────────────

  /// Create the next active debate.
  ///
  /// Fails with `ActiveDebateExists` if any debate is active, and with
  /// `DayNumberTaken` if `day_number` is not exactly one past the maximum.
  fn create_debate(
    &self,
    topic: String,
    day_number: u32,
  ) -> impl Future<Output = Result<Debate, Self::Error>> + Send + '_;

  /// Close `request.debate_id` in one transaction: select the winner, bump
  /// the winner's win counter and record the closed state.
  ///
  /// Fails with `DebateNotFound` or `DebateNotActive`.
  fn finalize_close(
    &self,
    request: CloseRequest,
  ) -> impl Future<Output = Result<CloseOutcome, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_debate(
    &self,
    debate_id: Uuid,
  ) -> impl Future<Output = Result<Option<Debate>, Self::Error>> + Send + '_;

  fn active_debate(
    &self,
  ) -> impl Future<Output = Result<Option<Debate>, Self::Error>> + Send + '_;

  fn debate_by_day(
    &self,
    day_number: u32,
  ) -> impl Future<Output = Result<Option<Debate>, Self::Error>> + Send + '_;

  /// One past the highest day number ever used; `1` for an empty store.
  fn next_day_number(
    &self,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  fn debate_count(
    &self,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Every topic used so far, newest first.
  fn previous_topics(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Approved entries of `debate_id` ranked by votes (desc), then creation
  /// time and insertion order (asc).
  fn standings(
    &self,
    debate_id: Uuid,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<Standing>, Self::Error>> + Send + '_;

  /// The ranked entries of `debate_id` annotated for `viewer`.
  fn board(
    &self,
    debate_id: Uuid,
    viewer: Option<UserId>,
  ) -> impl Future<Output = Result<Option<DebateBoard>, Self::Error>> + Send + '_;

  fn summary(
    &self,
    debate_id: Uuid,
  ) -> impl Future<Output = Result<Option<DebateSummary>, Self::Error>> + Send + '_;

  /// Summaries of every debate, newest day first.
  fn history(
    &self,
  ) -> impl Future<Output = Result<Vec<DebateSummary>, Self::Error>> + Send + '_;

  /// Stats, rank and entries of `user`; empty for unknown users.
  fn profile(
    &self,
    user: UserId,
  ) -> impl Future<Output = Result<UserProfile, Self::Error>> + Send + '_;

  /// Users with at least one win, most wins first.
  fn leaderboard(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, Self::Error>> + Send + '_;
}

// ─── Error lifting ───────────────────────────────────────────────────────────

/// Converts a backend result into the engine's [`crate::Result`].
pub trait Lift<T> {
  fn lift(self) -> crate::Result<T>;
}

impl<T, E: Into<crate::Error>> Lift<T> for Result<T, E> {
  fn lift(self) -> crate::Result<T> { self.map_err(Into::into) }
}
