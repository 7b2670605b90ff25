//! Integration tests for `SqliteStore` against an in-memory database.

use debate_core::{
  Error as CoreError,
  debate::DebateStatus,
  entry::{Entry, NewEntry},
  store::{CloseRequest, DebateStore},
  user::UserId,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn uid(raw: &str) -> UserId { UserId::new(raw).unwrap() }

async fn open_day(s: &SqliteStore, topic: &str) -> Uuid {
  let day = s.next_day_number().await.unwrap();
  s.create_debate(topic.into(), day).await.unwrap().debate_id
}

async fn submit(s: &SqliteStore, debate_id: Uuid, user: &str, text: &str) -> Entry {
  s.insert_entry(NewEntry {
    debate_id,
    user_id: uid(user),
    author_name: Some(format!("{user}-name")),
    content: text.into(),
  })
  .await
  .unwrap()
}

async fn close(s: &SqliteStore, debate_id: Uuid) -> debate_core::store::CloseOutcome {
  s.finalize_close(CloseRequest { debate_id, expected_winner: None, commentary: None })
    .await
    .unwrap()
}

// ─── Debates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_starts_at_day_one() {
  let s = store().await;
  assert_eq!(s.next_day_number().await.unwrap(), 1);
  assert_eq!(s.debate_count().await.unwrap(), 0);
  assert!(s.active_debate().await.unwrap().is_none());
}

#[tokio::test]
async fn only_one_debate_may_be_active() {
  let s = store().await;
  let first = open_day(&s, "Is cereal soup?").await;

  let err = s.create_debate("Second".into(), 2).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::ActiveDebateExists { debate_id, day_number: 1 }) if debate_id == first
  ));
}

#[tokio::test]
async fn day_numbers_must_follow_the_maximum() {
  let s = store().await;
  let first = open_day(&s, "One").await;
  close(&s, first).await;

  let err = s.create_debate("Skip".into(), 3).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DayNumberTaken(3))));
  let err = s.create_debate("Reuse".into(), 1).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DayNumberTaken(1))));

  let second = s.create_debate("Two".into(), 2).await.unwrap();
  assert_eq!(second.day_number, 2);
  assert_eq!(s.previous_topics().await.unwrap(), vec!["Two", "One"]);
}

#[tokio::test]
async fn debate_lookup_by_day() {
  let s = store().await;
  let id = open_day(&s, "Pineapple on pizza").await;
  let found = s.debate_by_day(1).await.unwrap().unwrap();
  assert_eq!(found.debate_id, id);
  assert_eq!(found.status, DebateStatus::Active);
  assert!(s.debate_by_day(2).await.unwrap().is_none());
}

// ─── Entries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn entries_require_an_active_debate() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  close(&s, id).await;

  let err = s
    .insert_entry(NewEntry {
      debate_id:   id,
      user_id:     uid("u1"),
      author_name: None,
      content:     "late".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DebateNotActive(d)) if d == id));

  let missing = Uuid::new_v4();
  let err = s
    .insert_entry(NewEntry {
      debate_id:   missing,
      user_id:     uid("u1"),
      author_name: None,
      content:     "lost".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DebateNotFound(d)) if d == missing));
}

#[tokio::test]
async fn submitting_refreshes_display_name() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  submit(&s, id, "u1", "first").await;
  s.insert_entry(NewEntry {
    debate_id:   id,
    user_id:     uid("u1"),
    author_name: None,
    content:     "second".into(),
  })
  .await
  .unwrap();

  let user = s.profile(uid("u1")).await.unwrap();
  assert_eq!(user.display_name.as_deref(), Some("u1-name"));
  assert_eq!(user.wins_count, 0);
}

// ─── Votes ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cast_then_duplicate_is_rejected() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  let e = submit(&s, id, "author", "take").await;

  let receipt = s.cast_vote(uid("voter"), e.entry_id).await.unwrap();
  assert_eq!(receipt.vote_count, 1);
  assert!(receipt.has_voted);
  assert!(receipt.vote_id.is_some());
  assert!(!receipt.is_switch());

  let err = s.cast_vote(uid("voter"), e.entry_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::AlreadyVoted(x)) if x == e.entry_id));
  assert_eq!(s.get_entry(e.entry_id).await.unwrap().unwrap().vote_count, 1);
}

#[tokio::test]
async fn voting_for_another_entry_moves_the_vote() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  let a = submit(&s, id, "alice", "a").await;
  let b = submit(&s, id, "bob", "b").await;

  s.cast_vote(uid("v"), a.entry_id).await.unwrap();
  let receipt = s.cast_vote(uid("v"), b.entry_id).await.unwrap();
  assert_eq!(receipt.previous_entry_id, Some(a.entry_id));
  assert_eq!(receipt.vote_count, 1);

  assert_eq!(s.get_entry(a.entry_id).await.unwrap().unwrap().vote_count, 0);
  assert_eq!(s.get_entry(b.entry_id).await.unwrap().unwrap().vote_count, 1);

  let live = s.live_vote(uid("v"), id).await.unwrap().unwrap();
  assert_eq!(live.entry_id, b.entry_id);
  assert!(s.audit_vote_counts(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn retract_removes_the_vote_once() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  let e = submit(&s, id, "author", "take").await;

  s.cast_vote(uid("v"), e.entry_id).await.unwrap();
  let receipt = s.retract_vote(uid("v"), e.entry_id).await.unwrap();
  assert_eq!(receipt.vote_count, 0);
  assert!(!receipt.has_voted);

  let err = s.retract_vote(uid("v"), e.entry_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::VoteNotFound(x)) if x == e.entry_id));
  assert!(s.live_vote(uid("v"), id).await.unwrap().is_none());
}

#[tokio::test]
async fn votes_on_unknown_entries_fail() {
  let s = store().await;
  open_day(&s, "Topic").await;
  let ghost = Uuid::new_v4();
  let err = s.cast_vote(uid("v"), ghost).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::EntryNotFound(x)) if x == ghost));
}

#[tokio::test]
async fn closed_debates_reject_votes_and_retractions() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  let e = submit(&s, id, "author", "take").await;
  s.cast_vote(uid("v"), e.entry_id).await.unwrap();
  close(&s, id).await;

  let err = s.cast_vote(uid("w"), e.entry_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DebateNotActive(d)) if d == id));
  let err = s.retract_vote(uid("v"), e.entry_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DebateNotActive(d)) if d == id));
  assert_eq!(s.get_entry(e.entry_id).await.unwrap().unwrap().vote_count, 1);
}

// ─── Standings and boards ────────────────────────────────────────────────────

#[tokio::test]
async fn standings_break_ties_by_submission_order() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  let first = submit(&s, id, "alice", "first").await;
  let second = submit(&s, id, "bob", "second").await;
  let third = submit(&s, id, "carol", "third").await;

  s.cast_vote(uid("v1"), third.entry_id).await.unwrap();
  s.cast_vote(uid("v2"), third.entry_id).await.unwrap();
  s.cast_vote(uid("v3"), second.entry_id).await.unwrap();
  s.cast_vote(uid("v4"), first.entry_id).await.unwrap();

  let ranked: Vec<Uuid> = s
    .standings(id, None)
    .await
    .unwrap()
    .into_iter()
    .map(|st| st.entry.entry_id)
    .collect();
  assert_eq!(ranked, vec![third.entry_id, first.entry_id, second.entry_id]);

  let top = s.standings(id, Some(1)).await.unwrap();
  assert_eq!(top.len(), 1);
  assert_eq!(top[0].author_name.as_deref(), Some("carol-name"));
}

#[tokio::test]
async fn board_marks_viewer_votes_and_entries() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  let mine = submit(&s, id, "me", "mine").await;
  let theirs = submit(&s, id, "them", "theirs").await;
  s.cast_vote(uid("me"), theirs.entry_id).await.unwrap();

  let board = s.board(id, Some(uid("me"))).await.unwrap().unwrap();
  assert!(board.user_has_submitted);
  assert_eq!(board.user_entry_id, Some(mine.entry_id));
  let row = |eid: Uuid| board.entries.iter().find(|b| b.standing.entry.entry_id == eid).unwrap();
  assert!(row(theirs.entry_id).has_voted);
  assert!(!row(theirs.entry_id).is_own_entry);
  assert!(row(mine.entry_id).is_own_entry);
  assert!(!row(mine.entry_id).has_voted);

  let anon = s.board(id, None).await.unwrap().unwrap();
  assert!(!anon.user_has_submitted);
  assert!(anon.entries.iter().all(|b| !b.has_voted && !b.is_own_entry));

  assert!(s.board(Uuid::new_v4(), None).await.unwrap().is_none());
}

// ─── Close ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn close_credits_the_winner_once() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  let a = submit(&s, id, "alice", "a").await;
  let b = submit(&s, id, "bob", "b").await;
  s.cast_vote(uid("v1"), b.entry_id).await.unwrap();
  s.cast_vote(uid("v2"), b.entry_id).await.unwrap();
  s.cast_vote(uid("v3"), a.entry_id).await.unwrap();

  let outcome = s
    .finalize_close(CloseRequest {
      debate_id:       id,
      expected_winner: Some(b.entry_id),
      commentary:      Some("Bold and correct.".into()),
    })
    .await
    .unwrap();

  assert!(!outcome.commentary_discarded);
  let debate = &outcome.summary.debate;
  assert_eq!(debate.status, DebateStatus::Closed);
  assert!(debate.closed_at.is_some());
  assert_eq!(debate.winning_entry_id, Some(b.entry_id));
  assert_eq!(debate.winner_commentary.as_deref(), Some("Bold and correct."));
  assert_eq!(outcome.summary.total_entries, 2);
  assert_eq!(outcome.summary.total_votes, 3);
  let winner = outcome.summary.winner.unwrap();
  assert_eq!(winner.votes, 2);
  assert_eq!(winner.display_name(), "bob-name");
  assert_eq!(outcome.top_entries.len(), 2);

  assert_eq!(s.profile(uid("bob")).await.unwrap().wins_count, 1);
  assert_eq!(s.profile(uid("alice")).await.unwrap().wins_count, 0);

  let err = s
    .finalize_close(CloseRequest { debate_id: id, expected_winner: None, commentary: None })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DebateNotActive(d)) if d == id));
  assert_eq!(s.profile(uid("bob")).await.unwrap().wins_count, 1);
}

#[tokio::test]
async fn stale_commentary_is_discarded() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  let a = submit(&s, id, "alice", "a").await;
  let b = submit(&s, id, "bob", "b").await;
  s.cast_vote(uid("v1"), b.entry_id).await.unwrap();

  let outcome = s
    .finalize_close(CloseRequest {
      debate_id:       id,
      expected_winner: Some(a.entry_id),
      commentary:      Some("Written for alice.".into()),
    })
    .await
    .unwrap();

  assert!(outcome.commentary_discarded);
  assert_eq!(outcome.summary.debate.winning_entry_id, Some(b.entry_id));
  assert!(outcome.summary.debate.winner_commentary.is_none());
}

#[tokio::test]
async fn closing_an_empty_debate_has_no_winner() {
  let s = store().await;
  let id = open_day(&s, "Topic").await;
  let outcome = close(&s, id).await;
  assert!(outcome.summary.winner.is_none());
  assert!(outcome.summary.debate.winning_entry_id.is_none());
  assert_eq!(outcome.summary.total_entries, 0);
  assert!(outcome.top_entries.is_empty());

  let next = s.next_day_number().await.unwrap();
  assert_eq!(next, 2);
  s.create_debate("Next".into(), next).await.unwrap();
}

#[tokio::test]
async fn history_and_leaderboard() {
  let s = store().await;
  for (day, winner) in [(1, "alice"), (2, "bob"), (3, "alice")] {
    let id = open_day(&s, &format!("Day {day}")).await;
    let e = submit(&s, id, winner, "win").await;
    submit(&s, id, "zed", "lose").await;
    s.cast_vote(uid("v"), e.entry_id).await.unwrap();
    close(&s, id).await;
  }

  let history = s.history().await.unwrap();
  let days: Vec<u32> = history.iter().map(|h| h.debate.day_number).collect();
  assert_eq!(days, vec![3, 2, 1]);
  assert!(history.iter().all(|h| h.total_entries == 2 && h.total_votes == 1));

  let board = s.leaderboard(10).await.unwrap();
  let rows: Vec<(&str, u32, u32)> = board
    .iter()
    .map(|row| (row.user.user_id.as_str(), row.user.wins_count, row.total_votes))
    .collect();
  assert_eq!(rows, vec![("alice", 2, 2), ("bob", 1, 1)]);
  assert_eq!(s.leaderboard(1).await.unwrap().len(), 1);

  let alice = s.profile(uid("alice")).await.unwrap();
  assert_eq!((alice.rank, alice.total_entries, alice.total_votes), (Some(1), 2, 2));
  assert!(alice.entries.iter().all(|e| e.is_winner));
  let bob = s.profile(uid("bob")).await.unwrap();
  assert_eq!(bob.rank, Some(2));
  let zed = s.profile(uid("zed")).await.unwrap();
  assert_eq!((zed.rank, zed.total_entries, zed.total_votes), (None, 3, 0));
  assert!(zed.entries.iter().all(|e| !e.is_winner));
}

/// Two handles on one file do not share a connection thread, so their
/// transactions really contend on SQLite's write lock.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_handles_on_one_file_keep_counts_exact() {
  let dir = std::env::temp_dir().join(format!("debate-store-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("debates.db");
  let a = SqliteStore::open(&path).await.unwrap();
  let b = SqliteStore::open(&path).await.unwrap();

  let id = open_day(&a, "Topic").await;
  let e1 = submit(&a, id, "ada", "one").await.entry_id;
  let e2 = submit(&b, id, "bob", "two").await.entry_id;

  let tasks: Vec<_> = (0..200usize)
    .map(|n| {
      let store = if n % 2 == 0 { a.clone() } else { b.clone() };
      let voter = uid(&format!("v{}", n % 8));
      let entry = if n % 3 == 0 { e1 } else { e2 };
      tokio::spawn(async move {
        if n % 5 == 0 {
          store.retract_vote(voter, entry).await
        } else {
          store.cast_vote(voter, entry).await
        }
      })
    })
    .collect();

  let (mut ok, mut conflicts, mut missing) = (0, 0, 0);
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => ok += 1,
      Err(Error::Core(CoreError::AlreadyVoted(_))) => conflicts += 1,
      Err(Error::Core(CoreError::VoteNotFound(_))) => missing += 1,
      Err(other) => panic!("unexpected error: {other}"),
    }
  }
  assert!(ok > 0);
  assert_eq!(ok + conflicts + missing, 200);

  assert!(a.audit_vote_counts(id).await.unwrap().is_empty());
  let mut live = 0;
  for n in 0..8 {
    if b.live_vote(uid(&format!("v{n}")), id).await.unwrap().is_some() {
      live += 1;
    }
  }
  let counted = a.get_entry(e1).await.unwrap().unwrap().vote_count
    + a.get_entry(e2).await.unwrap().unwrap().vote_count;
  assert_eq!(counted, live);

  drop((a, b));
  std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn reopening_a_file_keeps_state() {
  let dir = std::env::temp_dir().join(format!("debate-store-{}", Uuid::new_v4()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("debates.db");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    open_day(&s, "Persisted").await
  };
  let s = SqliteStore::open(&path).await.unwrap();
  let active = s.active_debate().await.unwrap().unwrap();
  assert_eq!(active.debate_id, id);

  std::fs::remove_dir_all(&dir).ok();
}
