//! Concurrent vote traffic must leave the cached counters exact.

mod common;

use std::sync::Arc;

use common::{Scripted, ledger, open, store, submit, uid};
use debate_core::{Error, store::DebateStore};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn duplicate_casts_race_to_one_vote() {
  let s = store().await;
  open(&s, "Topic").await;
  let l = Arc::new(ledger(&s, Scripted::default()));
  let entry = submit(&l, "ada", "one").await.entry_id;

  let tasks: Vec<_> = (0..2)
    .map(|_| {
      let l = l.clone();
      tokio::spawn(async move { l.cast_vote(&uid("v"), entry).await })
    })
    .collect();

  let mut ok = 0;
  let mut conflicts = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => ok += 1,
      Err(Error::AlreadyVoted(id)) if id == entry => conflicts += 1,
      Err(other) => panic!("unexpected error: {other}"),
    }
  }
  assert_eq!((ok, conflicts), (1, 1));
  assert_eq!(s.get_entry(entry).await.unwrap().unwrap().vote_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_traffic_keeps_counters_exact() {
  const VOTERS: usize = 12;
  const ROUNDS: usize = 40;

  let s = store().await;
  let debate_id = open(&s, "Topic").await;
  let l = Arc::new(ledger(&s, Scripted::default()));
  let mut entries = Vec::new();
  for author in ["ada", "bob", "cy", "dee"] {
    entries.push(submit(&l, author, author).await.entry_id);
  }
  let entries = Arc::new(entries);

  let tasks: Vec<_> = (0..VOTERS)
    .map(|n| {
      let l = l.clone();
      let entries = entries.clone();
      tokio::spawn(async move {
        let voter = uid(&format!("voter-{n}"));
        let mut rng = StdRng::seed_from_u64(n as u64);
        for _ in 0..ROUNDS {
          let target = entries[rng.gen_range(0..entries.len())];
          // Conflicts and missing votes are expected outcomes here.
          let _ = if rng.gen_ratio(1, 3) {
            l.retract_vote(&voter, target).await
          } else {
            l.cast_vote(&voter, target).await
          };
        }
      })
    })
    .collect();
  for task in tasks {
    task.await.unwrap();
  }

  assert!(s.audit_vote_counts(debate_id).await.unwrap().is_empty());

  let mut live = 0;
  for n in 0..VOTERS {
    if s.live_vote(uid(&format!("voter-{n}")), debate_id).await.unwrap().is_some() {
      live += 1;
    }
  }
  let counted: u32 = s
    .standings(debate_id, None)
    .await
    .unwrap()
    .iter()
    .map(|st| st.entry.vote_count)
    .sum();
  assert_eq!(counted, live);
  assert_eq!(s.summary(debate_id).await.unwrap().unwrap().total_votes, live);
}
