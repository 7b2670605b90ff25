//! Shared fixtures: an in-memory store plus scripted collaborators.

#![allow(dead_code)]

use std::{
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use debate_core::{
  Error, Result,
  collab::{
    ArchiveIndex, Archiver, CommentaryGenerator, CommentaryRequest, ContentModerator,
    DebateArchive, Moderation, TopicGenerator,
  },
  entry::Entry,
  ledger::VotingLedger,
  lifecycle::{LifecycleManager, LifecyclePolicy},
  store::DebateStore,
  user::{Identity, UserId},
};
use debate_store_sqlite::SqliteStore;
use uuid::Uuid;

pub fn uid(raw: &str) -> UserId { UserId::new(raw).unwrap() }

pub fn who(raw: &str) -> Identity { Identity::new(uid(raw)).with_name(format!("{raw} name")) }

pub async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.expect("in-memory store"))
}

/// Open the next day's debate directly in the store.
pub async fn open(store: &SqliteStore, topic: &str) -> Uuid {
  let day = store.next_day_number().await.unwrap();
  store.create_debate(topic.into(), day).await.unwrap().debate_id
}

// ─── Scripted generator ──────────────────────────────────────────────────────

/// What a scripted call does.
#[derive(Clone, Debug)]
pub enum Reply {
  Text(String),
  Fail,
  /// Never completes within any test timeout.
  Hang,
}

impl Reply {
  pub fn text(s: &str) -> Self { Self::Text(s.to_owned()) }

  async fn play(&self) -> Result<String> {
    match self {
      Self::Text(s) => Ok(s.clone()),
      Self::Fail => Err(Error::Dependency("scripted failure".into())),
      Self::Hang => {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(Error::Dependency("unreachable".into()))
      }
    }
  }
}

/// A generator whose every answer is fixed up front. Moderation rejects
/// any entry containing `banned` when set.
pub struct Scripted {
  pub topic:            Reply,
  pub moderation:       Reply,
  pub banned:           Option<&'static str>,
  pub commentary:       Reply,
  pub commentary_calls: AtomicUsize,
}

impl Default for Scripted {
  fn default() -> Self {
    Self {
      topic:            Reply::text("What's the best sandwich?"),
      moderation:       Reply::text("ok"),
      banned:           None,
      commentary:       Reply::text("A worthy winner."),
      commentary_calls: AtomicUsize::new(0),
    }
  }
}

impl TopicGenerator for Scripted {
  async fn generate_topic(&self, _previous: Vec<String>) -> Result<String> {
    self.topic.play().await
  }
}

impl ContentModerator for Scripted {
  async fn moderate(&self, text: String, _topic: String) -> Result<Moderation> {
    let reason = self.moderation.play().await?;
    let approved = self.banned.is_none_or(|word| !text.contains(word));
    Ok(Moderation { approved, reason })
  }
}

impl CommentaryGenerator for Scripted {
  async fn generate_commentary(&self, _request: CommentaryRequest) -> Result<String> {
    self.commentary_calls.fetch_add(1, Ordering::SeqCst);
    self.commentary.play().await
  }
}

// ─── Recording archiver ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct Recording {
  pub fail:    bool,
  pub records: Mutex<Vec<DebateArchive>>,
  pub indexes: Mutex<Vec<ArchiveIndex>>,
}

impl Archiver for Recording {
  async fn archive_debate(&self, record: DebateArchive) -> Result<()> {
    if self.fail {
      return Err(Error::Dependency("bucket unavailable".into()));
    }
    self.records.lock().unwrap().push(record);
    Ok(())
  }

  async fn archive_index(&self, index: ArchiveIndex) -> Result<()> {
    self.indexes.lock().unwrap().push(index);
    Ok(())
  }
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

pub type Ledger = VotingLedger<SqliteStore, Scripted>;
pub type Lifecycle<G = Scripted> = LifecycleManager<SqliteStore, G, Recording>;

pub fn fast_policy() -> LifecyclePolicy {
  LifecyclePolicy {
    challenge_days:     Some(30),
    topic_timeout:      Duration::from_millis(200),
    commentary_timeout: Duration::from_millis(200),
    archive_timeout:    Duration::from_millis(200),
  }
}

pub fn ledger(store: &Arc<SqliteStore>, generator: Scripted) -> Ledger {
  VotingLedger::new(store.clone(), Arc::new(generator), Duration::from_millis(200))
}

pub fn lifecycle(
  store: &Arc<SqliteStore>,
  generator: &Arc<Scripted>,
  archiver: &Arc<Recording>,
) -> Lifecycle {
  LifecycleManager::new(store.clone(), generator.clone(), archiver.clone(), fast_policy())
}

pub async fn submit(ledger: &Ledger, user: &str, text: &str) -> Entry {
  ledger.submit_entry(&who(user), None, text).await.unwrap()
}
