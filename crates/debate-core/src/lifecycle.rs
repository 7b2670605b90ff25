//! The debate lifecycle manager: opening the next debate and closing the
//! active one with winner determination.
//!
//! Closing is split around one transaction. Winner selection, the win
//! counter and the `Active → Closed` transition commit together in
//! [`DebateStore::finalize_close`]; commentary generation happens before it
//! and archival after it, and neither can fail the close.

use std::{cmp::Reverse, sync::Arc, time::Duration};

use chrono::Utc;
use tracing::{info, warn};

use crate::{
  Error, Result,
  collab::{
    ArchiveIndex, Archiver, CommentaryRequest, DebateArchive, Generator, bounded,
  },
  debate::{ClosePreview, Debate, DebateSummary, OpenStatus, WinnerDetail},
  entry::{Entry, Standing},
  store::{CloseOutcome, CloseRequest, DebateStore, Lift},
  topics,
};

/// Number of ranked entries reported in previews and archives.
pub const TOP_ENTRIES: usize = 5;

// ─── Winner selection ────────────────────────────────────────────────────────

/// Pick the winner among `entries`: the approved entry with the most votes,
/// ties going to the earliest `created_at`. Entries with identical votes and
/// timestamps keep iteration order, so callers pass them in insertion order.
pub fn select_winner<'a>(entries: impl IntoIterator<Item = &'a Entry>) -> Option<&'a Entry> {
  entries
    .into_iter()
    .filter(|e| e.approved)
    .fold(None, |best: Option<&Entry>, e| match best {
      Some(b) if (b.vote_count, Reverse(b.created_at)) >= (e.vote_count, Reverse(e.created_at)) => {
        Some(b)
      }
      _ => Some(e),
    })
}

// ─── Policy ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct LifecyclePolicy {
  /// Refuse to open debates past this day number.
  pub challenge_days:     Option<u32>,
  pub topic_timeout:      Duration,
  pub commentary_timeout: Duration,
  pub archive_timeout:    Duration,
}

impl Default for LifecyclePolicy {
  fn default() -> Self {
    Self {
      challenge_days:     Some(30),
      topic_timeout:      Duration::from_secs(20),
      commentary_timeout: Duration::from_secs(20),
      archive_timeout:    Duration::from_secs(15),
    }
  }
}

// ─── Manager ─────────────────────────────────────────────────────────────────

pub struct LifecycleManager<S, G, A> {
  store:     Arc<S>,
  generator: Arc<G>,
  archiver:  Arc<A>,
  policy:    LifecyclePolicy,
}

impl<S, G, A> LifecycleManager<S, G, A>
where
  S: DebateStore,
  G: Generator,
  A: Archiver,
{
  pub fn new(store: Arc<S>, generator: Arc<G>, archiver: Arc<A>, policy: LifecyclePolicy) -> Self {
    Self { store, generator, archiver, policy }
  }

  pub fn policy(&self) -> &LifecyclePolicy { &self.policy }

  // ── Open ────────────────────────────────────────────────────────────────

  /// `openNewDebate`: create the next day's active debate.
  pub async fn open_new_debate(&self) -> Result<Debate> {
    if let Some(active) = self.store.active_debate().await.lift()? {
      return Err(Error::ActiveDebateExists {
        debate_id:  active.debate_id,
        day_number: active.day_number,
      });
    }

    let day_number = self.store.next_day_number().await.lift()?;
    if let Some(max_days) = self.policy.challenge_days
      && day_number > max_days
    {
      return Err(Error::ChallengeComplete { max_days });
    }

    let previous = self.store.previous_topics().await.lift()?;
    let topic = self.pick_topic(&previous).await?;

    let debate = self.store.create_debate(topic, day_number).await.lift()?;
    info!(debate_id = %debate.debate_id, day = debate.day_number, topic = %debate.topic, "debate opened");
    Ok(debate)
  }

  async fn pick_topic(&self, previous: &[String]) -> Result<String> {
    let call = self.generator.generate_topic(previous.to_vec());
    let generated = bounded(self.policy.topic_timeout, "topic generation", call)
      .await
      .and_then(|topic| {
        let topic = topic.trim().to_owned();
        if topic.is_empty() {
          Err(Error::Dependency("topic generator returned an empty topic".into()))
        } else if topics::is_duplicate(&topic, previous) {
          Err(Error::Dependency(format!("generated topic repeats an earlier one: {topic:?}")))
        } else {
          Ok(topic)
        }
      });

    match generated {
      Ok(topic) => Ok(topic),
      Err(error) => {
        let fallback = topics::fallback_topic(previous).ok_or_else(|| {
          Error::Dependency(format!("topic generation failed and no built-in topic is left: {error}"))
        })?;
        warn!(%error, fallback, "topic generation failed, using built-in topic");
        Ok(fallback.to_owned())
      }
    }
  }

  /// Scheduler-facing view of the open side.
  pub async fn open_status(&self) -> Result<OpenStatus> {
    Ok(OpenStatus {
      active_debate:   self.store.active_debate().await.lift()?,
      total_debates:   self.store.debate_count().await.lift()?,
      next_day_number: self.store.next_day_number().await.lift()?,
    })
  }

  // ── Close ───────────────────────────────────────────────────────────────

  /// `closeActiveDebate`: close the active debate and announce its winner.
  pub async fn close_active_debate(&self) -> Result<DebateSummary> {
    let debate = self
      .store
      .active_debate()
      .await
      .lift()?
      .ok_or(Error::NoActiveDebate)?;

    let standings = self.store.standings(debate.debate_id, None).await.lift()?;
    let leader = leading(&standings);

    let commentary = match leader {
      Some(leader) => self.commentary_for(&debate, leader).await,
      None => None,
    };

    let outcome = self
      .store
      .finalize_close(CloseRequest {
        debate_id:       debate.debate_id,
        expected_winner: leader.map(|s| s.entry.entry_id),
        commentary,
      })
      .await
      .lift()?;

    if outcome.commentary_discarded {
      warn!(debate_id = %debate.debate_id, "winner changed during commentary generation, commentary dropped");
    }
    info!(
      debate_id = %debate.debate_id,
      day = debate.day_number,
      winner = ?outcome.summary.debate.winning_entry_id,
      total_votes = outcome.summary.total_votes,
      "debate closed"
    );

    self.archive(&outcome).await;
    Ok(outcome.summary)
  }

  async fn commentary_for(&self, debate: &Debate, leader: &Standing) -> Option<String> {
    let winner = WinnerDetail::from_standing(leader);
    let request = CommentaryRequest {
      topic:        debate.topic.clone(),
      winning_text: winner.content.clone(),
      winner_name:  winner.display_name().to_owned(),
      vote_count:   winner.votes,
    };
    let call = self.generator.generate_commentary(request);
    match bounded(self.policy.commentary_timeout, "commentary", call).await {
      Ok(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
      Ok(_) => None,
      Err(error) => {
        warn!(debate_id = %debate.debate_id, %error, "commentary unavailable, closing without it");
        None
      }
    }
  }

  /// Archival is best-effort; nothing here can undo or fail the close.
  async fn archive(&self, outcome: &CloseOutcome) {
    if !self.archiver.is_enabled() {
      return;
    }
    let debate = &outcome.summary.debate;
    let record = DebateArchive::from_outcome(outcome);
    let call = self.archiver.archive_debate(record);
    if let Err(error) = bounded(self.policy.archive_timeout, "archive", call).await {
      warn!(debate_id = %debate.debate_id, day = debate.day_number, %error, "archive failed");
      return;
    }

    let history = match self.store.history().await.lift() {
      Ok(history) => history,
      Err(error) => {
        warn!(%error, "could not load history for archive index");
        return;
      }
    };
    let call = self.archiver.archive_index(ArchiveIndex::from_history(&history, Utc::now()));
    match bounded(self.policy.archive_timeout, "archive index", call).await {
      Ok(()) => info!(day = debate.day_number, "debate archived"),
      Err(error) => warn!(%error, "archive index failed"),
    }
  }

  /// What closing now would produce, without mutating anything.
  pub async fn preview_close(&self) -> Result<ClosePreview> {
    let debate = self
      .store
      .active_debate()
      .await
      .lift()?
      .ok_or(Error::NoActiveDebate)?;
    let summary = self
      .store
      .summary(debate.debate_id)
      .await
      .lift()?
      .ok_or(Error::DebateNotFound(debate.debate_id))?;
    let standings = self.store.standings(debate.debate_id, None).await.lift()?;
    let potential_winner = leading(&standings).map(WinnerDetail::from_standing);

    Ok(ClosePreview {
      summary,
      top_entries: standings.into_iter().take(TOP_ENTRIES).collect(),
      potential_winner,
    })
  }
}

fn leading(standings: &[Standing]) -> Option<&Standing> {
  let winner = select_winner(standings.iter().map(|s| &s.entry))?;
  standings.iter().find(|s| s.entry.entry_id == winner.entry_id)
}
