//! Contracts for the external collaborators the engine calls out to.
//!
//! None of these calls ever takes part in a store transaction. Callers wrap
//! them in [`bounded`] so a slow provider cannot stall a lifecycle operation.

use std::{future::Future, time::Duration};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  debate::DebateSummary,
  entry::Standing,
  store::CloseOutcome,
  user::name_or_anonymous,
};

// ─── Generation ──────────────────────────────────────────────────────────────

pub trait TopicGenerator: Send + Sync {
  /// Produce a topic that duplicates none of `previous`.
  fn generate_topic(
    &self,
    previous: Vec<String>,
  ) -> impl Future<Output = Result<String>> + Send + '_;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moderation {
  pub approved: bool,
  pub reason:   String,
}

pub trait ContentModerator: Send + Sync {
  fn moderate(
    &self,
    text: String,
    topic: String,
  ) -> impl Future<Output = Result<Moderation>> + Send + '_;
}

#[derive(Debug, Clone)]
pub struct CommentaryRequest {
  pub topic:        String,
  pub winning_text: String,
  pub winner_name:  String,
  pub vote_count:   u32,
}

pub trait CommentaryGenerator: Send + Sync {
  fn generate_commentary(
    &self,
    request: CommentaryRequest,
  ) -> impl Future<Output = Result<String>> + Send + '_;
}

/// A single provider for every generation concern.
pub trait Generator: TopicGenerator + ContentModerator + CommentaryGenerator {}

impl<T> Generator for T where T: TopicGenerator + ContentModerator + CommentaryGenerator {}

// ─── Archival ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedEntry {
  pub user_name: String,
  pub entry:     String,
  pub votes:     u32,
}

impl From<&Standing> for ArchivedEntry {
  fn from(s: &Standing) -> Self {
    Self {
      user_name: name_or_anonymous(s.author_name.as_deref()).to_owned(),
      entry:     s.entry.content.clone(),
      votes:     s.entry.vote_count,
    }
  }
}

/// The knowledge-base record of one closed debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateArchive {
  pub id:            Uuid,
  pub day_number:    u32,
  pub date:          NaiveDate,
  pub topic:         String,
  pub total_entries: u32,
  pub total_votes:   u32,
  pub winner:        Option<ArchivedEntry>,
  pub runner_up:     Option<ArchivedEntry>,
  pub commentary:    Option<String>,
  pub top_entries:   Vec<ArchivedEntry>,
}

impl DebateArchive {
  pub fn from_outcome(outcome: &CloseOutcome) -> Self {
    let debate = &outcome.summary.debate;
    let winner = outcome.summary.winner.as_ref().map(|w| ArchivedEntry {
      user_name: w.display_name().to_owned(),
      entry:     w.content.clone(),
      votes:     w.votes,
    });
    let runner_up = outcome
      .top_entries
      .iter()
      .find(|s| Some(s.entry.entry_id) != debate.winning_entry_id)
      .filter(|_| winner.is_some())
      .map(ArchivedEntry::from);

    Self {
      id: debate.debate_id,
      day_number: debate.day_number,
      date: debate.closed_at.unwrap_or_else(Utc::now).date_naive(),
      topic: debate.topic.clone(),
      total_entries: outcome.summary.total_entries,
      total_votes: outcome.summary.total_votes,
      winner,
      runner_up,
      commentary: debate.winner_commentary.clone(),
      top_entries: outcome.top_entries.iter().map(ArchivedEntry::from).collect(),
    }
  }

  /// Object key stem shared by the JSON and text renderings.
  pub fn key_stem(&self) -> String {
    format!("debates/day-{:02}", self.day_number)
  }

  /// Plain-text rendering; indexes better than JSON for retrieval.
  pub fn to_text(&self) -> String {
    let mut out = format!(
      "Daily Debate - Day {}\nDate: {}\nTopic: \"{}\"\n\nResults:\n- Total Entries: {}\n- Total Votes: {}\n\n",
      self.day_number, self.date, self.topic, self.total_entries, self.total_votes,
    );
    match &self.winner {
      Some(w) => out.push_str(&format!(
        "Winner: {}\nWinning Entry: \"{}\"\nWinning Votes: {}\n",
        w.user_name, w.entry, w.votes
      )),
      None => out.push_str("Winner: No winner\n"),
    }
    if let Some(r) = &self.runner_up {
      out.push_str(&format!(
        "\nRunner Up: {}\nRunner Up Entry: \"{}\"\nRunner Up Votes: {}\n",
        r.user_name, r.entry, r.votes
      ));
    }
    if let Some(c) = &self.commentary {
      out.push_str(&format!("\nCommentary: \"{c}\"\n"));
    }
    out.push_str("\nTop Entries:\n");
    for (i, e) in self.top_entries.iter().enumerate() {
      out.push_str(&format!("{}. {}: \"{}\" ({} votes)\n", i + 1, e.user_name, e.entry, e.votes));
    }
    out.trim_end().to_owned()
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveIndexRow {
  pub day_number:    u32,
  pub date:          Option<NaiveDate>,
  pub topic:         String,
  pub winner:        Option<String>,
  pub winning_entry: Option<String>,
}

/// Roll-up of every closed debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveIndex {
  pub last_updated:  DateTime<Utc>,
  pub total_debates: u32,
  pub total_entries: u32,
  pub total_votes:   u32,
  pub debates:       Vec<ArchiveIndexRow>,
}

impl ArchiveIndex {
  pub fn from_history(history: &[DebateSummary], now: DateTime<Utc>) -> Self {
    let closed: Vec<&DebateSummary> =
      history.iter().filter(|s| !s.debate.is_active()).collect();
    Self {
      last_updated:  now,
      total_debates: u32::try_from(closed.len()).unwrap_or(u32::MAX),
      total_entries: closed.iter().map(|s| s.total_entries).sum(),
      total_votes:   closed.iter().map(|s| s.total_votes).sum(),
      debates:       closed
        .iter()
        .map(|s| ArchiveIndexRow {
          day_number:    s.debate.day_number,
          date:          s.debate.closed_at.map(|at| at.date_naive()),
          topic:         s.debate.topic.clone(),
          winner:        s.winner.as_ref().map(|w| w.display_name().to_owned()),
          winning_entry: s.winner.as_ref().map(|w| w.content.clone()),
        })
        .collect(),
    }
  }
}

pub trait Archiver: Send + Sync {
  /// `false` when no sink is configured; the lifecycle then skips building
  /// archive records at all.
  fn is_enabled(&self) -> bool { true }

  fn archive_debate(
    &self,
    record: DebateArchive,
  ) -> impl Future<Output = Result<()>> + Send + '_;

  fn archive_index(
    &self,
    index: ArchiveIndex,
  ) -> impl Future<Output = Result<()>> + Send + '_;
}

// ─── Timeouts ────────────────────────────────────────────────────────────────

/// Await `fut` for at most `limit`; elapsing becomes [`Error::Dependency`].
pub async fn bounded<T>(
  limit: Duration,
  what: &str,
  fut: impl Future<Output = Result<T>>,
) -> Result<T> {
  match tokio::time::timeout(limit, fut).await {
    Ok(res) => res,
    Err(_) => Err(Error::Dependency(format!(
      "{what} timed out after {}ms",
      limit.as_millis()
    ))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    debate::{Debate, DebateStatus, WinnerDetail},
    entry::Entry,
    user::UserId,
  };

  fn standing(name: Option<&str>, content: &str, votes: u32) -> Standing {
    Standing {
      entry:       Entry {
        entry_id:   Uuid::new_v4(),
        debate_id:  Uuid::nil(),
        user_id:    UserId::new("u").unwrap(),
        content:    content.into(),
        approved:   true,
        vote_count: votes,
        created_at: Utc::now(),
      },
      author_name: name.map(str::to_owned),
    }
  }

  fn outcome(top: Vec<Standing>) -> CloseOutcome {
    let winner = top.first().map(WinnerDetail::from_standing);
    CloseOutcome {
      summary:              DebateSummary {
        debate:        Debate {
          debate_id:         Uuid::new_v4(),
          topic:             "Is cereal a soup?".into(),
          day_number:        3,
          status:            DebateStatus::Closed,
          created_at:        Utc::now(),
          closed_at:         Some(Utc::now()),
          winning_entry_id:  winner.as_ref().map(|w| w.entry_id),
          winner_commentary: Some("What a win!".into()),
        },
        total_entries: top.len() as u32,
        total_votes:   top.iter().map(|s| s.entry.vote_count).sum(),
        winner,
      },
      top_entries:          top,
      commentary_discarded: false,
    }
  }

  #[test]
  fn archive_picks_runner_up_after_winner() {
    let record = DebateArchive::from_outcome(&outcome(vec![
      standing(Some("Ada"), "yes", 4),
      standing(None, "no", 2),
    ]));
    assert_eq!(record.key_stem(), "debates/day-03");
    assert_eq!(record.winner.as_ref().unwrap().user_name, "Ada");
    let runner = record.runner_up.as_ref().unwrap();
    assert_eq!(runner.user_name, "Anonymous");
    assert_eq!(runner.votes, 2);

    let text = record.to_text();
    assert!(text.contains("Winner: Ada"), "{text}");
    assert!(text.contains("Runner Up: Anonymous"), "{text}");
    assert!(text.contains("2. Anonymous: \"no\" (2 votes)"), "{text}");
  }

  #[test]
  fn archive_without_entries_has_no_winner() {
    let record = DebateArchive::from_outcome(&outcome(vec![]));
    assert!(record.winner.is_none());
    assert!(record.runner_up.is_none());
    assert!(record.to_text().contains("Winner: No winner"));
  }

  #[test]
  fn index_rolls_up_closed_debates_only() {
    let closed = outcome(vec![standing(Some("Ada"), "yes", 4), standing(None, "no", 2)]).summary;
    let mut active = outcome(vec![]).summary;
    active.debate.status = DebateStatus::Active;
    active.debate.closed_at = None;

    let index = ArchiveIndex::from_history(&[active, closed.clone()], Utc::now());
    assert_eq!(index.total_debates, 1);
    assert_eq!(index.total_entries, 2);
    assert_eq!(index.total_votes, 6);
    assert_eq!(index.debates[0].day_number, closed.debate.day_number);
    assert_eq!(index.debates[0].winner.as_deref(), Some("Ada"));
    assert_eq!(index.debates[0].winning_entry.as_deref(), Some("yes"));
  }

  #[tokio::test]
  async fn bounded_turns_elapsed_into_dependency_failure() {
    let slow = async {
      tokio::time::sleep(Duration::from_millis(200)).await;
      Ok::<_, Error>(1)
    };
    let res = bounded(Duration::from_millis(10), "commentary", slow).await;
    assert!(matches!(res, Err(Error::Dependency(m)) if m.contains("commentary")));
  }
}
