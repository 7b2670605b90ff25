//! The voting ledger: casting, switching and retracting votes, and the entry
//! submission flow that feeds it.
//!
//! The ledger owns the vote rows and every entry's cached `vote_count`. The
//! atomicity of each mutation is delegated to [`DebateStore`], whose write
//! methods run as single transactions; this layer adds input validation,
//! moderation and logging.

use std::{sync::Arc, time::Duration};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  collab::{ContentModerator, Moderation, bounded},
  entry::{Entry, NewEntry, normalize_content},
  store::{DebateStore, Lift},
  user::{Identity, UserId},
  vote::VoteReceipt,
};

pub struct VotingLedger<S, M> {
  store:              Arc<S>,
  moderator:          Arc<M>,
  moderation_timeout: Duration,
}

impl<S, M> VotingLedger<S, M>
where
  S: DebateStore,
  M: ContentModerator,
{
  pub fn new(store: Arc<S>, moderator: Arc<M>, moderation_timeout: Duration) -> Self {
    Self { store, moderator, moderation_timeout }
  }

  /// Read access for presentation layers. Writes go through the ledger.
  pub fn store(&self) -> &Arc<S> { &self.store }

  /// `castVote`: vote for `entry_id`, implicitly withdrawing any other vote
  /// `user` holds in the same debate.
  pub async fn cast_vote(&self, user: &UserId, entry_id: Uuid) -> Result<VoteReceipt> {
    let receipt = self
      .store
      .cast_vote(user.clone(), entry_id)
      .await
      .lift()?;

    match receipt.previous_entry_id {
      Some(previous) => info!(
        user = %user,
        %entry_id,
        %previous,
        vote_count = receipt.vote_count,
        "vote switched"
      ),
      None => info!(user = %user, %entry_id, vote_count = receipt.vote_count, "vote cast"),
    }
    Ok(receipt)
  }

  /// `retractVote`: withdraw `user`'s vote for `entry_id`.
  pub async fn retract_vote(&self, user: &UserId, entry_id: Uuid) -> Result<VoteReceipt> {
    let receipt = self
      .store
      .retract_vote(user.clone(), entry_id)
      .await
      .lift()?;
    info!(user = %user, %entry_id, vote_count = receipt.vote_count, "vote retracted");
    Ok(receipt)
  }

  /// `submitEntry`: validate, moderate and persist an entry for `debate_id`,
  /// or for the active debate when no id is given.
  pub async fn submit_entry(
    &self,
    author: &Identity,
    debate_id: Option<Uuid>,
    raw_content: &str,
  ) -> Result<Entry> {
    let content = normalize_content(raw_content)?;

    let debate = match debate_id {
      Some(id) => {
        let debate = self
          .store
          .get_debate(id)
          .await
          .lift()?
          .ok_or(Error::DebateNotFound(id))?;
        if !debate.is_active() {
          return Err(Error::DebateNotActive(id));
        }
        debate
      }
      None => self
        .store
        .active_debate()
        .await
        .lift()?
        .ok_or(Error::SubmissionsClosed)?,
    };

    let verdict = self.moderate(&content, &debate.topic).await;
    if !verdict.approved {
      info!(user = %author.user_id, debate_id = %debate.debate_id, reason = %verdict.reason, "entry rejected");
      return Err(Error::Rejected { reason: verdict.reason });
    }

    let entry = self
      .store
      .insert_entry(NewEntry {
        debate_id: debate.debate_id,
        user_id: author.user_id.clone(),
        author_name: author.display_name.clone(),
        content,
      })
      .await
      .lift()?;

    info!(user = %author.user_id, entry_id = %entry.entry_id, day = debate.day_number, "entry submitted");
    Ok(entry)
  }

  /// Moderation fails open: an unavailable moderator never blocks a user.
  async fn moderate(&self, content: &str, topic: &str) -> Moderation {
    let call = self.moderator.moderate(content.to_owned(), topic.to_owned());
    match bounded(self.moderation_timeout, "moderation", call).await {
      Ok(verdict) => verdict,
      Err(error) => {
        warn!(%error, "moderation unavailable, allowing entry");
        Moderation {
          approved: true,
          reason:   "moderation check failed, entry allowed".to_owned(),
        }
      }
    }
  }
}
