//! Prompt text and response parsing for each generation task.

use debate_core::collab::{CommentaryRequest, Moderation};
use serde::Deserialize;

/// Sampling settings differ per task: topics want variety, moderation wants
/// consistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
  Topic,
  Moderation,
  Commentary,
}

impl Task {
  pub fn temperature(self) -> f32 {
    match self {
      Self::Topic => 0.9,
      Self::Moderation => 0.3,
      Self::Commentary => 0.8,
    }
  }

  pub fn max_tokens(self) -> u32 {
    match self {
      Self::Topic => 100,
      Self::Moderation => 150,
      Self::Commentary => 200,
    }
  }

  pub fn system_prompt(self) -> &'static str {
    match self {
      Self::Topic => TOPIC_SYSTEM,
      Self::Moderation => MODERATION_SYSTEM,
      Self::Commentary => COMMENTARY_SYSTEM,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Topic => "topic generation",
      Self::Moderation => "moderation",
      Self::Commentary => "commentary",
    }
  }
}

const TOPIC_SYSTEM: &str = "\
You write the daily question for a light-hearted voting game where players \
answer in a single short line and vote on the funniest answer.

Write ONE question that:
- anyone can answer in a few seconds with one concrete thing \
(a food, an animal, a film, a chore, a song)
- has no correct answer and invites strong opinions
- is family-friendly

Good: \"What's the best pizza topping?\", \"What animal would make the worst \
roommate?\", \"What's the most useless kitchen gadget?\"
Avoid open-ended creative prompts and abstract or philosophical questions.

Reply with the question only.";

const MODERATION_SYSTEM: &str = "\
You review answers submitted to a family-friendly voting game.

Reject an answer that contains profanity, hate or harassment, sexual or \
violent content, spam, or that has nothing to do with the question. Approve \
anything else, including silly answers that only loosely fit the question.

Reply with JSON only, exactly: {\"approved\": true|false, \"reason\": \"...\"}";

const COMMENTARY_SYSTEM: &str = "\
You announce the winner of today's round of a light-hearted voting game.

Write two or three cheerful, family-friendly sentences that celebrate the \
winner by name and play on their winning answer. Gentle humour only.

Reply with the announcement text only, without quotes.";

// ─── Prompts ─────────────────────────────────────────────────────────────────

pub fn topic_prompt(previous: &[String]) -> String {
  if previous.is_empty() {
    return "Write today's question.".to_owned();
  }
  let mut out = String::from("Write today's question. Do not repeat any of these:\n");
  for topic in previous {
    out.push_str("- ");
    out.push_str(topic);
    out.push('\n');
  }
  out
}

pub fn moderation_prompt(text: &str, topic: &str) -> String {
  format!("Question: \"{topic}\"\nAnswer: \"{text}\"\n\nShould this answer be approved?")
}

pub fn commentary_prompt(request: &CommentaryRequest) -> String {
  format!(
    "Question: \"{}\"\nWinning answer: \"{}\"\nWinner: {}\nVotes: {}",
    request.topic, request.winning_text, request.winner_name, request.vote_count
  )
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// Trim whitespace and one layer of surrounding quotes. `None` when nothing
/// is left.
pub fn clean_topic(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  let trimmed = trimmed.strip_prefix(['"', '\'']).unwrap_or(trimmed);
  let trimmed = trimmed.strip_suffix(['"', '\'']).unwrap_or(trimmed);
  let trimmed = trimmed.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[derive(Deserialize)]
struct Verdict {
  #[serde(default = "approve")]
  approved: bool,
  #[serde(default)]
  reason:   String,
}

fn approve() -> bool { true }

/// Read the first `{ ... }` object in `raw` as a verdict. Anything
/// unreadable approves the entry.
pub fn parse_moderation(raw: &str) -> Moderation {
  let object = match (raw.find('{'), raw.rfind('}')) {
    (Some(start), Some(end)) if start < end => &raw[start..=end],
    _ => "",
  };
  match serde_json::from_str::<Verdict>(object) {
    Ok(v) => Moderation { approved: v.approved, reason: v.reason },
    Err(_) => {
      tracing::warn!("unreadable moderation verdict, approving");
      Moderation {
        approved: true,
        reason:   "Unable to parse moderation response".to_owned(),
      }
    }
  }
}

// ─── Offline responses ───────────────────────────────────────────────────────

pub const OFFLINE_COMMENTARY: &str = "What a result! That answer summed up \
the question perfectly and won over the crowd. Take a bow!";

pub const OFFLINE_APPROVAL: &str = "Content meets community guidelines";
