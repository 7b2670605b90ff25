//! Async client for an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use debate_core::{
  Error as CoreError,
  collab::{CommentaryGenerator, CommentaryRequest, ContentModerator, Moderation, TopicGenerator},
  topics,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  config::InferenceConfig,
  prompts::{self, Task},
};

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatMessage<'a> {
  role:    &'static str,
  content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
  model:       &'a str,
  messages:    [ChatMessage<'a>; 2],
  temperature: f32,
  max_tokens:  u32,
}

#[derive(Deserialize)]
struct ChatResponse {
  #[serde(default)]
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
  content: Option<String>,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Generation provider backed by a chat-completions endpoint.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based. Callers
/// bound each call with their own per-task timeout; the client-level timeout
/// only guards against a hung connection.
#[derive(Clone)]
pub struct InferenceClient {
  client: Client,
  config: InferenceConfig,
}

impl InferenceClient {
  pub fn new(config: InferenceConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(60)).build()?;
    if config.api_key.is_empty() {
      tracing::warn!("no inference api key configured; using offline responses");
    }
    Ok(Self { client, config })
  }

  pub fn is_offline(&self) -> bool { self.config.api_key.is_empty() }

  async fn complete(&self, task: Task, user_prompt: &str) -> Result<String> {
    let request = ChatRequest {
      model:       &self.config.model,
      messages:    [
        ChatMessage { role: "system", content: task.system_prompt() },
        ChatMessage { role: "user", content: user_prompt },
      ],
      temperature: task.temperature(),
      max_tokens:  task.max_tokens(),
    };

    let resp = self
      .client
      .post(&self.config.url)
      .bearer_auth(&self.config.api_key)
      .json(&request)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      tracing::error!(task = task.label(), %status, "inference request failed");
      return Err(Error::Status { what: task.label(), status, body });
    }

    let parsed: ChatResponse = resp.json().await?;
    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|c| c.message.content)
      .ok_or(Error::EmptyCompletion)
  }
}

// ─── Collaborator impls ──────────────────────────────────────────────────────

impl TopicGenerator for InferenceClient {
  async fn generate_topic(&self, previous: Vec<String>) -> debate_core::Result<String> {
    if self.is_offline() {
      return topics::fallback_topic(&previous)
        .map(str::to_owned)
        .ok_or_else(|| CoreError::Dependency("no unused offline topics left".into()));
    }

    let raw = self.complete(Task::Topic, &prompts::topic_prompt(&previous)).await?;
    prompts::clean_topic(&raw)
      .ok_or_else(|| CoreError::Dependency("topic generator returned an empty topic".into()))
  }
}

impl ContentModerator for InferenceClient {
  async fn moderate(&self, text: String, topic: String) -> debate_core::Result<Moderation> {
    if self.is_offline() {
      return Ok(Moderation { approved: true, reason: prompts::OFFLINE_APPROVAL.to_owned() });
    }

    let raw = self
      .complete(Task::Moderation, &prompts::moderation_prompt(&text, &topic))
      .await?;
    Ok(prompts::parse_moderation(&raw))
  }
}

impl CommentaryGenerator for InferenceClient {
  async fn generate_commentary(&self, request: CommentaryRequest) -> debate_core::Result<String> {
    if self.is_offline() {
      return Ok(prompts::OFFLINE_COMMENTARY.to_owned());
    }

    let raw = self
      .complete(Task::Commentary, &prompts::commentary_prompt(&request))
      .await?;
    let text = raw.trim();
    if text.is_empty() {
      return Err(Error::EmptyCompletion.into());
    }
    Ok(text.to_owned())
  }
}
