//! HTTP server for the daily debate.
//!
//! Mounts the public JSON API under `/api` and the scheduler-facing
//! lifecycle endpoints under `/cron`, backed by any [`DebateStore`],
//! [`Generator`] and [`Archiver`].

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{get, post},
};
use debate_ai::{ArchiveConfig, InferenceConfig};
use debate_core::{
  collab::{Archiver, Generator},
  ledger::VotingLedger,
  lifecycle::{LifecycleManager, LifecyclePolicy},
  store::DebateStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::CronAuth;
use handlers::cron;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DEBATE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// PHC string produced by argon2. Unset leaves `/cron` open.
  pub cron_secret_hash: Option<String>,
  /// Last day number that may be opened; `0` removes the cap.
  pub challenge_days:   u32,
  pub timeouts:         Timeouts,
  pub inference:        InferenceConfig,
  pub archive:          ArchiveConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_owned(),
      port:             3000,
      store_path:       PathBuf::from("debate.db"),
      cron_secret_hash: None,
      challenge_days:   30,
      timeouts:         Timeouts::default(),
      inference:        InferenceConfig::default(),
      archive:          ArchiveConfig::default(),
    }
  }
}

/// Upper bounds on calls to external collaborators, in seconds.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Timeouts {
  pub moderation_secs: u64,
  pub commentary_secs: u64,
  pub topic_secs:      u64,
  pub archive_secs:    u64,
}

impl Default for Timeouts {
  fn default() -> Self {
    Self { moderation_secs: 10, commentary_secs: 20, topic_secs: 20, archive_secs: 15 }
  }
}

impl ServerConfig {
  pub fn policy(&self) -> LifecyclePolicy {
    LifecyclePolicy {
      challenge_days:     (self.challenge_days > 0).then_some(self.challenge_days),
      topic_timeout:      Duration::from_secs(self.timeouts.topic_secs),
      commentary_timeout: Duration::from_secs(self.timeouts.commentary_secs),
      archive_timeout:    Duration::from_secs(self.timeouts.archive_secs),
    }
  }

  pub fn moderation_timeout(&self) -> Duration {
    Duration::from_secs(self.timeouts.moderation_secs)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the cron handlers.
///
/// One generator serves both moderation (through the ledger) and topic and
/// commentary generation (through the lifecycle manager).
pub struct AppState<S, G, A> {
  pub ledger:    Arc<VotingLedger<S, G>>,
  pub lifecycle: Arc<LifecycleManager<S, G, A>>,
  pub auth:      Arc<CronAuth>,
  pub config:    Arc<ServerConfig>,
}

impl<S, G, A> Clone for AppState<S, G, A> {
  fn clone(&self) -> Self {
    Self {
      ledger:    self.ledger.clone(),
      lifecycle: self.lifecycle.clone(),
      auth:      self.auth.clone(),
      config:    self.config.clone(),
    }
  }
}

impl<S, G, A> AppState<S, G, A>
where
  S: DebateStore,
  G: Generator,
  A: Archiver,
{
  /// Wire the services over shared collaborators.
  pub fn new(config: ServerConfig, store: S, generator: G, archiver: A) -> Result<Self, Error> {
    let store = Arc::new(store);
    let generator = Arc::new(generator);
    let auth = CronAuth::new(config.cron_secret_hash.clone())?;
    let ledger = VotingLedger::new(store.clone(), generator.clone(), config.moderation_timeout());
    let lifecycle =
      LifecycleManager::new(store, generator, Arc::new(archiver), config.policy());

    Ok(Self {
      ledger:    Arc::new(ledger),
      lifecycle: Arc::new(lifecycle),
      auth:      Arc::new(auth),
      config:    Arc::new(config),
    })
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S, G, A>(state: AppState<S, G, A>) -> Router
where
  S: DebateStore + 'static,
  G: Generator + 'static,
  A: Archiver + 'static,
{
  let api = debate_api::api_router(state.ledger.clone());

  Router::new()
    .route(
      "/cron/new-debate",
      post(cron::open::<S, G, A>).get(cron::open_status::<S, G, A>),
    )
    .route(
      "/cron/close-debate",
      post(cron::close::<S, G, A>).get(cron::preview::<S, G, A>),
    )
    .route("/health", get(|| async { "ok" }))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}
