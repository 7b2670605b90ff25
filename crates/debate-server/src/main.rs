//! debate-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `DEBATE_*` environment variables, opens the SQLite store, and either
//! serves HTTP or runs one lifecycle operation and prints the result.
//!
//! # Cron secret hash generation
//!
//! To generate the argon2 PHC string for `cron_secret_hash`:
//!
//! ```
//! cargo run -p debate-server -- --hash-secret
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand};
use debate_ai::{ArchiveSink, InferenceClient};
use debate_server::{AppState, ServerConfig};
use debate_store_sqlite::SqliteStore;
use rand_core::OsRng;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Daily debate server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a cron secret entered on stdin and exit.
  #[arg(long)]
  hash_secret: bool,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
  /// Serve the HTTP API and cron endpoints (default).
  Serve,
  /// Open the next day's debate once and print it.
  OpenDebate,
  /// Close the active debate once and print its summary.
  CloseDebate,
  /// Print the active debate, debate count and next day number.
  Status,
}

type LiveState = AppState<SqliteStore, InferenceClient, ArchiveSink>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_secret {
    let secret = secret_from_stdin()?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(secret.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string();
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("DEBATE")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let state = build_state(server_cfg).await?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(state).await,
    Command::OpenDebate => print_json(&state.lifecycle.open_new_debate().await?),
    Command::CloseDebate => print_json(&state.lifecycle.close_active_debate().await?),
    Command::Status => print_json(&state.lifecycle.open_status().await?),
  }
}

async fn build_state(server_cfg: ServerConfig) -> anyhow::Result<LiveState> {
  let store_path = expand_tilde(&server_cfg.store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let generator = InferenceClient::new(server_cfg.inference.clone())
    .context("failed to build inference client")?;
  let archiver =
    ArchiveSink::from_config(&server_cfg.archive).context("failed to build archive sink")?;

  AppState::new(server_cfg, store, generator, archiver).context("invalid server configuration")
}

async fn serve(state: LiveState) -> anyhow::Result<()> {
  let address = format!("{}:{}", state.config.host, state.config.port);
  let app = debate_server::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;
  Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

/// Read the secret from stdin.
fn secret_from_stdin() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Secret: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
