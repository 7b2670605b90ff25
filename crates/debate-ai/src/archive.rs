//! Archive sinks for closed debates.
//!
//! Each closed debate is written twice under the same key stem, as JSON and
//! as plain text, and the roll-up index is rewritten after every close.

use std::{path::PathBuf, time::Duration};

use debate_core::collab::{ArchiveIndex, Archiver, DebateArchive};
use reqwest::Client;

use crate::{Error, Result, config::ArchiveConfig};

pub const INDEX_KEY: &str = "debates/summary.json";

#[derive(Clone)]
pub enum ArchiveSink {
  Disabled,
  /// Files under a local directory, keyed by relative path.
  Dir(PathBuf),
  /// `PUT {base_url}/{key}` to an object store.
  Http {
    client:   Client,
    base_url: String,
    token:    Option<String>,
  },
}

impl ArchiveSink {
  pub fn from_config(config: &ArchiveConfig) -> Result<Self> {
    if let Some(dir) = &config.dir {
      return Ok(Self::Dir(dir.clone()));
    }
    if let Some(url) = &config.url {
      let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
      return Ok(Self::Http {
        client,
        base_url: url.trim_end_matches('/').to_owned(),
        token: config.token.clone(),
      });
    }
    Ok(Self::Disabled)
  }

  async fn put(&self, key: &str, body: Vec<u8>, content_type: &'static str) -> Result<()> {
    match self {
      Self::Disabled => Ok(()),
      Self::Dir(root) => {
        let path = root.join(key);
        if let Some(parent) = path.parent() {
          tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, body).await?;
        Ok(())
      }
      Self::Http { client, base_url, token } => {
        let mut req = client
          .put(format!("{base_url}/{key}"))
          .header(reqwest::header::CONTENT_TYPE, content_type)
          .body(body);
        if let Some(token) = token {
          req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
          let body = resp.text().await.unwrap_or_default();
          return Err(Error::Status { what: "archive upload", status, body });
        }
        Ok(())
      }
    }
  }
}

impl Archiver for ArchiveSink {
  fn is_enabled(&self) -> bool { !matches!(self, Self::Disabled) }

  async fn archive_debate(&self, record: DebateArchive) -> debate_core::Result<()> {
    let stem = record.key_stem();
    let json = serde_json::to_vec_pretty(&record).map_err(Error::from)?;
    self.put(&format!("{stem}.json"), json, "application/json").await?;
    self
      .put(&format!("{stem}.txt"), record.to_text().into_bytes(), "text/plain")
      .await?;
    tracing::info!(day = record.day_number, key = %stem, "archived debate");
    Ok(())
  }

  async fn archive_index(&self, index: ArchiveIndex) -> debate_core::Result<()> {
    let json = serde_json::to_vec_pretty(&index).map_err(Error::from)?;
    self.put(INDEX_KEY, json, "application/json").await?;
    tracing::debug!(total = index.total_debates, "archive index refreshed");
    Ok(())
  }
}
