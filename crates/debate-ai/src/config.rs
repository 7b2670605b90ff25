use std::path::PathBuf;

use serde::Deserialize;

pub const DEFAULT_INFERENCE_URL: &str = "https://inference.do-ai.run/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama3.3-70b-instruct";

/// Chat-completions endpoint settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
  pub url:     String,
  /// Empty means "no provider": the client answers locally.
  pub api_key: String,
  pub model:   String,
}

impl Default for InferenceConfig {
  fn default() -> Self {
    Self {
      url:     DEFAULT_INFERENCE_URL.to_owned(),
      api_key: String::new(),
      model:   DEFAULT_MODEL.to_owned(),
    }
  }
}

/// Where closed debates are archived. `dir` wins over `url`; neither set
/// disables archival.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
  pub dir:   Option<PathBuf>,
  pub url:   Option<String>,
  pub token: Option<String>,
}
