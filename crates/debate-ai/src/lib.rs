//! HTTP implementations of the engine's external collaborators.
//!
//! - [`InferenceClient`] talks to an OpenAI-compatible chat-completions
//!   endpoint and implements topic generation, moderation and commentary.
//!   With no API key it answers with deterministic local responses.
//! - [`ArchiveSink`] writes closed-debate records to a directory, to an
//!   object store over HTTP `PUT`, or nowhere.

mod archive;
mod config;
mod inference;
mod prompts;

pub mod error;

pub use archive::ArchiveSink;
pub use config::{ArchiveConfig, InferenceConfig};
pub use error::{Error, Result};
pub use inference::InferenceClient;
