//! Error types. None of these ever reach the player: audio errors are logged
//! and dropped, config errors are returned to the embedding page.

use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AudioError {
    #[error("no audio backend on this target")]
    Unsupported,
    #[error("audio context unavailable: {0}")]
    Context(String),
    #[error("audio node setup failed: {0}")]
    Node(String),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("round duration {0}s outside 5..=20")]
    RoundSeconds(u32),
    #[error("volume {0} outside 0..=1")]
    Volume(f32),
    #[cfg(feature = "serde_json")]
    #[error("invalid config document: {0}")]
    Json(#[from] serde_json::Error),
}
