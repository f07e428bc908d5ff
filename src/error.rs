use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by session stores and config loading.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("session store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode filter value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to parse config {}: {source}", .path.display())]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("could not determine home directory")]
    NoHomeDir,
}

pub type Result<T> = std::result::Result<T, SiftError>;
