// Error types for the extraction and download pipeline

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::extractors::diagnostics::{diagnose_error, headline, BlockingReason};

#[derive(Debug, Error)]
pub enum DownloadError {
    /// Request is unusable before the engine is involved (blank URL)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The extraction engine could not resolve or fetch the video
    #[error("extraction failed: {message}")]
    Extraction {
        message: String,
        reason: Option<BlockingReason>,
    },

    /// Catalog is empty after filtering
    #[error("no downloadable stream available for this video")]
    StreamNotFound,

    /// Engine reported success but nothing landed on disk
    #[error("engine reported success but no file was found in {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// Scratch directory creation or artifact access failed
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),

    /// Configured backend (python module or binary) is missing
    #[error("extraction engine not available: {0}")]
    EngineUnavailable(String),
}

impl DownloadError {
    /// Build an extraction error from whatever the engine wrote to stderr.
    pub fn from_engine_stderr(stderr: &str) -> Self {
        Self::Extraction {
            message: headline(stderr),
            reason: diagnose_error(stderr),
        }
    }

    /// The engine (or its child process) ran past its time bound
    pub fn timed_out(secs: u64) -> Self {
        Self::Extraction {
            message: format!("timed out after {}s", secs),
            reason: Some(BlockingReason::NetworkTimeout),
        }
    }

    /// Engine misbehaved in a way stderr does not explain (bad JSON, I/O on pipes)
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Extraction {
            message: msg.into(),
            reason: None,
        }
    }

    pub fn reason(&self) -> Option<BlockingReason> {
        match self {
            Self::Extraction { reason, .. } => *reason,
            _ => None,
        }
    }
}
