// Error types for config persistence and file selection

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the save/load actions
#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("cannot access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// The user dismissed a file dialog. Never shown to the user.
    #[error("selection cancelled")]
    SelectionCancelled,
}

impl OverlayError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Short label naming the failure kind, used as the notice title
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io { .. } => "I/O error",
            Self::Parse { .. } => "Parse error",
            Self::SelectionCancelled => "Selection cancelled",
        }
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;
