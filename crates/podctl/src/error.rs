use std::path::PathBuf;

use podctl_core::ConfigError;
use podctl_web::input_parser::ScriptParseError;
use podctl_web::session_record::{ReplayError, ReplayMismatch};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PodctlError>;

#[derive(Debug, Error)]
pub enum PodctlError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("{}: {source}", .path.display())]
    Script {
        path: PathBuf,
        #[source]
        source: ScriptParseError,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("replay failed: {0}")]
    Replay(#[from] ReplayError),

    #[error("trace diverged at input {seq}: {mismatch}")]
    Diverged {
        seq: u64,
        mismatch: ReplayMismatch,
    },

    #[error("trace summary does not match replay: {detail}")]
    Summary { detail: String },
}

impl PodctlError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Diverged { .. } | Self::Summary { .. } => 1,
            Self::Script { .. } | Self::Json { .. } | Self::Config(_) | Self::Replay(_) => 2,
            Self::Read { .. } | Self::Write { .. } | Self::Output(_) | Self::Encode(_) => 3,
        }
    }
}
