pub mod backend;
pub mod bench;
pub mod core;
pub mod engine;

pub mod list_cmd;
pub mod plan_cmd;
pub mod run_cmd;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("toolchain discovery unavailable: {0}")]
    DiscoverySourceUnavailable(String),
    #[error("malformed version label {label:?}: field {field:?} {reason}")]
    MalformedVersionLabel {
        label: String,
        field: String,
        reason: String,
    },
    #[error("failed to activate toolchain {}: {cause}", .path.display())]
    Switch { path: PathBuf, cause: String },
    #[error("invalid selection {input:?}: expected 1-{count}, 'a' or empty")]
    InvalidSelection { input: String, count: usize },
    #[error("benchmark group {group:?} failed: {status}")]
    Execution { group: String, status: String },
    #[error("failed to restore original toolchain: {reason}")]
    RestoreFailure { reason: String },
    #[error("invalid config: {0}")]
    Config(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type HarnessResult<T> = Result<T, HarnessError>;
