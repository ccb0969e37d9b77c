pub mod backup;
pub mod orchestrator;
pub mod progress;
pub mod store;

use std::path::PathBuf;

use dealwatch_core::Platform;
use thiserror::Error;

pub use backup::{restore_backups, BackupWriter};
pub use orchestrator::{JobRequest, Orchestrator};
pub use progress::ProgressTracker;
pub use store::DealStore;

/// Why a job could not be started. Returned synchronously to the caller;
/// never recorded on the tracker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StartError {
    #[error("scrape already running for {0}")]
    ConcurrentJob(Platform),

    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("backup I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("backup JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
