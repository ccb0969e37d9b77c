//! Progress state for the scrape job of one platform.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobPhase {
    Idle,
    Running,
    Completed,
    Failed,
}

/// Snapshot of a platform's most recent (or current) job.
///
/// Overwritten by every new job for the same platform; no history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub platform: Platform,
    pub phase: JobPhase,
    /// How many valid deals the caller asked for. Advisory cap.
    pub requested_count: Option<u32>,
    /// Candidates processed so far, valid or not.
    pub scraped_count: u32,
    /// Candidates that passed validation so far.
    pub valid_count: u32,
    /// Blocks the extractor yielded; set when the job finishes processing.
    pub candidate_count: u32,
    pub message: String,
    /// Present only when `phase` is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobStatus {
    #[must_use]
    pub fn idle(platform: Platform) -> Self {
        Self {
            platform,
            phase: JobPhase::Idle,
            requested_count: None,
            scraped_count: 0,
            valid_count: 0,
            candidate_count: 0,
            message: "Ready".to_owned(),
            last_error: None,
            started_at: None,
            finished_at: None,
        }
    }
}
