//! Per-platform job state machine.
//!
//! ```text
//! idle ──start──▶ running ──succeed──▶ completed
//!                  │  ▲                    │
//!                  │  └──────start─────────┤
//!                  └──fail──▶ failed ──────┘
//! ```
//!
//! `start` is the only fallible transition and doubles as the gate that keeps
//! at most one job per platform. Every other transition out of a phase other
//! than `running` is a bug in the caller: it is logged, asserted in debug
//! builds, and otherwise ignored.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use dealwatch_core::{JobPhase, JobStatus, Platform};

use crate::StartError;

#[derive(Debug, Default)]
pub struct ProgressTracker {
    jobs: Mutex<HashMap<Platform, JobStatus>>,
}

impl ProgressTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current status; `idle` for a platform never started.
    #[must_use]
    pub fn snapshot(&self, platform: Platform) -> JobStatus {
        let jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&platform)
            .cloned()
            .unwrap_or_else(|| JobStatus::idle(platform))
    }

    /// Moves `platform` to `running`, resetting counters and errors.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::ConcurrentJob`] if a job for `platform` is
    /// already running. The running job's status is left untouched.
    pub fn start(&self, platform: Platform, requested_count: Option<u32>) -> Result<(), StartError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let status = jobs
            .entry(platform)
            .or_insert_with(|| JobStatus::idle(platform));
        if status.phase == JobPhase::Running {
            return Err(StartError::ConcurrentJob(platform));
        }

        *status = JobStatus {
            phase: JobPhase::Running,
            requested_count,
            message: "Starting scrape...".to_owned(),
            started_at: Some(Utc::now()),
            ..JobStatus::idle(platform)
        };
        Ok(())
    }

    /// Counts one processed candidate.
    pub fn tick(&self, platform: Platform, valid: bool) {
        self.update_running(platform, "tick", |status| {
            status.scraped_count += 1;
            if valid {
                status.valid_count += 1;
            }
            status.message = match status.requested_count {
                Some(requested) => format!(
                    "Processed {} of {requested} candidates",
                    status.scraped_count
                ),
                None => format!("Processed {} candidates", status.scraped_count),
            };
        });
    }

    pub fn set_message(&self, platform: Platform, message: impl Into<String>) {
        let message = message.into();
        self.update_running(platform, "set_message", |status| status.message = message);
    }

    pub fn succeed(&self, platform: Platform, candidate_count: u32, message: impl Into<String>) {
        let message = message.into();
        self.update_running(platform, "succeed", |status| {
            status.phase = JobPhase::Completed;
            status.candidate_count = candidate_count;
            status.message = message;
            status.finished_at = Some(Utc::now());
        });
    }

    /// Records a failure. Counters keep their partial values.
    pub fn fail(&self, platform: Platform, error: impl Into<String>) {
        let error = error.into();
        self.update_running(platform, "fail", |status| {
            status.phase = JobPhase::Failed;
            status.message = format!("Scrape failed: {error}");
            status.last_error = Some(error);
            status.finished_at = Some(Utc::now());
        });
    }

    fn update_running(
        &self,
        platform: Platform,
        transition: &'static str,
        apply: impl FnOnce(&mut JobStatus),
    ) {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let phase = jobs.get(&platform).map_or(JobPhase::Idle, |s| s.phase);
        debug_assert!(
            phase == JobPhase::Running,
            "invalid job transition {transition} from {phase:?} for {platform}"
        );
        match jobs.get_mut(&platform) {
            Some(status) if status.phase == JobPhase::Running => apply(status),
            _ => tracing::error!(
                %platform,
                ?phase,
                transition,
                "invalid job transition ignored"
            ),
        }
    }
}
