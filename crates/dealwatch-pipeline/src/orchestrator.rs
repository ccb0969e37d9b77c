//! Drives one scrape job end to end: fetch, extract, validate, store.

use std::collections::HashSet;
use std::sync::Arc;

use dealwatch_core::{DealRecord, JobStatus, Platform};
use dealwatch_scraper::{
    parse_target_url, validate, CandidateRecord, ExtractionFault, FetchError, ListingPage,
    PageContent, PageFetcher, ProductDetails,
};
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::backup::BackupWriter;
use crate::progress::ProgressTracker;
use crate::store::DealStore;
use crate::StartError;

const PANIC_MESSAGE: &str = "internal fault: job panicked";

/// A request to scrape one listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub platform: Platform,
    pub url: String,
    /// Cap on candidate blocks read from the page.
    pub requested_count: Option<u32>,
}

impl JobRequest {
    /// Builds a request from loosely typed input.
    ///
    /// An explicit `platform` wins; otherwise the platform is taken from the
    /// URL host. A `requested_count` of zero means no cap.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::InvalidTarget`] when the URL is blank or not an
    /// absolute http(s) URL, when `platform` names no known platform, or when
    /// `platform` is omitted and the host belongs to no known platform.
    pub fn resolve(
        url: &str,
        platform: Option<&str>,
        requested_count: Option<u32>,
    ) -> Result<Self, StartError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(StartError::InvalidTarget("URL is required".to_owned()));
        }
        let target = parse_target_url(url).map_err(|e| StartError::InvalidTarget(e.to_string()))?;

        let platform = match platform.map(str::trim).filter(|p| !p.is_empty()) {
            Some(name) => name
                .parse::<Platform>()
                .map_err(|e| StartError::InvalidTarget(e.to_string()))?,
            None => {
                let host = target.host_str().unwrap_or_default();
                Platform::from_host(host).ok_or_else(|| {
                    StartError::InvalidTarget(format!(
                        "unsupported host \"{host}\"; expected an Amazon or noon URL"
                    ))
                })?
            }
        };

        Ok(Self {
            platform,
            url: url.to_owned(),
            requested_count: requested_count.filter(|&n| n > 0),
        })
    }
}

#[derive(Debug, Error)]
enum JobError {
    #[error("failed to fetch listing page: {0}")]
    Fetch(#[from] FetchError),

    #[error("failed to read listing page: {0}")]
    Extraction(#[from] ExtractionFault),
}

#[derive(Default)]
struct Harvest {
    deals: Vec<DealRecord>,
    seen: HashSet<String>,
    candidates: u32,
}

/// Owns the shared job state and runs jobs against it.
///
/// Cheap to clone; clones share the fetcher, tracker and store.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    fetcher: Arc<PageFetcher>,
    tracker: Arc<ProgressTracker>,
    store: Arc<DealStore>,
    backup: Option<BackupWriter>,
    detail_pages: bool,
}

impl Orchestrator {
    #[must_use]
    pub fn new(fetcher: PageFetcher, store: Arc<DealStore>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            tracker: Arc::new(ProgressTracker::new()),
            store,
            backup: None,
            detail_pages: false,
        }
    }

    /// Mirrors every completed collection to disk via `backup`.
    #[must_use]
    pub fn with_backup(mut self, backup: BackupWriter) -> Self {
        self.backup = Some(backup);
        self
    }

    /// Fetches each candidate's product page and overlays its fields before
    /// validation. Product pages go through the same fetcher, so they share
    /// the platform throttle and retry policy.
    #[must_use]
    pub fn with_detail_pages(mut self, enabled: bool) -> Self {
        self.detail_pages = enabled;
        self
    }

    #[must_use]
    pub fn store(&self) -> &DealStore {
        &self.store
    }

    #[must_use]
    pub fn status(&self, platform: Platform) -> JobStatus {
        self.tracker.snapshot(platform)
    }

    /// Claims the platform and runs the job in the background.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::ConcurrentJob`] when a job for the same platform
    /// is still running. Nothing is spawned in that case.
    pub fn start(&self, mut request: JobRequest) -> Result<JoinHandle<()>, StartError> {
        request.requested_count = request.requested_count.filter(|&n| n > 0);
        self.tracker.start(request.platform, request.requested_count)?;
        tracing::info!(
            platform = %request.platform,
            url = %request.url,
            requested_count = ?request.requested_count,
            "scrape job started"
        );
        let this = self.clone();
        Ok(tokio::spawn(async move { this.supervise(request).await }))
    }

    /// Runs a job in the foreground and returns its final status.
    ///
    /// # Errors
    ///
    /// Same as [`start`](Self::start).
    pub async fn run(&self, request: JobRequest) -> Result<JobStatus, StartError> {
        let platform = request.platform;
        if let Err(e) = self.start(request)?.await {
            tracing::error!(%platform, error = %e, "scrape supervisor aborted");
        }
        Ok(self.tracker.snapshot(platform))
    }

    /// Runs the job body in its own task so a panic in it still ends the job.
    async fn supervise(&self, request: JobRequest) {
        let platform = request.platform;
        let this = self.clone();
        let job = tokio::spawn(async move { this.execute(request).await });
        if let Err(e) = job.await {
            tracing::error!(%platform, error = %e, "scrape job aborted");
            self.tracker.fail(platform, PANIC_MESSAGE);
        }
    }

    async fn execute(&self, request: JobRequest) {
        let platform = request.platform;
        match self.collect(&request).await {
            Ok(harvest) => {
                let valid = harvest.deals.len();
                let deals = self.store.replace(platform, harvest.deals);
                if let Some(backup) = &self.backup {
                    backup.spawn_write(platform, deals);
                }
                let message = format!(
                    "Scraped {valid} valid deals out of {} candidates",
                    harvest.candidates
                );
                tracing::info!(
                    %platform,
                    valid,
                    candidates = harvest.candidates,
                    "scrape job completed"
                );
                self.tracker.succeed(platform, harvest.candidates, message);
            }
            Err(e) => {
                tracing::warn!(%platform, url = %request.url, error = %e, "scrape job failed");
                self.tracker.fail(platform, e.to_string());
            }
        }
    }

    async fn collect(&self, request: &JobRequest) -> Result<Harvest, JobError> {
        let platform = request.platform;
        self.tracker.set_message(platform, "Fetching listing page...");
        let page = self.fetcher.fetch(platform, &request.url).await?;

        self.tracker.set_message(platform, "Extracting deals...");
        let candidates = read_listing(platform, &page, request.requested_count)?;

        let total = candidates.len();
        let mut fetched = HashSet::new();
        let mut harvest = Harvest::default();
        for (i, mut candidate) in candidates.into_iter().enumerate() {
            if self.detail_pages {
                if let Some(url) = candidate.product_url.clone() {
                    if fetched.insert(url.clone()) {
                        self.tracker.set_message(
                            platform,
                            format!("Fetching product {} of {total}...", i + 1),
                        );
                        self.enrich(platform, &url, &mut candidate).await;
                    }
                }
            }
            let accepted = harvest.admit(platform, candidate);
            self.tracker.tick(platform, accepted);
        }

        Ok(harvest)
    }

    /// Overlays the product page at `url` onto `candidate`. A page that
    /// cannot be fetched or read leaves the listing fields in place.
    async fn enrich(&self, platform: Platform, url: &str, candidate: &mut CandidateRecord) {
        let page = match self.fetcher.fetch(platform, url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(
                    %platform,
                    %url,
                    error = %e,
                    "product page fetch failed, keeping listing fields"
                );
                return;
            }
        };
        match ProductDetails::parse(platform, &page) {
            Ok(details) => candidate.enrich(details),
            Err(e) => {
                tracing::debug!(
                    %platform,
                    %url,
                    error = %e,
                    "product page unreadable, keeping listing fields"
                );
            }
        }
    }
}

impl Harvest {
    /// Validates one candidate and keeps it unless its id was already seen.
    fn admit(&mut self, platform: Platform, candidate: CandidateRecord) -> bool {
        self.candidates += 1;
        match validate(candidate) {
            Ok(deal) if self.seen.insert(deal.id.clone()) => {
                self.deals.push(deal);
                true
            }
            Ok(deal) => {
                tracing::debug!(%platform, id = %deal.id, "duplicate deal skipped");
                false
            }
            Err(reason) => {
                tracing::debug!(%platform, %reason, "candidate rejected");
                false
            }
        }
    }
}

/// Reads up to `requested_count` candidates off a listing page. Synchronous:
/// the parsed document is not `Send` and must not live across an await.
fn read_listing(
    platform: Platform,
    page: &PageContent,
    requested_count: Option<u32>,
) -> Result<Vec<CandidateRecord>, ExtractionFault> {
    let listing = ListingPage::parse(platform, page)?;
    let limit = requested_count.map(|n| usize::try_from(n).unwrap_or(usize::MAX));
    Ok(listing.candidates(limit).collect())
}
