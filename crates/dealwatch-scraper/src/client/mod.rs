//! HTTP client for platform listing pages.

mod identity;
mod origin;

use std::time::Duration;

use dealwatch_core::{AppConfig, Platform};
use reqwest::{Client, Url};

use crate::error::FetchError;
use crate::rate_limit::{retry_with_backoff, BackoffPolicy};
use crate::throttle::{Throttle, ThrottleRange};

use identity::UserAgentPool;

pub use origin::{absolutize_asset_url, absolutize_product_url, parse_target_url};

/// Everything that shapes how pages are requested.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub timeout: Duration,
    pub backoff: BackoffPolicy,
    pub throttle: ThrottleRange,
    pub user_agents: Vec<String>,
}

impl FetchPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.scraper_request_timeout_secs),
            backoff: BackoffPolicy {
                max_retries: config.scraper_max_retries,
                base_delay_ms: config.scraper_retry_backoff_base_ms,
                max_delay_ms: config.scraper_retry_backoff_max_ms,
            },
            throttle: ThrottleRange {
                min_ms: config.scraper_min_delay_ms,
                max_ms: config.scraper_max_delay_ms,
            },
            user_agents: config.scraper_user_agents.clone(),
        }
    }
}

/// Raw body of a successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContent {
    /// URL that was requested. Relative links on the page resolve against it.
    pub url: String,
    pub body: String,
}

impl PageContent {
    #[must_use]
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: body.into(),
        }
    }
}

/// Rate-limited, retrying page fetcher.
///
/// One instance is shared by every job in the process so the per-platform
/// rate-limit clock is shared too.
#[derive(Debug)]
pub struct PageFetcher {
    client: Client,
    backoff: BackoffPolicy,
    throttle: Throttle,
    identities: UserAgentPool,
}

impl PageFetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(policy: FetchPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(policy.timeout)
            .connect_timeout(policy.timeout.min(Duration::from_secs(10)))
            .build()?;
        Ok(Self {
            client,
            backoff: policy.backoff,
            throttle: Throttle::new(policy.throttle),
            identities: UserAgentPool::new(policy.user_agents),
        })
    }

    /// Fetches `url` on behalf of `platform`.
    ///
    /// Every attempt waits on the platform's rate-limit clock and sends the
    /// next identity from the pool.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`]: `url` is not an absolute http(s) URL.
    /// - [`FetchError::ClientStatus`]: any 4xx, returned without retrying.
    /// - [`FetchError::ServerStatus`] / [`FetchError::Http`]: transient
    ///   failure that persisted through every retry.
    pub async fn fetch(&self, platform: Platform, url: &str) -> Result<PageContent, FetchError> {
        let target = parse_target_url(url)?;

        retry_with_backoff(&self.backoff, || {
            let target = target.clone();
            async move {
                self.throttle.acquire(platform).await;
                let user_agent = self.identities.next();
                tracing::debug!(%platform, url = %target, "fetching page");
                self.fetch_once(target, user_agent).await
            }
        })
        .await
    }

    async fn fetch_once(&self, target: Url, user_agent: &str) -> Result<PageContent, FetchError> {
        let url = target.to_string();
        let response = self
            .client
            .get(target)
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(FetchError::ClientStatus {
                status: status.as_u16(),
                url,
            });
        }
        if !status.is_success() {
            return Err(FetchError::ServerStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.text().await?;
        Ok(PageContent { url, body })
    }
}
