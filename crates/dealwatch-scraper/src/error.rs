use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid target URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// 4xx response. The page is missing or we are blocked; never retried.
    #[error("HTTP {status} from {url}")]
    ClientStatus { status: u16, url: String },

    /// 5xx response. Retried per the backoff policy.
    #[error("server error {status} from {url}")]
    ServerStatus { status: u16, url: String },
}

/// Page-level structural failure. Aborts the job without touching the store.
#[derive(Debug, Error)]
pub enum ExtractionFault {
    #[error("page from {url} has no document body")]
    EmptyDocument { url: String },

    #[error("page URL \"{url}\" cannot be used to resolve links")]
    InvalidBaseUrl { url: String },
}
