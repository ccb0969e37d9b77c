pub mod client;
pub mod error;
pub mod extract;
pub mod rate_limit;
pub mod throttle;
pub mod validate;

pub use client::{parse_target_url, FetchPolicy, PageContent, PageFetcher};
pub use error::{ExtractionFault, FetchError};
pub use extract::{CandidateRecord, ListingPage, ProductDetails};
pub use rate_limit::BackoffPolicy;
pub use throttle::{Throttle, ThrottleRange};
pub use validate::{validate, RejectReason};
