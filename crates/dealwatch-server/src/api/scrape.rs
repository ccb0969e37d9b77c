use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use dealwatch_core::Platform;
use dealwatch_pipeline::{JobRequest, StartError};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct StartScrapeBody {
    #[serde(default)]
    url: String,
    platform: Option<String>,
    #[serde(alias = "max_deals")]
    requested_count: Option<u32>,
}

#[derive(Debug, Serialize)]
pub(super) struct StartScrapeResponse {
    success: bool,
    platform: Platform,
    message: String,
}

pub(super) async fn start_scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<StartScrapeBody>, JsonRejection>,
) -> Result<(StatusCode, Json<StartScrapeResponse>), ApiError> {
    let Json(body) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let request = JobRequest::resolve(&body.url, body.platform.as_deref(), body.requested_count)
        .map_err(|e| start_error(&req_id, &e))?;
    let platform = request.platform;

    // The job runs detached; callers poll /api/status.
    state
        .orchestrator
        .start(request)
        .map_err(|e| start_error(&req_id, &e))?;
    tracing::info!(request_id = %req_id.0, %platform, "scrape accepted");

    Ok((
        StatusCode::ACCEPTED,
        Json(StartScrapeResponse {
            success: true,
            platform,
            message: format!("Scraping started for {platform}"),
        }),
    ))
}

fn start_error(req_id: &RequestId, error: &StartError) -> ApiError {
    tracing::info!(request_id = %req_id.0, error = %error, "scrape rejected");
    let status = match error {
        StartError::ConcurrentJob(_) => StatusCode::CONFLICT,
        StartError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
    };
    ApiError::new(status, error.to_string())
}
