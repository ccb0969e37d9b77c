use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    Json,
};
use dealwatch_core::{DealRecord, Platform};
use serde::Serialize;

use super::{ApiError, AppState, PlatformQuery};

#[derive(Debug, Serialize)]
struct DealsResponse<'a> {
    success: bool,
    platform: Platform,
    deals: &'a [DealRecord],
    count: usize,
}

/// Last completed collection for the platform, even while a new job runs.
pub(super) async fn list_deals(
    State(state): State<AppState>,
    Query(query): Query<PlatformQuery>,
) -> Result<Response, ApiError> {
    let platform = query.resolve()?;
    let deals = state.orchestrator.store().read(platform);

    Ok(Json(DealsResponse {
        success: true,
        platform,
        deals: &deals,
        count: deals.len(),
    })
    .into_response())
}
