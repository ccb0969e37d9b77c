use axum::{
    extract::{Query, State},
    Json,
};
use dealwatch_core::JobStatus;

use super::{ApiError, AppState, PlatformQuery};

pub(super) async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<PlatformQuery>,
) -> Result<Json<JobStatus>, ApiError> {
    let platform = query.resolve()?;
    Ok(Json(state.orchestrator.status(platform)))
}
