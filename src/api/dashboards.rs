use super::error::ApiResult;
use super::state::AppState;
use crate::core::error::DashboardError;
use crate::core::model::Dashboard;
use axum::{
    Json,
    extract::{Path, State},
};

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Dashboard>> {
    Ok(Json(state.aggregator.build_dashboard(&id).await?))
}

/// `GET /dashboards` without an id.
pub async fn missing_id() -> ApiResult<Json<Dashboard>> {
    Err(DashboardError::InvalidId(String::new()).into())
}
