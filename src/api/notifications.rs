use super::error::ApiResult;
use super::{checked_id, parse_body};
use super::state::AppState;
use crate::core::model::{Notification, NotificationRequest};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct CreatedNotification {
    pub id: String,
}

pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CreatedNotification>)> {
    let request: NotificationRequest = parse_body(&body)?;
    let notification = request.into_notification()?;

    let id = state.notifications.create(&notification).await?;
    info!(
        %id,
        event = %notification.event,
        country = %notification.country,
        "Notification registered"
    );
    Ok((StatusCode::CREATED, Json(CreatedNotification { id })))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Notification>>> {
    Ok(Json(state.notifications.list().await?))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Notification>> {
    let id = checked_id(id)?;
    Ok(Json(state.notifications.get(&id).await?))
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = checked_id(id)?;
    state.notifications.delete(&id).await?;
    info!(%id, "Notification deleted");
    Ok(StatusCode::NO_CONTENT)
}
