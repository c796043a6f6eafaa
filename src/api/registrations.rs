use super::error::ApiResult;
use super::{checked_id, parse_body};
use super::state::AppState;
use crate::core::error::DashboardError;
use crate::core::model::{Event, Registration, RegistrationRequest};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRegistration {
    pub id: String,
    pub last_change: DateTime<Utc>,
}

pub async fn create(State(state): State<AppState>, body: Bytes) -> ApiResult<Response> {
    let request: RegistrationRequest = parse_body(&body)?;
    let registration = request.into_registration(String::new(), Utc::now())?;

    let id = state.registrations.create(&registration).await?;
    info!(%id, iso_code = %registration.iso_code, "Registration created");

    state
        .notifier
        .notify(Event::Register, &registration.iso_code)
        .await;

    let created = CreatedRegistration {
        id,
        last_change: registration.last_change,
    };
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Registration>>> {
    Ok(Json(state.registrations.list().await?))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let id = checked_id(id)?;
    match state.registrations.get(&id).await {
        Ok(registration) => Ok(Json(registration).into_response()),
        Err(DashboardError::NotFound { .. }) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Replaces the registration. An unknown id changes nothing and fires nothing.
pub async fn replace(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let id = checked_id(id)?;
    let request: RegistrationRequest = parse_body(&body)?;
    let registration = request.into_registration(id.clone(), Utc::now())?;

    match state.registrations.update(&id, &registration).await {
        Ok(()) => {
            info!(%id, iso_code = %registration.iso_code, "Registration updated");
            state
                .notifier
                .notify(Event::Change, &registration.iso_code)
                .await;
        }
        Err(DashboardError::NotFound { .. }) => {
            debug!(%id, "No registration to update");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let id = checked_id(id)?;

    let registration = match state.registrations.get(&id).await {
        Ok(registration) => registration,
        Err(DashboardError::NotFound { .. }) => {
            debug!(%id, "No registration to delete");
            return Ok(StatusCode::NO_CONTENT);
        }
        Err(e) => return Err(e.into()),
    };

    match state.registrations.delete(&id).await {
        Ok(()) => {
            info!(%id, iso_code = %registration.iso_code, "Registration deleted");
            state
                .notifier
                .notify(Event::Delete, &registration.iso_code)
                .await;
        }
        // Deleted concurrently; the other request fired the event.
        Err(DashboardError::NotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(StatusCode::NO_CONTENT)
}
