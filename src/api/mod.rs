//! HTTP surface served under `/dashboard/v1`.

mod dashboards;
pub mod error;
mod notifications;
mod registrations;
pub mod sitemap;
pub mod state;
mod status;

use crate::core::error::DashboardError;
use crate::core::id::is_valid_id;
use axum::Router;
use axum::routing::get;
use serde::de::DeserializeOwned;
use sitemap::{DASHBOARDS_PATH, NOTIFICATIONS_PATH, REGISTRATIONS_PATH, STATUS_PATH};
pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let registration_collection = get(registrations::list).post(registrations::create);
    let registration_item = get(registrations::get_one)
        .put(registrations::replace)
        .delete(registrations::remove);
    let notification_collection = get(notifications::list).post(notifications::create);
    let notification_item = get(notifications::get_one).delete(notifications::remove);

    Router::new()
        .route(REGISTRATIONS_PATH, registration_collection.clone())
        .route(&format!("{REGISTRATIONS_PATH}/"), registration_collection)
        .route(&format!("{REGISTRATIONS_PATH}/{{id}}"), registration_item)
        .route(DASHBOARDS_PATH, get(dashboards::missing_id))
        .route(&format!("{DASHBOARDS_PATH}/"), get(dashboards::missing_id))
        .route(&format!("{DASHBOARDS_PATH}/{{id}}"), get(dashboards::get_one))
        .route(NOTIFICATIONS_PATH, notification_collection.clone())
        .route(&format!("{NOTIFICATIONS_PATH}/"), notification_collection)
        .route(&format!("{NOTIFICATIONS_PATH}/{{id}}"), notification_item)
        .route(STATUS_PATH, get(status::status))
        .route(&format!("{STATUS_PATH}/"), get(status::status))
        .fallback(sitemap::not_found)
        .with_state(state)
}

/// Decodes a JSON request body regardless of the declared content type.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, DashboardError> {
    serde_json::from_slice(body)
        .map_err(|e| DashboardError::InvalidInput(format!("malformed JSON body: {e}")))
}

pub(crate) fn checked_id(id: String) -> Result<String, DashboardError> {
    if is_valid_id(&id) {
        Ok(id)
    } else {
        Err(DashboardError::InvalidId(id))
    }
}
