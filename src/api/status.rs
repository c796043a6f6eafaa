use super::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use tracing::warn;

pub const VERSION: &str = "v1";

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub countries_api: u16,
    pub meteo_api: u16,
    pub currency_api: u16,
    pub dashboard_db: u16,
    pub notification_db: u16,
    pub webhooks: usize,
    pub version: &'static str,
    /// Seconds since the server started.
    pub uptime: u64,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    let (countries_api, meteo_api, currency_api) = state.aggregator.probe_providers().await;

    let dashboard_db = match state.registrations.count().await {
        Ok(_) => 200,
        Err(e) => {
            warn!(error = %e, "Registration store unavailable");
            503
        }
    };
    let (notification_db, webhooks) = match state.notifications.count().await {
        Ok(count) => (200, count),
        Err(e) => {
            warn!(error = %e, "Notification store unavailable");
            (503, 0)
        }
    };

    Json(StatusReport {
        countries_api,
        meteo_api,
        currency_api,
        dashboard_db,
        notification_db,
        webhooks,
        version: VERSION,
        uptime: state.started_at.elapsed().as_secs(),
    })
}
