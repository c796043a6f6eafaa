use axum::{Json, http::StatusCode};
use serde::Serialize;

pub const BASE_PATH: &str = "/dashboard/v1";
pub const REGISTRATIONS_PATH: &str = "/dashboard/v1/registrations";
pub const DASHBOARDS_PATH: &str = "/dashboard/v1/dashboards";
pub const NOTIFICATIONS_PATH: &str = "/dashboard/v1/notifications";
pub const STATUS_PATH: &str = "/dashboard/v1/status";

#[derive(Debug, Serialize)]
pub struct SiteMapEntry {
    pub path: String,
    pub methods: Vec<&'static str>,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMap {
    pub help: &'static str,
    pub site_map: Vec<SiteMapEntry>,
}

fn entry(path: String, methods: &[&'static str], description: &'static str) -> SiteMapEntry {
    SiteMapEntry {
        path,
        methods: methods.to_vec(),
        description,
    }
}

pub fn site_map() -> SiteMap {
    SiteMap {
        help: "No such endpoint. The endpoints below are served under /dashboard/v1.",
        site_map: vec![
            entry(
                REGISTRATIONS_PATH.to_string(),
                &["GET", "HEAD", "POST"],
                "List dashboard registrations or register a new one",
            ),
            entry(
                format!("{REGISTRATIONS_PATH}/{{id}}"),
                &["GET", "HEAD", "PUT", "DELETE"],
                "Read, replace or remove one registration",
            ),
            entry(
                format!("{DASHBOARDS_PATH}/{{id}}"),
                &["GET", "HEAD"],
                "Compute the dashboard of one registration",
            ),
            entry(
                NOTIFICATIONS_PATH.to_string(),
                &["GET", "HEAD", "POST"],
                "List webhook subscriptions or subscribe a new one",
            ),
            entry(
                format!("{NOTIFICATIONS_PATH}/{{id}}"),
                &["GET", "HEAD", "DELETE"],
                "Read or remove one webhook subscription",
            ),
            entry(
                STATUS_PATH.to_string(),
                &["GET", "HEAD"],
                "Provider and store availability",
            ),
        ],
    }
}

/// Fallback for every unknown path.
pub async fn not_found() -> (StatusCode, Json<SiteMap>) {
    (StatusCode::NOT_FOUND, Json(site_map()))
}
