//! Mapping of domain errors onto HTTP responses.

use crate::core::error::DashboardError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

#[derive(Debug)]
pub struct ApiError(pub DashboardError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            DashboardError::InvalidId(_)
            | DashboardError::InvalidEvent(_)
            | DashboardError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DashboardError::NotFound { .. } | DashboardError::CountryNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            DashboardError::CountryMismatch { .. } => StatusCode::CONFLICT,
            DashboardError::ProviderUnavailable { .. } | DashboardError::Store(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DashboardError::Decode { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match &self.0 {
            DashboardError::InvalidId(_) => "INVALID_ID",
            DashboardError::NotFound { .. } => "NOT_FOUND",
            DashboardError::CountryNotFound(_) => "COUNTRY_NOT_FOUND",
            DashboardError::CountryMismatch { .. } => "COUNTRY_MISMATCH",
            DashboardError::InvalidEvent(_) => "INVALID_EVENT",
            DashboardError::InvalidInput(_) => "INVALID_INPUT",
            DashboardError::ProviderUnavailable { .. } => "PROVIDER_UNAVAILABLE",
            DashboardError::Decode { .. } => "DECODE_ERROR",
            DashboardError::Store(_) => "STORE_UNAVAILABLE",
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self.0, %status, "Request failed");
        } else {
            debug!(error = %self.0, %status, "Request rejected");
        }

        let body = ErrorResponse {
            status: "error",
            code: self.error_code(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::StoreError;
    use axum::body::to_bytes;
    use serde_json::Value;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DashboardError::InvalidId("x".into()), StatusCode::BAD_REQUEST),
            (DashboardError::InvalidEvent("x".into()), StatusCode::BAD_REQUEST),
            (DashboardError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (
                DashboardError::NotFound {
                    collection: "registrations",
                    id: "x".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (DashboardError::CountryNotFound("XX".into()), StatusCode::NOT_FOUND),
            (
                DashboardError::CountryMismatch {
                    registered: "a".into(),
                    reported: "b".into(),
                },
                StatusCode::CONFLICT,
            ),
            (
                DashboardError::unavailable("currency", "down"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DashboardError::Store(StoreError::Backend("down".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                DashboardError::decode("forecast", "eof"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError(err).status_code(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body() {
        let response = ApiError(DashboardError::InvalidEvent("PING".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["code"], "INVALID_EVENT");
        assert_eq!(payload["message"], "invalid event type: 'PING'");
    }
}
