use crate::core::error::{DashboardError, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

/// Status reported for a provider that could not be reached at all.
pub const UNREACHABLE: u16 = 503;

/// Builds the client shared by every provider adapter.
pub fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Ok(Client::builder()
        .user_agent(concat!("countrydash/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}

/// Issues a GET and returns the status with the raw body. Transport failures
/// and timeouts surface as `ProviderUnavailable`.
pub async fn get_text(
    client: &Client,
    url: &str,
    provider: &'static str,
) -> Result<(StatusCode, String)> {
    debug!("Requesting {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DashboardError::unavailable(provider, e))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| DashboardError::unavailable(provider, e))?;
    Ok((status, body))
}

/// Parses a provider body, logging the raw text when it does not fit `T`.
pub fn decode_json<T: DeserializeOwned>(body: &str, context: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        error!(
            error = ?e,
            response = %body,
            "Failed to parse {} response", context
        );
        DashboardError::decode(context, e)
    })
}

/// Status code of a GET against `url`, or `UNREACHABLE` on transport failure.
pub async fn probe(client: &Client, url: &str) -> u16 {
    match client.get(url).send().await {
        Ok(response) => response.status().as_u16(),
        Err(e) => {
            debug!(%url, error = %e, "Probe failed");
            UNREACHABLE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Sample {
        value: u32,
    }

    #[tokio::test]
    async fn test_get_text_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .and(header(
                "user-agent",
                concat!("countrydash/", env!("CARGO_PKG_VERSION")),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_secs(3)).unwrap();
        let (status, body) = get_text(&client, &format!("{}/ping", mock_server.uri()), "test")
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "pong");
    }

    #[tokio::test]
    async fn test_get_text_timeout_is_unavailable() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_millis(50)).unwrap();
        let err = get_text(&client, &mock_server.uri(), "slow").await.unwrap_err();
        assert!(matches!(
            err,
            DashboardError::ProviderUnavailable { provider: "slow", .. }
        ));
    }

    #[test]
    fn test_decode_json() {
        let sample: Sample = decode_json(r#"{"value": 7}"#, "sample").unwrap();
        assert_eq!(sample.value, 7);

        let err = decode_json::<Sample>("not json", "sample").unwrap_err();
        assert!(matches!(err, DashboardError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_probe() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(418))
            .mount(&mock_server)
            .await;

        let client = http_client(Duration::from_secs(1)).unwrap();
        assert_eq!(probe(&client, &mock_server.uri()).await, 418);
        assert_eq!(probe(&client, "http://127.0.0.1:9/").await, UNREACHABLE);
    }
}
