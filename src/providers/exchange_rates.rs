use super::util::{decode_json, get_text, probe};
use crate::core::currency::{CurrencyRateProvider, RateTable};
use crate::core::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

const PROVIDER: &str = "currency";

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    result: String,
    #[serde(default)]
    base_code: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

pub struct ExchangeRateProvider {
    base_url: String,
    client: Client,
}

impl ExchangeRateProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateProvider {
    #[instrument(name = "RatesFetch", skip(self), fields(base = %base_code))]
    async fn rates_for(&self, base_code: &str) -> Result<RateTable> {
        let url = format!("{}/{}", self.base_url, base_code.to_uppercase());
        let (status, body) = get_text(&self.client, &url, PROVIDER).await?;
        if !status.is_success() {
            return Err(DashboardError::unavailable(
                PROVIDER,
                format!("HTTP {status}"),
            ));
        }

        let response: RatesResponse = decode_json(&body, "currency response")?;
        if response.result == "error" {
            return Err(DashboardError::unavailable(
                PROVIDER,
                format!("no rates for {base_code}"),
            ));
        }
        debug!(count = response.rates.len(), "Rates received");

        Ok(RateTable {
            base_code: if response.base_code.is_empty() {
                base_code.to_uppercase()
            } else {
                response.base_code
            },
            rates: response.rates,
        })
    }

    async fn probe(&self) -> u16 {
        probe(&self.client, &format!("{}/nok", self.base_url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::util::http_client;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(code: &str, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/currency/{code}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(mock_server: &MockServer) -> ExchangeRateProvider {
        ExchangeRateProvider::new(
            &format!("{}/currency/", mock_server.uri()),
            http_client(Duration::from_secs(3)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_rates_for() {
        let mock_server = create_mock_server(
            "NOK",
            r#"{"result": "success", "base_code": "NOK", "rates": {"NOK": 1, "EUR": 0.087, "USD": 0.094}}"#,
        )
        .await;

        let table = provider(&mock_server).rates_for("nok").await.unwrap();

        assert_eq!(table.base_code, "NOK");
        assert_eq!(table.rates.len(), 3);
        assert_eq!(table.rates["EUR"], 0.087);
        assert_eq!(table.rates["NOK"], 1.0);
    }

    #[tokio::test]
    async fn test_error_result_is_unavailable() {
        let mock_server = create_mock_server(
            "XXX",
            r#"{"result": "error", "error-type": "unsupported-code"}"#,
        )
        .await;

        let err = provider(&mock_server).rates_for("XXX").await.unwrap_err();
        assert!(matches!(
            err,
            DashboardError::ProviderUnavailable { provider: "currency", .. }
        ));
    }

    #[tokio::test]
    async fn test_malformed_rates_is_decode_error() {
        let mock_server =
            create_mock_server("NOK", r#"{"result": "success", "rates": {"EUR": "high"}}"#).await;

        let err = provider(&mock_server).rates_for("NOK").await.unwrap_err();
        assert!(matches!(err, DashboardError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_is_unavailable() {
        let provider = ExchangeRateProvider::new(
            "http://127.0.0.1:9/currency",
            http_client(Duration::from_secs(1)).unwrap(),
        );
        let err = provider.rates_for("NOK").await.unwrap_err();
        assert!(matches!(err, DashboardError::ProviderUnavailable { .. }));
        assert_eq!(provider.probe().await, 503);
    }
}
