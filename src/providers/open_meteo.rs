use super::util::{decode_json, get_text, probe};
use crate::core::error::{DashboardError, Result};
use crate::core::model::Coordinates;
use crate::core::weather::{HourlyForecast, WeatherProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

const PROVIDER: &str = "open-meteo";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlySeries,
}

#[derive(Debug, Deserialize)]
struct HourlySeries {
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
}

pub struct OpenMeteoProvider {
    base_url: String,
    timezone: String,
    client: Client,
}

impl OpenMeteoProvider {
    pub fn new(base_url: &str, timezone: &str, client: Client) -> Self {
        Self {
            base_url: base_url.to_string(),
            timezone: timezone.to_string(),
            client,
        }
    }

    fn forecast_url(&self, coordinates: Coordinates, horizon_days: u32) -> String {
        format!(
            "{}?latitude={}&longitude={}&hourly=temperature_2m,precipitation&timezone={}&forecast_days={}",
            self.base_url,
            coordinates.latitude,
            coordinates.longitude,
            self.timezone.replace('/', "%2F"),
            horizon_days
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    /// `null` hourly samples are dropped, so they do not count toward the averages.
    #[instrument(
        name = "WeatherFetch",
        skip(self),
        fields(lat = coordinates.latitude, lon = coordinates.longitude)
    )]
    async fn hourly_forecast(
        &self,
        coordinates: Coordinates,
        horizon_days: u32,
    ) -> Result<HourlyForecast> {
        let url = self.forecast_url(coordinates, horizon_days);
        let (status, body) = get_text(&self.client, &url, PROVIDER).await?;
        if !status.is_success() {
            return Err(DashboardError::unavailable(
                PROVIDER,
                format!("HTTP {status}"),
            ));
        }

        let response: ForecastResponse = decode_json(&body, "forecast response")?;
        let forecast = HourlyForecast {
            temperature_2m: response.hourly.temperature_2m.into_iter().flatten().collect(),
            precipitation: response.hourly.precipitation.into_iter().flatten().collect(),
        };
        debug!(
            temperatures = forecast.temperature_2m.len(),
            precipitation = forecast.precipitation.len(),
            "Forecast received"
        );
        Ok(forecast)
    }

    async fn probe(&self) -> u16 {
        probe(
            &self.client,
            &format!("{}?latitude=60.7957&longitude=10.6915", self.base_url),
        )
        .await
    }
}
