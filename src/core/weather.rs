//! Weather forecast abstractions

use crate::core::error::Result;
use crate::core::model::Coordinates;
use async_trait::async_trait;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyForecast {
    pub temperature_2m: Vec<f64>,
    pub precipitation: Vec<f64>,
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn hourly_forecast(
        &self,
        coordinates: Coordinates,
        horizon_days: u32,
    ) -> Result<HourlyForecast>;

    /// HTTP status of a cheap request against the provider, 503 when unreachable.
    async fn probe(&self) -> u16 {
        200
    }
}
