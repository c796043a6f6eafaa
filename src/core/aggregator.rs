//! Builds dashboards by merging country facts, an hourly forecast and
//! exchange rates, then projecting the result onto a registration's flags.

use crate::core::country::{CountryFacts, CountryProvider};
use crate::core::currency::{CurrencyRateProvider, RateTable};
use crate::core::error::{DashboardError, Result};
use crate::core::id::is_valid_id;
use crate::core::model::{
    Coordinates, CurrencyInfo, Dashboard, DashboardFeatures, Features, Registration,
};
use crate::core::store::Documents;
use crate::core::weather::{HourlyForecast, WeatherProvider};
use chrono::{DateTime, Utc};
use futures::future::try_join;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Forecast horizon used for the weather averages.
pub const FORECAST_DAYS: u32 = 1;

const ROUNDING_FACTOR: f64 = 100_000.0;

/// Everything computed for a country before projection. Every field comes
/// from exactly one provider.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    pub country: String,
    pub capital: Option<String>,
    pub coordinates: Coordinates,
    pub population: u64,
    pub area: f64,
    pub currency: Option<CurrencyInfo>,
    pub temperature: f64,
    pub precipitation: f64,
    pub target_currencies: BTreeMap<String, f64>,
}

/// The parts of a [`FeatureSet`] derived from the country provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeatures {
    pub country: String,
    pub capital: Option<String>,
    pub coordinates: Coordinates,
    pub population: u64,
    pub area: f64,
    /// Absent for territories the provider lists without a currency.
    pub currency: Option<CurrencyInfo>,
}

impl CountryFeatures {
    pub fn from_facts(iso_code: &str, facts: CountryFacts) -> Result<Self> {
        if facts.common_name.trim().is_empty() {
            return Err(DashboardError::CountryNotFound(iso_code.to_string()));
        }

        let coordinates = match facts.latlng.as_slice() {
            [latitude, longitude, ..] => Coordinates {
                latitude: *latitude,
                longitude: *longitude,
            },
            _ => {
                return Err(DashboardError::decode(
                    format!("country facts for {iso_code}"),
                    "latlng has fewer than two elements",
                ));
            }
        };

        let currency = facts.primary_currency();

        Ok(Self {
            capital: facts.capitals.into_iter().next(),
            country: facts.common_name,
            coordinates,
            population: facts.population,
            area: facts.area,
            currency,
        })
    }
}

/// Arithmetic mean, truncated to five decimals. An empty slice averages to 0.
pub fn truncated_mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    (mean * ROUNDING_FACTOR).trunc() / ROUNDING_FACTOR
}

/// Looks up every target code in the rate table. Missing codes get rate 0.
pub fn select_rates(table: &RateTable, targets: &[String]) -> BTreeMap<String, f64> {
    targets
        .iter()
        .map(|code| {
            let rate = table.rates.get(code).copied().unwrap_or_else(|| {
                debug!(currency = %code, base = %table.base_code, "Exchange rate not found");
                0.0
            });
            (code.clone(), rate)
        })
        .collect()
}

/// Rates used when the country has no currency to quote from.
pub fn zero_rates(targets: &[String]) -> BTreeMap<String, f64> {
    targets.iter().map(|code| (code.clone(), 0.0)).collect()
}

/// Unions the disjoint provider results into one feature set.
pub fn merge(
    country: CountryFeatures,
    forecast: &HourlyForecast,
    target_currencies: BTreeMap<String, f64>,
) -> FeatureSet {
    FeatureSet {
        country: country.country,
        capital: country.capital,
        coordinates: country.coordinates,
        population: country.population,
        area: country.area,
        currency: country.currency,
        temperature: truncated_mean(&forecast.temperature_2m),
        precipitation: truncated_mean(&forecast.precipitation),
        target_currencies,
    }
}

/// Drops every feature the registration did not ask for.
pub fn project(
    registration: &Registration,
    features: FeatureSet,
    last_retrieval: DateTime<Utc>,
) -> Result<Dashboard> {
    if !registration.country.eq_ignore_ascii_case(&features.country) {
        return Err(DashboardError::CountryMismatch {
            registered: registration.country.clone(),
            reported: features.country,
        });
    }

    let Features {
        temperature,
        precipitation,
        capital,
        coordinates,
        population,
        area,
        ..
    } = registration.features;
    let wants_currency = registration.features.wants_currency();

    Ok(Dashboard {
        country: features.country,
        iso_code: registration.iso_code.clone(),
        features: DashboardFeatures {
            temperature: temperature.then_some(features.temperature),
            precipitation: precipitation.then_some(features.precipitation),
            capital: features.capital.filter(|_| capital),
            coordinates: coordinates.then_some(features.coordinates),
            population: population.then_some(features.population),
            area: area.then_some(features.area),
            currency: features.currency.filter(|_| wants_currency),
            target_currencies: wants_currency.then_some(features.target_currencies),
        },
        last_retrieval,
    })
}

pub struct Aggregator {
    registrations: Documents<Registration>,
    countries: Arc<dyn CountryProvider>,
    weather: Arc<dyn WeatherProvider>,
    rates: Arc<dyn CurrencyRateProvider>,
}

impl Aggregator {
    pub fn new(
        registrations: Documents<Registration>,
        countries: Arc<dyn CountryProvider>,
        weather: Arc<dyn WeatherProvider>,
        rates: Arc<dyn CurrencyRateProvider>,
    ) -> Self {
        Self {
            registrations,
            countries,
            weather,
            rates,
        }
    }

    /// Computes the dashboard of the registration stored under `id`. Any
    /// failing step aborts the whole build.
    #[instrument(name = "BuildDashboard", skip(self))]
    pub async fn build_dashboard(&self, id: &str) -> Result<Dashboard> {
        if !is_valid_id(id) {
            return Err(DashboardError::InvalidId(id.to_string()));
        }
        let registration = self.registrations.get(id).await?;

        let features = self.compute_features(&registration).await?;
        let dashboard = project(&registration, features, Utc::now())?;

        info!(iso_code = %dashboard.iso_code, "Dashboard built");
        Ok(dashboard)
    }

    async fn compute_features(&self, registration: &Registration) -> Result<FeatureSet> {
        let iso_code = &registration.iso_code;
        let facts = self.countries.lookup_by_iso_code(iso_code).await?;
        let country = CountryFeatures::from_facts(iso_code, facts)?;
        let targets = &registration.features.target_currencies;
        let forecast = self
            .weather
            .hourly_forecast(country.coordinates, FORECAST_DAYS);

        // Weather and rates only depend on the country facts.
        let (forecast, target_currencies) = match &country.currency {
            Some(currency) => {
                debug!(country = %country.country, currency = %currency.code, "Resolved country");
                let (forecast, table) =
                    try_join(forecast, self.rates.rates_for(&currency.code)).await?;
                (forecast, select_rates(&table, targets))
            }
            None => {
                debug!(country = %country.country, "Resolved country without currency");
                (forecast.await?, zero_rates(targets))
            }
        };

        Ok(merge(country, &forecast, target_currencies))
    }

    /// Probe codes of the country, weather and currency providers.
    pub async fn probe_providers(&self) -> (u16, u16, u16) {
        futures::join!(
            self.countries.probe(),
            self.weather.probe(),
            self.rates.probe()
        )
    }
}
