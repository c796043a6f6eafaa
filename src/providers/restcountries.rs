use super::util::{decode_json, get_text, probe};
use crate::core::country::{CountryFacts, CountryProvider, CurrencyName};
use crate::core::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

const PROVIDER: &str = "restcountries";
const FIELDS: &str = "name,cca2,currencies,capital,latlng,area,population";

#[derive(Debug, Deserialize)]
struct CountryName {
    #[serde(default)]
    common: String,
}

#[derive(Debug, Deserialize)]
struct CountryResponse {
    name: CountryName,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    latlng: Vec<f64>,
    #[serde(default)]
    area: f64,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    currencies: BTreeMap<String, CurrencyName>,
}

/// Lookups by code answer with a bare object when `fields` is given, but some
/// mirrors still wrap it in a single-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LookupResponse {
    One(CountryResponse),
    Many(Vec<CountryResponse>),
}

impl From<CountryResponse> for CountryFacts {
    fn from(country: CountryResponse) -> Self {
        CountryFacts {
            common_name: country.name.common,
            capitals: country.capital,
            latlng: country.latlng,
            area: country.area,
            population: country.population,
            currencies: country.currencies,
        }
    }
}

pub struct RestCountriesProvider {
    base_url: String,
    client: Client,
}

impl RestCountriesProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[async_trait]
impl CountryProvider for RestCountriesProvider {
    #[instrument(name = "CountryLookup", skip(self), fields(code = %code))]
    async fn lookup_by_iso_code(&self, code: &str) -> Result<CountryFacts> {
        let url = format!("{}/alpha/{}?fields={}", self.base_url, code, FIELDS);
        let (status, body) = get_text(&self.client, &url, PROVIDER).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(DashboardError::CountryNotFound(code.to_string()));
        }
        if !status.is_success() {
            return Err(DashboardError::unavailable(
                PROVIDER,
                format!("HTTP {status}"),
            ));
        }

        let country = match decode_json::<LookupResponse>(&body, "country response")? {
            LookupResponse::One(country) => country,
            LookupResponse::Many(countries) => countries
                .into_iter()
                .next()
                .ok_or_else(|| DashboardError::CountryNotFound(code.to_string()))?,
        };

        if country.name.common.is_empty() {
            return Err(DashboardError::CountryNotFound(code.to_string()));
        }
        debug!(country = %country.name.common, "Country found");
        Ok(country.into())
    }

    async fn probe(&self) -> u16 {
        probe(&self.client, &format!("{}/all?fields=name", self.base_url)).await
    }
}
