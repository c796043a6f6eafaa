//! Country facts abstractions

use crate::core::error::Result;
use crate::core::model::CurrencyInfo;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrencyName {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryFacts {
    pub common_name: String,
    pub capitals: Vec<String>,
    pub latlng: Vec<f64>,
    pub area: f64,
    pub population: u64,
    /// Ordered by currency code.
    pub currencies: BTreeMap<String, CurrencyName>,
}

impl CountryFacts {
    /// The lexicographically first currency, if the country has any.
    pub fn primary_currency(&self) -> Option<CurrencyInfo> {
        self.currencies
            .iter()
            .next()
            .map(|(code, currency)| CurrencyInfo {
                code: code.clone(),
                name: currency.name.clone(),
                symbol: currency.symbol.clone(),
            })
    }
}

#[async_trait]
pub trait CountryProvider: Send + Sync {
    async fn lookup_by_iso_code(&self, code: &str) -> Result<CountryFacts>;

    /// HTTP status of a cheap request against the provider, 503 when unreachable.
    async fn probe(&self) -> u16 {
        200
    }
}
