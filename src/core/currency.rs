//! Currency rate abstractions

use crate::core::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    pub base_code: String,
    pub rates: HashMap<String, f64>,
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn rates_for(&self, base_code: &str) -> Result<RateTable>;

    /// HTTP status of a cheap request against the provider, 503 when unreachable.
    async fn probe(&self) -> u16 {
        200
    }
}
