//! Core business logic abstractions

pub mod aggregator;
pub mod config;
pub mod country;
pub mod currency;
pub mod error;
pub mod id;
pub mod log;
pub mod model;
pub mod notifier;
pub mod store;
pub mod weather;

// Re-export main types for cleaner imports
pub use aggregator::Aggregator;
pub use country::{CountryFacts, CountryProvider};
pub use currency::{CurrencyRateProvider, RateTable};
pub use error::{DashboardError, Result};
pub use notifier::Notifier;
pub use store::{DocumentStore, Documents, StoreError};
pub use weather::{HourlyForecast, WeatherProvider};
