use crate::core::model::{Notification, Registration};
use crate::core::store::{DocumentStore, Documents, NOTIFICATIONS, REGISTRATIONS};
use crate::core::{Aggregator, CountryProvider, CurrencyRateProvider, Notifier, WeatherProvider};
use std::sync::Arc;
use std::time::Instant;

/// Shared handler state. Cloned per request, so everything heavy sits behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub registrations: Documents<Registration>,
    pub notifications: Documents<Notification>,
    pub aggregator: Arc<Aggregator>,
    pub notifier: Arc<Notifier>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        countries: Arc<dyn CountryProvider>,
        weather: Arc<dyn WeatherProvider>,
        rates: Arc<dyn CurrencyRateProvider>,
        webhook_client: reqwest::Client,
    ) -> Self {
        let registrations = Documents::new(Arc::clone(&store), REGISTRATIONS);
        let notifications = Documents::new(store, NOTIFICATIONS);
        let aggregator = Aggregator::new(registrations.clone(), countries, weather, rates);
        let notifier = Notifier::new(notifications.clone(), webhook_client);

        Self {
            registrations,
            notifications,
            aggregator: Arc::new(aggregator),
            notifier: Arc::new(notifier),
            started_at: Instant::now(),
        }
    }
}
