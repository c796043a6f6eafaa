//! Stored documents and the derived dashboard view.

use crate::core::error::DashboardError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

fn is_alpha2(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Which dashboard features a registration asks for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Features {
    pub temperature: bool,
    pub precipitation: bool,
    pub capital: bool,
    pub coordinates: bool,
    pub population: bool,
    pub area: bool,
    pub target_currencies: Vec<String>,
}

impl Features {
    pub fn all(target_currencies: &[&str]) -> Self {
        Self {
            temperature: true,
            precipitation: true,
            capital: true,
            coordinates: true,
            population: true,
            area: true,
            target_currencies: target_currencies.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn wants_currency(&self) -> bool {
        !self.target_currencies.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    #[serde(default)]
    pub id: String,
    pub country: String,
    pub iso_code: String,
    #[serde(default)]
    pub features: Features,
    pub last_change: DateTime<Utc>,
}

/// Body of `POST`/`PUT /registrations`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub iso_code: String,
    #[serde(default)]
    pub features: Features,
}

impl RegistrationRequest {
    /// Normalizes the request into a registration stamped with `now`.
    pub fn into_registration(
        self,
        id: String,
        now: DateTime<Utc>,
    ) -> Result<Registration, DashboardError> {
        let iso_code = self.iso_code.trim().to_uppercase();
        if !is_alpha2(&iso_code) {
            return Err(DashboardError::InvalidInput(format!(
                "isoCode must be two letters, got '{}'",
                self.iso_code
            )));
        }
        let country = self.country.trim().to_string();
        if country.is_empty() {
            return Err(DashboardError::InvalidInput("country is required".to_string()));
        }

        let mut features = self.features;
        features.target_currencies = features
            .target_currencies
            .iter()
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty())
            .collect();

        Ok(Registration {
            id,
            country,
            iso_code,
            features,
            last_change: now,
        })
    }
}

/// The closed set of registration lifecycle events a webhook can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Event {
    Register,
    Change,
    Delete,
    /// Reserved for dashboard computation; matchable but never fired.
    Invoke,
}

impl Event {
    pub const ALL: [Event; 4] = [Event::Register, Event::Change, Event::Delete, Event::Invoke];
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Event::Register => "REGISTER",
                Event::Change => "CHANGE",
                Event::Delete => "DELETE",
                Event::Invoke => "INVOKE",
            }
        )
    }
}

impl FromStr for Event {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "REGISTER" => Ok(Event::Register),
            "CHANGE" => Ok(Event::Change),
            "DELETE" => Ok(Event::Delete),
            "INVOKE" => Ok(Event::Invoke),
            _ => Err(DashboardError::InvalidEvent(s.to_string())),
        }
    }
}

/// A webhook subscription. An empty `country` matches every country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(default)]
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub country: String,
    pub event: Event,
    #[serde(default)]
    pub last_invoke: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn matches(&self, event: Event, iso_code: &str) -> bool {
        self.event == event && (self.country.is_empty() || self.country == iso_code)
    }
}

/// Body of `POST /notifications`. The event stays a string so that an
/// unknown value is reported as an invalid event rather than a bad body.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub event: String,
}

impl NotificationRequest {
    pub fn into_notification(self) -> Result<Notification, DashboardError> {
        let event = self.event.parse::<Event>()?;
        let url = self.url.trim().to_string();
        if url.is_empty() {
            return Err(DashboardError::InvalidInput("url is required".to_string()));
        }
        let country = self.country.trim().to_uppercase();
        if !country.is_empty() && !is_alpha2(&country) {
            return Err(DashboardError::InvalidInput(format!(
                "country must be empty or two letters, got '{}'",
                self.country
            )));
        }

        Ok(Notification {
            id: String::new(),
            url,
            country,
            event,
            last_invoke: None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub code: String,
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFeatures {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_currencies: Option<BTreeMap<String, f64>>,
}

/// The computed, filtered view of one registration. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub country: String,
    pub iso_code: String,
    pub features: DashboardFeatures,
    pub last_retrieval: DateTime<Utc>,
}
