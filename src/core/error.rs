//! Error taxonomy shared by the aggregator, the notifier and the HTTP layer.

use crate::core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("invalid id: '{0}'")]
    InvalidId(String),

    #[error("no document with id '{id}' in collection '{collection}'")]
    NotFound { collection: &'static str, id: String },

    #[error("country not found for ISO code '{0}'")]
    CountryNotFound(String),

    #[error("country does not match: registered '{registered}', provider reports '{reported}'")]
    CountryMismatch {
        registered: String,
        reported: String,
    },

    #[error("invalid event type: '{0}'")]
    InvalidEvent(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{provider} unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    #[error("failed to decode {context}: {reason}")]
    Decode { context: String, reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DashboardError {
    pub fn unavailable(provider: &'static str, reason: impl ToString) -> Self {
        Self::ProviderUnavailable {
            provider,
            reason: reason.to_string(),
        }
    }

    pub fn decode(context: impl Into<String>, reason: impl ToString) -> Self {
        Self::Decode {
            context: context.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = DashboardError> = std::result::Result<T, E>;
