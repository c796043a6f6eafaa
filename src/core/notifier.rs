//! Webhook matching and delivery.
//!
//! Delivery is at-most-once and best-effort: every matching subscription gets
//! a single POST attempt, failures are logged and never retried, and nothing
//! here can fail the request that triggered it.

use crate::core::error::Result;
use crate::core::model::{Event, Notification};
use crate::core::store::Documents;
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

pub struct Notifier {
    notifications: Documents<Notification>,
    client: reqwest::Client,
}

impl Notifier {
    pub fn new(notifications: Documents<Notification>, client: reqwest::Client) -> Self {
        Self {
            notifications,
            client,
        }
    }

    /// Every stored notification subscribed to `event` for `iso_code`, wildcard
    /// subscriptions included. `event` must name one of the known events.
    pub async fn find_matching(&self, event: &str, iso_code: &str) -> Result<Vec<Notification>> {
        let event = event.parse::<Event>()?;
        self.find_matching_event(event, iso_code).await
    }

    pub async fn find_matching_event(
        &self,
        event: Event,
        iso_code: &str,
    ) -> Result<Vec<Notification>> {
        let matching: Vec<_> = self
            .notifications
            .list()
            .await?
            .into_iter()
            .filter(|notification| notification.matches(event, iso_code))
            .collect();
        debug!(%event, %iso_code, count = matching.len(), "Matched notifications");
        Ok(matching)
    }

    /// Stamps `lastInvoke`, persists it, then POSTs the notification to its url.
    /// Delivery is skipped when the timestamp cannot be persisted.
    #[instrument(name = "Dispatch", skip(self, notification), fields(id = %notification.id))]
    pub async fn dispatch(&self, mut notification: Notification) {
        notification.last_invoke = Some(Utc::now());

        if let Err(e) = self
            .notifications
            .update(&notification.id, &notification)
            .await
        {
            warn!(error = %e, "Failed to persist lastInvoke, skipping delivery");
            return;
        }

        match self
            .client
            .post(&notification.url)
            .json(&notification)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!(url = %notification.url, status = %response.status(), "Webhook delivered");
            }
            Ok(response) => {
                warn!(url = %notification.url, status = %response.status(), "Webhook rejected");
            }
            Err(e) => {
                warn!(url = %notification.url, error = %e, "Webhook delivery failed");
            }
        }
    }

    /// Fires `event` for `iso_code`: dispatches every match, one after another.
    /// Returns how many notifications were dispatched.
    pub async fn notify(&self, event: Event, iso_code: &str) -> usize {
        let matching = match self.find_matching_event(event, iso_code).await {
            Ok(matching) => matching,
            Err(e) => {
                warn!(%event, %iso_code, error = %e, "Failed to look up notifications");
                return 0;
            }
        };

        let count = matching.len();
        for notification in matching {
            self.dispatch(notification).await;
        }
        if count > 0 {
            info!(%event, %iso_code, count, "Dispatched notifications");
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DashboardError;
    use crate::core::store::{DocumentStore, NOTIFICATIONS, StoreError};
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notification(url: &str, country: &str, event: Event) -> Notification {
        Notification {
            id: String::new(),
            url: url.to_string(),
            country: country.to_string(),
            event,
            last_invoke: None,
        }
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap()
    }

    async fn notifier_with(subscriptions: &[Notification]) -> (Notifier, Documents<Notification>) {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let notifications = Documents::<Notification>::new(store, NOTIFICATIONS);
        for subscription in subscriptions {
            notifications.create(subscription).await.unwrap();
        }
        (Notifier::new(notifications.clone(), client()), notifications)
    }

    #[tokio::test]
    async fn test_find_matching_rejects_unknown_event() {
        let (notifier, _) = notifier_with(&[]).await;
        let err = notifier.find_matching("NOT_AN_EVENT", "NO").await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidEvent(_)));
    }

    #[tokio::test]
    async fn test_find_matching_by_event_and_country() {
        let (notifier, _) = notifier_with(&[
            notification("http://localhost/no", "NO", Event::Register),
            notification("http://localhost/any", "", Event::Register),
            notification("http://localhost/se", "SE", Event::Register),
            notification("http://localhost/change", "NO", Event::Change),
            notification("http://localhost/no", "NO", Event::Register),
        ])
        .await;

        let matching = notifier.find_matching("REGISTER", "NO").await.unwrap();

        assert_eq!(matching.len(), 3);
        assert!(
            matching
                .iter()
                .all(|n| n.event == Event::Register && (n.country == "NO" || n.country.is_empty()))
        );
        // Duplicate subscriptions are not collapsed.
        assert_eq!(
            matching
                .iter()
                .filter(|n| n.url == "http://localhost/no")
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn test_invoke_is_matchable() {
        let (notifier, _) =
            notifier_with(&[notification("http://localhost/hook", "", Event::Invoke)]).await;
        assert_eq!(notifier.find_matching("INVOKE", "DE").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_posts_notification_and_stamps_last_invoke() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(
                serde_json::json!({"event": "CHANGE", "country": "NO"}),
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let url = format!("{}/hook", mock_server.uri());
        let (notifier, notifications) =
            notifier_with(&[notification(&url, "NO", Event::Change)]).await;

        let stored = notifications.list().await.unwrap().remove(0);
        notifier.dispatch(stored.clone()).await;

        let updated = notifications.get(&stored.id).await.unwrap();
        assert!(updated.last_invoke.is_some());

        let requests = mock_server.received_requests().await.unwrap();
        let payload: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(payload["id"], stored.id.as_str());
        assert!(payload["lastInvoke"].is_string());
    }

    #[tokio::test]
    async fn test_dispatch_isolation() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/second"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        // Nothing listens on port 9 locally, so the first delivery fails.
        let (notifier, _) = notifier_with(&[
            notification("http://127.0.0.1:9/first", "NO", Event::Delete),
            notification(&format!("{}/second", mock_server.uri()), "", Event::Delete),
        ])
        .await;

        assert_eq!(notifier.notify(Event::Delete, "NO").await, 2);
    }

    #[tokio::test]
    async fn test_dispatch_ignores_rejecting_webhook() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&mock_server)
            .await;

        let url = format!("{}/hook", mock_server.uri());
        let (notifier, _) = notifier_with(&[
            notification(&url, "NO", Event::Register),
            notification(&url, "NO", Event::Register),
        ])
        .await;

        assert_eq!(notifier.notify(Event::Register, "NO").await, 2);
    }

    /// Lists fine but refuses every write.
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for ReadOnlyStore {
        async fn create(&self, collection: &str, doc: Value) -> Result<String, StoreError> {
            self.0.create(collection, doc).await
        }

        async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
            self.0.get(collection, id).await
        }

        async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
            self.0.list(collection).await
        }

        async fn update(&self, _: &str, _: &str, _: Value) -> Result<bool, StoreError> {
            Err(StoreError::Backend("read only".to_string()))
        }

        async fn delete(&self, _: &str, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Backend("read only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_dispatch_skips_delivery_when_timestamp_not_persisted() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let store = ReadOnlyStore(MemoryStore::new());
        let url = format!("{}/hook", mock_server.uri());
        let value = serde_json::to_value(notification(&url, "NO", Event::Change)).unwrap();
        store.create(NOTIFICATIONS, value).await.unwrap();

        let notifications =
            Documents::<Notification>::new(Arc::new(store) as Arc<dyn DocumentStore>, NOTIFICATIONS);
        let notifier = Notifier::new(notifications, client());

        assert_eq!(notifier.notify(Event::Change, "NO").await, 1);
    }
}
