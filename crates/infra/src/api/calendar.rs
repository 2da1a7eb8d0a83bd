//! `CalendarFeed` over `GET /calendar/events`

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use taskboard_core::CalendarFeed;
use taskboard_domain::{CalendarEvent, Result};
use tracing::{debug, instrument};

use super::client::BackendClient;

#[derive(Debug, Deserialize)]
struct RemoteEvent {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EventListResponse {
    Bare(Vec<RemoteEvent>),
    Wrapped {
        #[serde(default, alias = "items")]
        events: Option<Vec<RemoteEvent>>,
    },
}

/// Upcoming events from the backend's calendar proxy.
pub struct HttpCalendarFeed {
    client: Arc<BackendClient>,
}

impl HttpCalendarFeed {
    /// Feed reading through `client`.
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CalendarFeed for HttpCalendarFeed {
    #[instrument(skip(self))]
    async fn list_events(&self) -> Result<Vec<CalendarEvent>> {
        let response: Option<EventListResponse> = self.client.get("/calendar/events").await?;
        let remote = match response {
            Some(EventListResponse::Bare(events)) => events,
            Some(EventListResponse::Wrapped { events }) => events.unwrap_or_default(),
            None => Vec::new(),
        };

        // Events without an id cannot get a stable board identity.
        let events: Vec<CalendarEvent> = remote
            .into_iter()
            .filter_map(|event| {
                let id = event.id.filter(|id| !id.trim().is_empty())?;
                Some(CalendarEvent { id, summary: event.summary.unwrap_or_default() })
            })
            .collect();

        debug!(count = events.len(), "listed calendar events");
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::api::auth::StaticSessionToken;
    use crate::api::client::BackendConfig;

    async fn feed_answering(body: serde_json::Value) -> (MockServer, HttpCalendarFeed) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendar/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let config = BackendConfig {
            base_url: server.uri(),
            timeout: Duration::from_secs(5),
            max_attempts: 1,
        };
        let client =
            BackendClient::new(config, Arc::new(StaticSessionToken::new(Some("s".into()))))
                .unwrap();
        (server, HttpCalendarFeed::new(Arc::new(client)))
    }

    #[tokio::test]
    async fn reads_bare_event_list() {
        let (_server, feed) = feed_answering(serde_json::json!([
            {"id": "e1", "summary": "Standup", "start": {"dateTime": "2024-05-01T09:00:00Z"}},
            {"summary": "no id"}
        ]))
        .await;

        let events = feed.list_events().await.unwrap();

        assert_eq!(events, vec![CalendarEvent { id: "e1".into(), summary: "Standup".into() }]);
    }

    #[tokio::test]
    async fn reads_wrapped_event_list() {
        let (_server, feed) =
            feed_answering(serde_json::json!({"items": [{"id": "e2", "summary": "Review"}]})).await;

        let events = feed.list_events().await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "e2");
    }

    #[tokio::test]
    async fn null_body_means_no_events() {
        let (_server, feed) = feed_answering(serde_json::Value::Null).await;

        assert!(feed.list_events().await.unwrap().is_empty());
    }
}
