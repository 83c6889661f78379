//! HTTP client for the event API.

use chrono::NaiveDate;
use reqwest::StatusCode;
use tracing::instrument;

use crate::error::EventError;
use crate::repository::EventRepository;
use crate::types::{Event, EventId, EventPatch, NewEvent};

const DEFAULT_API_BASE: &str = "http://localhost:3000/api";

pub struct HttpEventRepository {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEventRepository {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn events_url(&self) -> String {
        format!("{}/events", self.base_url)
    }

    fn event_url(&self, id: EventId) -> String {
        format!("{}/events/{}", self.base_url, id)
    }

    /// Helper to decode successful responses and map failures.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        id: Option<EventId>,
    ) -> Result<T, EventError> {
        let response = Self::check_status(response, id).await?;
        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| EventError::InvalidResponse(format!("JSON parse error: {}", e)))
    }

    async fn check_status(
        response: reqwest::Response,
        id: Option<EventId>,
    ) -> Result<reqwest::Response, EventError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::warn!("Event API returned {}: {}", status, text);

        match (status, id) {
            (StatusCode::NOT_FOUND, Some(id)) => Err(EventError::NotFound(id)),
            (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
                Err(EventError::Validation(if text.is_empty() {
                    status.to_string()
                } else {
                    text
                }))
            }
            _ => Err(EventError::Api {
                status: status.as_u16(),
                message: text,
            }),
        }
    }
}

impl Default for HttpEventRepository {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl EventRepository for HttpEventRepository {
    #[instrument(skip(self), level = "info")]
    async fn list_all(&self) -> Result<Vec<Event>, EventError> {
        let response = self.client.get(self.events_url()).send().await?;
        Self::handle_response(response, None).await
    }

    #[instrument(skip(self), level = "info")]
    async fn get_by_date(&self, date: NaiveDate) -> Result<Vec<Event>, EventError> {
        let response = self
            .client
            .get(self.events_url())
            .query(&[("date", date.to_string())])
            .send()
            .await?;
        Self::handle_response(response, None).await
    }

    #[instrument(skip(self), level = "info")]
    async fn get_by_id(&self, id: EventId) -> Result<Event, EventError> {
        let response = self.client.get(self.event_url(id)).send().await?;
        Self::handle_response(response, Some(id)).await
    }

    #[instrument(skip(self, event), fields(date = %event.date), level = "info")]
    async fn create(&self, event: &NewEvent) -> Result<Event, EventError> {
        let response = self
            .client
            .post(self.events_url())
            .json(event)
            .send()
            .await?;
        Self::handle_response(response, None).await
    }

    #[instrument(skip(self, patch), level = "info")]
    async fn update(&self, id: EventId, patch: &EventPatch) -> Result<Event, EventError> {
        let response = self
            .client
            .put(self.event_url(id))
            .json(patch)
            .send()
            .await?;
        Self::handle_response(response, Some(id)).await
    }

    #[instrument(skip(self), level = "info")]
    async fn delete(&self, id: EventId) -> Result<(), EventError> {
        let response = self.client.delete(self.event_url(id)).send().await?;

        // 200 or 204, body ignored
        Self::check_status(response, Some(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event_json(id: i64, title: &str, date: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": title,
            "date": date,
            "startTime": "10:00",
            "endTime": "12:00",
            "color": "#8B7EC8"
        })
    }

    #[tokio::test]
    async fn test_list_all() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                event_json(1, "Songpa", "2026-02-02"),
                event_json(3, "Trip", "2026-02-05"),
            ])))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let events = client.list_all().await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Songpa");
        assert_eq!(events[1].id, 3);
    }

    #[tokio::test]
    async fn test_base_url_with_path_and_trailing_slash() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&format!("{}/api/", mock_server.uri()));
        assert!(client.base_url().ends_with("/api"));
        assert!(client.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_date_sends_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .and(query_param("date", "2026-02-02"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                event_json(1, "Songpa", "2026-02-02"),
            ])))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let events = client
            .get_by_date(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap())
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/42"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let result = client.get_by_id(42).await;

        assert!(matches!(result, Err(EventError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_create_omits_unset_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/events"))
            .and(body_json(serde_json::json!({
                "title": "Songpa",
                "date": "2026-02-02",
                "startTime": "10:00",
                "endTime": "12:00",
                "color": "#8B7EC8"
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(event_json(9, "Songpa", "2026-02-02")),
            )
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let created = client
            .create(&NewEvent {
                title: "Songpa".to_string(),
                date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                color: "#8B7EC8".to_string(),
                location: None,
                memo: None,
            })
            .await
            .unwrap();

        assert_eq!(created.id, 9);
    }

    #[tokio::test]
    async fn test_update_sends_partial_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/events/1"))
            .and(body_json(serde_json::json!({ "date": "2026-02-03" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(event_json(1, "Songpa", "2026-02-03")),
            )
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let patch = EventPatch {
            date: NaiveDate::from_ymd_opt(2026, 2, 3),
            ..Default::default()
        };
        let updated = client.update(1, &patch).await.unwrap();

        assert_eq!(updated.date, NaiveDate::from_ymd_opt(2026, 2, 3).unwrap());
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/events/77"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let result = client.update(77, &EventPatch::default()).await;

        assert!(matches!(result, Err(EventError::NotFound(77))));
    }

    #[tokio::test]
    async fn test_server_rejection_is_validation_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(400).set_body_string("title is required"))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let result = client
            .create(&NewEvent {
                title: String::new(),
                date: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
                start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                color: "#8B7EC8".to_string(),
                location: None,
                memo: None,
            })
            .await;

        match result {
            Err(EventError::Validation(msg)) => assert_eq!(msg, "title is required"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_transport() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let err = client.list_all().await.unwrap_err();

        assert!(err.is_transport());
        assert!(matches!(err, EventError::Api { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/events/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let result = client.get_by_id(1).await;

        assert!(matches!(result, Err(EventError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_delete_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/events/5"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let result = client.delete(5).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/events/5"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = HttpEventRepository::new(&mock_server.uri());
        let result = client.delete(5).await;

        assert!(matches!(result, Err(EventError::Api { status: 503, .. })));
    }
}
