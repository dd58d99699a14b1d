//! HTTP client for the campus events API.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use muster_api::{
    ApiError, Event, EventDraft, ExportFormat, FieldValue, Participant, RegisterRequest,
};
use muster_forms::EventService;

use crate::config::ClientConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct CampusClient {
    base_url: String,
    default_headers: HeaderMap,
    client: reqwest::Client,
}

impl CampusClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self::with_timeout(base_url, token, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, token: &str, timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            format!("Bearer {}", token)
                .parse()
                .expect("Invalid token format"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: headers,
            client,
        }
    }

    /// Build a client from a loaded config. Fails when the config carries no
    /// token (the API rejects anonymous requests anyway).
    pub fn from_config(config: &ClientConfig) -> anyhow::Result<Self> {
        let token = config
            .token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("config has no API token"))?;
        let timeout = config
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Ok(Self::with_timeout(&config.base_url, token, timeout))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a transport-level failure into a message the UI can show.
    fn format_reqwest_error(e: reqwest::Error, url: &str, operation: &str) -> ApiError {
        let message = if e.is_timeout() {
            format!("{} for {} timed out", operation, url)
        } else if e.is_connect() {
            format!("{} for {}: connection error: {}", operation, url, e)
        } else if e.is_decode() {
            format!("{} for {}: unexpected response format: {}", operation, url, e)
        } else {
            format!("{} for {} failed: {}", operation, url, e)
        };
        ApiError::Network { message }
    }

    /// Check the status and pull the server's error message out of the body.
    async fn handle_response(response: reqwest::Response, url: &str) -> Result<String, ApiError> {
        let status = response.status();
        let text = response.text().await.map_err(|e| ApiError::Network {
            message: format!("failed to read response body from {}: {}", url, e),
        })?;

        if !status.is_success() {
            let message = server_message(&text);
            error!("[CampusClient] HTTP {} from {}: {}", status.as_u16(), url, message);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        operation: &str,
    ) -> Result<T, ApiError> {
        let response = request
            .headers(self.default_headers.clone())
            .send()
            .await
            .map_err(|e| {
                let err = Self::format_reqwest_error(e, url, operation);
                error!("[CampusClient] {}", err);
                err
            })?;

        let text = Self::handle_response(response, url).await?;
        debug!(
            "[CampusClient] {} response received: length={}",
            operation,
            text.len()
        );

        serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            message: format!(
                "{} response from {} did not parse: {} - body (first 200): {}",
                operation,
                url,
                e,
                text.chars().take(200).collect::<String>()
            ),
        })
    }

    /// Send a request whose response body we do not care about.
    async fn send_expect_ok(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        operation: &str,
    ) -> Result<(), ApiError> {
        let response = request
            .headers(self.default_headers.clone())
            .send()
            .await
            .map_err(|e| {
                let err = Self::format_reqwest_error(e, url, operation);
                error!("[CampusClient] {}", err);
                err
            })?;

        Self::handle_response(response, url).await?;
        Ok(())
    }
}

/// Extract the server's error message from a response body, falling back to
/// the generic string when it gives none.
fn server_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error", "detail"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        ApiError::GENERIC_MESSAGE.to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

/// Multipart payload for event create/update: standard attributes as text
/// parts, `custom_fields` as one JSON-encoded part.
fn draft_form(draft: &EventDraft) -> multipart::Form {
    let mut form = multipart::Form::new()
        .text("name", draft.name.clone())
        .text("custom_fields", draft.custom_fields_json());

    if let Some(description) = &draft.description {
        form = form.text("description", description.clone());
    }
    if let Some(venue) = &draft.venue {
        form = form.text("venue", venue.clone());
    }
    if let Some(start_time) = &draft.start_time {
        form = form.text("start_time", start_time.clone());
    }
    if let Some(end_time) = &draft.end_time {
        form = form.text("end_time", end_time.clone());
    }

    form
}

/// Server rejections while persisting an event become schema-persist
/// failures; transport errors pass through untouched.
fn persist_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Server { message, .. } => ApiError::SchemaPersistFailed { message },
        other => other,
    }
}

fn registration_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Server { message, .. } => ApiError::RegistrationFailed { message },
        other => other,
    }
}

#[async_trait]
impl EventService for CampusClient {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        let url = self.url("/events");
        debug!("[CampusClient] listing events");
        self.send_json(self.client.get(&url), &url, "list events")
            .await
    }

    async fn get_event(&self, event_id: &str) -> Result<Event, ApiError> {
        let url = self.url(&format!("/events/{}", event_id));
        debug!("[CampusClient] fetching event {}", event_id);
        self.send_json(self.client.get(&url), &url, "get event")
            .await
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        let url = self.url("/events");
        info!(
            "[CampusClient] creating event {:?} with {} custom field(s)",
            draft.name,
            draft.custom_fields.len()
        );
        self.send_json(
            self.client.post(&url).multipart(draft_form(draft)),
            &url,
            "create event",
        )
        .await
        .map_err(persist_error)
    }

    async fn update_event(&self, event_id: &str, draft: &EventDraft) -> Result<Event, ApiError> {
        let url = self.url(&format!("/events/{}", event_id));
        info!("[CampusClient] updating event {}", event_id);
        self.send_json(
            self.client.put(&url).multipart(draft_form(draft)),
            &url,
            "update event",
        )
        .await
        .map_err(persist_error)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/events/{}", event_id));
        info!("[CampusClient] deleting event {}", event_id);
        self.send_expect_ok(self.client.delete(&url), &url, "delete event")
            .await
    }

    async fn register(
        &self,
        event_id: &str,
        values: &BTreeMap<String, FieldValue>,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!("/events/{}/register", event_id));
        info!(
            "[CampusClient] registering for event {} with {} value(s)",
            event_id,
            values.len()
        );
        let body = RegisterRequest {
            custom_field_values: values,
        };
        self.send_expect_ok(self.client.post(&url).json(&body), &url, "register")
            .await
            .map_err(registration_error)
    }

    async fn unregister(&self, event_id: &str) -> Result<(), ApiError> {
        let url = self.url(&format!("/events/{}/register", event_id));
        info!("[CampusClient] unregistering from event {}", event_id);
        self.send_expect_ok(self.client.delete(&url), &url, "unregister")
            .await
            .map_err(registration_error)
    }

    async fn participants(&self, event_id: &str) -> Result<Vec<Participant>, ApiError> {
        let url = self.url(&format!("/events/{}/participants", event_id));
        debug!("[CampusClient] fetching participants of event {}", event_id);
        self.send_json(self.client.get(&url), &url, "list participants")
            .await
    }

    async fn remove_participant(
        &self,
        event_id: &str,
        participant_id: &str,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!(
            "/events/{}/participants/{}",
            event_id, participant_id
        ));
        info!(
            "[CampusClient] removing participant {} from event {}",
            participant_id, event_id
        );
        self.send_expect_ok(self.client.delete(&url), &url, "remove participant")
            .await
    }

    async fn set_attendance(
        &self,
        event_id: &str,
        participant_id: &str,
        attended: bool,
    ) -> Result<(), ApiError> {
        let url = self.url(&format!(
            "/events/{}/participants/{}/attendance",
            event_id, participant_id
        ));
        debug!(
            "[CampusClient] marking attendance={} for participant {} of event {}",
            attended, participant_id, event_id
        );
        let body = serde_json::json!({ "attendance": attended });
        self.send_expect_ok(self.client.post(&url).json(&body), &url, "set attendance")
            .await
    }

    async fn export_participants(
        &self,
        event_id: &str,
        format: ExportFormat,
        fields_printed: &[String],
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.url(&format!(
            "/events/{}/participants/{}",
            event_id,
            format.path_segment()
        ));
        info!(
            "[CampusClient] exporting {} report for event {} with {} field(s)",
            format.path_segment(),
            event_id,
            fields_printed.len()
        );

        let response = self
            .client
            .get(&url)
            .query(&[("fields_printed", fields_printed.join(","))])
            .headers(self.default_headers.clone())
            .send()
            .await
            .map_err(|e| {
                let err = Self::format_reqwest_error(e, &url, "export");
                error!("[CampusClient] {}", err);
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = server_message(&text);
            error!("[CampusClient] export failed with HTTP {}: {}", status.as_u16(), message);
            return Err(ApiError::ExportFailed { message });
        }

        let bytes = response.bytes().await.map_err(|e| ApiError::Network {
            message: format!("failed to read report body from {}: {}", url, e),
        })?;
        debug!("[CampusClient] export received: {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}
