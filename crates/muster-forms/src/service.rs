//! The seam between the forms layer and the campus API.

use std::collections::BTreeMap;

use async_trait::async_trait;

use muster_api::{ApiError, Event, EventDraft, ExportFormat, FieldValue, Participant};

/// Async interface to the campus events service.
///
/// `muster-client` provides the HTTP implementation and an in-memory fake;
/// the forms layer only ever talks to this trait, so every flow here can be
/// exercised without a network.
#[async_trait]
pub trait EventService: Send + Sync {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError>;

    async fn get_event(&self, event_id: &str) -> Result<Event, ApiError>;

    /// Create an event; the draft's custom fields travel as the JSON-encoded
    /// `custom_fields` part of the payload.
    async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError>;

    async fn update_event(&self, event_id: &str, draft: &EventDraft) -> Result<Event, ApiError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), ApiError>;

    /// Register the current user, submitting their custom-field answers.
    async fn register(
        &self,
        event_id: &str,
        values: &BTreeMap<String, FieldValue>,
    ) -> Result<(), ApiError>;

    async fn unregister(&self, event_id: &str) -> Result<(), ApiError>;

    async fn participants(&self, event_id: &str) -> Result<Vec<Participant>, ApiError>;

    async fn remove_participant(
        &self,
        event_id: &str,
        participant_id: &str,
    ) -> Result<(), ApiError>;

    async fn set_attendance(
        &self,
        event_id: &str,
        participant_id: &str,
        attended: bool,
    ) -> Result<(), ApiError>;

    /// Generate a participant report and return the raw document bytes.
    async fn export_participants(
        &self,
        event_id: &str,
        format: ExportFormat,
        fields_printed: &[String],
    ) -> Result<Vec<u8>, ApiError>;
}
