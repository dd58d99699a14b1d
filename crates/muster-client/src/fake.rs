//! In-memory campus service for tests and offline development.
//!
//! `CampusFake` implements [`EventService`] against a mutable in-memory
//! store, simulating the external API's behavior: registration appends a
//! participant built from the configured profile, exports produce a small
//! stand-in document, and failures mirror the server's error shapes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use muster_api::{
    ApiError, CUSTOM_FIELD_PREFIX, Event, EventDraft, ExportFormat, FieldValue, Participant,
};
use muster_forms::EventService;

/// The authenticated student the fake registers on `register` calls.
#[derive(Debug, Clone)]
pub struct FakeProfile {
    pub name: String,
    pub enrollment_number: String,
    pub amity_email: String,
    pub phone_number: String,
    pub branch: String,
    pub year: i32,
}

impl Default for FakeProfile {
    fn default() -> Self {
        Self {
            name: "Test Student".to_string(),
            enrollment_number: "A2305221001".to_string(),
            amity_email: "test.student@s.amity.edu".to_string(),
            phone_number: "9990000000".to_string(),
            branch: "CSE".to_string(),
            year: 3,
        }
    }
}

#[derive(Debug, Clone)]
struct EventRecord {
    event: Event,
    participants: Vec<Participant>,
}

pub struct CampusFake {
    state: RwLock<BTreeMap<String, EventRecord>>,
    profile: FakeProfile,
}

impl CampusFake {
    pub fn new() -> Self {
        Self::with_profile(FakeProfile::default())
    }

    pub fn with_profile(profile: FakeProfile) -> Self {
        Self {
            state: RwLock::new(BTreeMap::new()),
            profile,
        }
    }

    pub fn profile(&self) -> &FakeProfile {
        &self.profile
    }

    /// Seed an event directly, bypassing the draft flow.
    pub async fn seed_event(&self, event: Event) {
        let mut state = self.state.write().await;
        state.insert(
            event.id.clone(),
            EventRecord {
                event,
                participants: Vec::new(),
            },
        );
    }

    /// Seed a participant onto an existing event, e.g. to simulate schema
    /// drift between declared fields and stored answers.
    pub async fn seed_participant(
        &self,
        event_id: &str,
        participant: Participant,
    ) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        let record = state.get_mut(event_id).ok_or_else(|| ApiError::EventNotFound {
            id: event_id.to_string(),
        })?;
        record.participants.push(participant);
        Ok(())
    }

    fn participant_from_profile(&self, values: &BTreeMap<String, FieldValue>) -> Participant {
        Participant {
            id: format!("fake-{}", Uuid::new_v4()),
            name: self.profile.name.clone(),
            enrollment_number: Some(self.profile.enrollment_number.clone()),
            amity_email: Some(self.profile.amity_email.clone()),
            phone_number: Some(self.profile.phone_number.clone()),
            branch: Some(self.profile.branch.clone()),
            year: Some(self.profile.year),
            registered_at: Some(Utc::now().to_rfc3339()),
            attendance: false,
            custom_field_values: values.clone(),
        }
    }
}

impl Default for CampusFake {
    fn default() -> Self {
        Self::new()
    }
}

/// One report cell, mirroring what the real export endpoints print.
fn column_value(participant: &Participant, field_id: &str) -> String {
    match field_id {
        "name" => participant.name.clone(),
        "enrollment_number" => participant.enrollment_number.clone().unwrap_or_default(),
        "amity_email" => participant.amity_email.clone().unwrap_or_default(),
        "phone_number" => participant.phone_number.clone().unwrap_or_default(),
        "branch" => participant.branch.clone().unwrap_or_default(),
        "year" => participant.year.map(|y| y.to_string()).unwrap_or_default(),
        "registered_at" => participant.registered_at.clone().unwrap_or_default(),
        "attendance" => if participant.attendance {
            "Present"
        } else {
            "Absent"
        }
        .to_string(),
        other => other
            .strip_prefix(CUSTOM_FIELD_PREFIX)
            .and_then(|name| participant.custom_field_values.get(name))
            .map(|value| value.to_string())
            .unwrap_or_default(),
    }
}

#[async_trait]
impl EventService for CampusFake {
    async fn list_events(&self) -> Result<Vec<Event>, ApiError> {
        let state = self.state.read().await;
        Ok(state.values().map(|record| record.event.clone()).collect())
    }

    async fn get_event(&self, event_id: &str) -> Result<Event, ApiError> {
        let state = self.state.read().await;
        state
            .get(event_id)
            .map(|record| record.event.clone())
            .ok_or_else(|| ApiError::EventNotFound {
                id: event_id.to_string(),
            })
    }

    async fn create_event(&self, draft: &EventDraft) -> Result<Event, ApiError> {
        let event = Event {
            id: format!("fake-{}", Uuid::new_v4()),
            name: draft.name.clone(),
            description: draft.description.clone(),
            venue: draft.venue.clone(),
            start_time: draft.start_time.clone(),
            end_time: draft.end_time.clone(),
            created_by: None,
            custom_fields: draft.custom_fields.clone(),
        };

        let mut state = self.state.write().await;
        state.insert(
            event.id.clone(),
            EventRecord {
                event: event.clone(),
                participants: Vec::new(),
            },
        );
        Ok(event)
    }

    async fn update_event(&self, event_id: &str, draft: &EventDraft) -> Result<Event, ApiError> {
        let mut state = self.state.write().await;
        let record = state.get_mut(event_id).ok_or_else(|| ApiError::EventNotFound {
            id: event_id.to_string(),
        })?;

        record.event.name = draft.name.clone();
        record.event.description = draft.description.clone();
        record.event.venue = draft.venue.clone();
        record.event.start_time = draft.start_time.clone();
        record.event.end_time = draft.end_time.clone();
        record.event.custom_fields = draft.custom_fields.clone();
        Ok(record.event.clone())
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        state
            .remove(event_id)
            .map(|_| ())
            .ok_or_else(|| ApiError::EventNotFound {
                id: event_id.to_string(),
            })
    }

    async fn register(
        &self,
        event_id: &str,
        values: &BTreeMap<String, FieldValue>,
    ) -> Result<(), ApiError> {
        let participant = self.participant_from_profile(values);

        let mut state = self.state.write().await;
        let record = state.get_mut(event_id).ok_or_else(|| ApiError::EventNotFound {
            id: event_id.to_string(),
        })?;

        let already = record
            .participants
            .iter()
            .any(|p| p.amity_email == participant.amity_email);
        if already {
            return Err(ApiError::RegistrationFailed {
                message: "you are already registered for this event".to_string(),
            });
        }

        record.participants.push(participant);
        Ok(())
    }

    async fn unregister(&self, event_id: &str) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        let record = state.get_mut(event_id).ok_or_else(|| ApiError::EventNotFound {
            id: event_id.to_string(),
        })?;

        let before = record.participants.len();
        record
            .participants
            .retain(|p| p.amity_email.as_deref() != Some(self.profile.amity_email.as_str()));
        if record.participants.len() == before {
            return Err(ApiError::RegistrationFailed {
                message: "you are not registered for this event".to_string(),
            });
        }
        Ok(())
    }

    async fn participants(&self, event_id: &str) -> Result<Vec<Participant>, ApiError> {
        let state = self.state.read().await;
        state
            .get(event_id)
            .map(|record| record.participants.clone())
            .ok_or_else(|| ApiError::EventNotFound {
                id: event_id.to_string(),
            })
    }

    async fn remove_participant(
        &self,
        event_id: &str,
        participant_id: &str,
    ) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        let record = state.get_mut(event_id).ok_or_else(|| ApiError::EventNotFound {
            id: event_id.to_string(),
        })?;

        let before = record.participants.len();
        record.participants.retain(|p| p.id != participant_id);
        if record.participants.len() == before {
            return Err(ApiError::ParticipantNotFound {
                id: participant_id.to_string(),
            });
        }
        Ok(())
    }

    async fn set_attendance(
        &self,
        event_id: &str,
        participant_id: &str,
        attended: bool,
    ) -> Result<(), ApiError> {
        let mut state = self.state.write().await;
        let record = state.get_mut(event_id).ok_or_else(|| ApiError::EventNotFound {
            id: event_id.to_string(),
        })?;

        let participant = record
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| ApiError::ParticipantNotFound {
                id: participant_id.to_string(),
            })?;
        participant.attendance = attended;
        Ok(())
    }

    async fn export_participants(
        &self,
        event_id: &str,
        format: ExportFormat,
        fields_printed: &[String],
    ) -> Result<Vec<u8>, ApiError> {
        let state = self.state.read().await;
        let record = state.get(event_id).ok_or_else(|| ApiError::EventNotFound {
            id: event_id.to_string(),
        })?;

        if record.participants.is_empty() {
            return Err(ApiError::ExportFailed {
                message: "no participants to export".to_string(),
            });
        }

        // A stand-in document: the right magic bytes followed by one line
        // per participant, so callers can assert on content.
        let mut bytes: Vec<u8> = match format {
            ExportFormat::Pdf => b"%PDF-1.4\n".to_vec(),
            ExportFormat::Excel => b"PK\x03\x04\n".to_vec(),
        };
        bytes.extend_from_slice(fields_printed.join(",").as_bytes());
        bytes.push(b'\n');
        for participant in &record.participants {
            let row: Vec<String> = fields_printed
                .iter()
                .map(|field_id| column_value(participant, field_id))
                .collect();
            bytes.extend_from_slice(row.join(",").as_bytes());
            bytes.push(b'\n');
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_api::FieldSchema;

    fn draft_with_fields(name: &str, fields: Vec<FieldSchema>) -> EventDraft {
        let mut draft = EventDraft::new(name);
        draft.custom_fields = fields;
        draft
    }

    #[tokio::test]
    async fn test_create_and_fetch_round_trip() {
        let fake = CampusFake::new();
        let created = fake
            .create_event(&draft_with_fields(
                "Hackathon",
                vec![FieldSchema::text("Team Name").required()],
            ))
            .await
            .unwrap();

        let fetched = fake.get_event(&created.id).await.unwrap();
        assert_eq!(fetched.name, "Hackathon");
        assert_eq!(fetched.custom_fields, created.custom_fields);

        let listed = fake.list_events().await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn test_register_builds_participant_from_profile() {
        let fake = CampusFake::new();
        let event = fake
            .create_event(&draft_with_fields("Tech Talk", vec![]))
            .await
            .unwrap();

        let mut values = BTreeMap::new();
        values.insert("Tier".to_string(), FieldValue::Text("Silver".into()));
        fake.register(&event.id, &values).await.unwrap();

        let participants = fake.participants(&event.id).await.unwrap();
        assert_eq!(participants.len(), 1);
        assert_eq!(participants[0].name, fake.profile().name);
        assert_eq!(
            participants[0].custom_field_values.get("Tier"),
            Some(&FieldValue::Text("Silver".into()))
        );
        assert!(participants[0].registered_at.is_some());

        // Double registration is rejected the way the server would.
        let err = fake.register(&event.id, &values).await.unwrap_err();
        assert!(matches!(err, ApiError::RegistrationFailed { .. }));

        fake.unregister(&event.id).await.unwrap();
        assert!(fake.participants(&event.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_attendance_and_removal() {
        let fake = CampusFake::new();
        let event = fake
            .create_event(&draft_with_fields("Workshop", vec![]))
            .await
            .unwrap();
        fake.register(&event.id, &BTreeMap::new()).await.unwrap();
        let participant_id = fake.participants(&event.id).await.unwrap()[0].id.clone();

        fake.set_attendance(&event.id, &participant_id, true)
            .await
            .unwrap();
        assert!(fake.participants(&event.id).await.unwrap()[0].attendance);

        fake.remove_participant(&event.id, &participant_id)
            .await
            .unwrap();
        let err = fake
            .set_attendance(&event.id, &participant_id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ParticipantNotFound { .. }));
    }

    #[tokio::test]
    async fn test_export_document_carries_selected_columns() {
        let fake = CampusFake::new();
        let event = fake
            .create_event(&draft_with_fields("Hackathon", vec![]))
            .await
            .unwrap();

        let mut values = BTreeMap::new();
        values.insert("Team".to_string(), FieldValue::Text("Rustaceans".into()));
        fake.register(&event.id, &values).await.unwrap();

        let fields = vec!["name".to_string(), "custom_Team".to_string()];
        let bytes = fake
            .export_participants(&event.id, ExportFormat::Pdf, &fields)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.starts_with("%PDF"));
        assert!(text.contains("name,custom_Team"));
        assert!(text.contains("Test Student,Rustaceans"));
    }

    #[tokio::test]
    async fn test_export_with_no_participants_mirrors_server_error() {
        let fake = CampusFake::new();
        let event = fake
            .create_event(&draft_with_fields("Empty", vec![]))
            .await
            .unwrap();

        let err = fake
            .export_participants(&event.id, ExportFormat::Excel, &["name".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::ExportFailed { .. }));
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let fake = CampusFake::new();
        assert!(matches!(
            fake.get_event("nope").await.unwrap_err(),
            ApiError::EventNotFound { .. }
        ));
        assert!(matches!(
            fake.delete_event("nope").await.unwrap_err(),
            ApiError::EventNotFound { .. }
        ));
    }
}
