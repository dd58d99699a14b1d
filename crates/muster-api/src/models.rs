//! Wire models for the campus events API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::schema::{self, FieldSchema};
use crate::value::FieldValue;

/// An event record as returned by `GET /events` and `GET /events/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub venue: Option<String>,

    /// RFC3339 timestamp; use [`Event::start_at`] for the parsed form.
    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    /// User id of the creator, when the server includes it.
    #[serde(default)]
    pub created_by: Option<String>,

    /// Declared custom registration fields. The server may hand this back as
    /// a structured array, a JSON string, or a legacy comma-separated name
    /// list; all three decode to the structured form here.
    #[serde(default, deserialize_with = "de_custom_fields")]
    pub custom_fields: Vec<FieldSchema>,
}

fn de_custom_fields<'de, D>(deserializer: D) -> Result<Vec<FieldSchema>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = serde_json::Value::deserialize(deserializer)?;
    Ok(schema::normalize(&raw))
}

impl Event {
    pub fn start_at(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339(self.start_time.as_deref())
    }

    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339(self.end_time.as_deref())
    }
}

/// A registered participant as returned by `GET /events/{id}/participants`.
///
/// Standard attributes are tolerant of gaps; `custom_field_values` carries
/// whatever the participant answered at registration, keyed by field name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub enrollment_number: Option<String>,

    #[serde(default)]
    pub amity_email: Option<String>,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default)]
    pub year: Option<i32>,

    /// RFC3339 timestamp; use [`Participant::registration_time`] for the
    /// parsed form.
    #[serde(default)]
    pub registered_at: Option<String>,

    #[serde(default)]
    pub attendance: bool,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_field_values: BTreeMap<String, FieldValue>,
}

impl Participant {
    pub fn registration_time(&self) -> Option<DateTime<Utc>> {
        parse_rfc3339(self.registered_at.as_deref())
    }
}

fn parse_rfc3339(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Payload for `POST /events` and `PUT /events/{id}`.
///
/// The client serializes this as multipart form data; `custom_fields`
/// travels as one JSON-encoded part (always the structured array, never the
/// legacy name list).
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventDraft {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    pub custom_fields: Vec<FieldSchema>,
}

impl EventDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// JSON text for the `custom_fields` multipart part.
    pub fn custom_fields_json(&self) -> String {
        serde_json::to_string(&self.custom_fields).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Body of `POST /events/{id}/register`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub custom_field_values: &'a BTreeMap<String, FieldValue>,
}

/// Report flavor offered by the export endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Excel,
}

impl ExportFormat {
    /// Final path segment of the export endpoint.
    pub fn path_segment(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "excel",
        }
    }

    /// File extension for the saved report.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}
