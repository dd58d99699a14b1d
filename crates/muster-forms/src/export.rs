//! Export field selection: discovery, toggling, and the ordered
//! `fields_printed` list handed to the report endpoints.

use tracing::debug;

use muster_api::{
    custom_field_id, Event, ExportError, ExportFormat, Participant, STANDARD_FIELDS,
};

use crate::service::EventService;

/// One selectable report column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Stable identifier sent to the export endpoint: a standard field id,
    /// or `custom_<name>` for a discovered custom field.
    pub id: String,
    pub label: String,
    pub custom: bool,
}

/// The final field list for one export call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub fields_printed: Vec<String>,
}

/// A generated report blob plus the filename to save it under.
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Field selection for one event's report.
///
/// Built when an event is chosen for reporting, mutated by creator toggles,
/// consumed by [`ExportSelector::export`], and discarded afterwards or when
/// another event is selected.
#[derive(Debug, Clone)]
pub struct ExportSelector {
    event_id: String,
    event_name: String,
    participant_count: usize,
    entries: Vec<(FieldDescriptor, bool)>,
}

impl ExportSelector {
    /// Build the selection for an event: the fixed standard fields first,
    /// then one custom descriptor per distinct name in the union of the
    /// event's declared schema and the keys observed on already-registered
    /// participants (defense against schema drift). Every field starts
    /// enabled.
    pub fn discover(event: &Event, participants: &[Participant]) -> Self {
        let mut entries: Vec<(FieldDescriptor, bool)> = STANDARD_FIELDS
            .iter()
            .map(|field| {
                (
                    FieldDescriptor {
                        id: field.id.to_string(),
                        label: field.label.to_string(),
                        custom: false,
                    },
                    true,
                )
            })
            .collect();

        let mut custom_names: Vec<&str> = Vec::new();
        for field in &event.custom_fields {
            if !custom_names.contains(&field.name.as_str()) {
                custom_names.push(&field.name);
            }
        }
        for participant in participants {
            for name in participant.custom_field_values.keys() {
                if !custom_names.contains(&name.as_str()) {
                    debug!("field {:?} found on a participant but not on the event", name);
                    custom_names.push(name);
                }
            }
        }

        entries.extend(custom_names.into_iter().map(|name| {
            (
                FieldDescriptor {
                    id: custom_field_id(name),
                    label: name.to_string(),
                    custom: true,
                },
                true,
            )
        }));

        Self {
            event_id: event.id.clone(),
            event_name: event.name.clone(),
            participant_count: participants.len(),
            entries,
        }
    }

    /// Descriptors with their current include flags, in discovery order.
    pub fn fields(&self) -> &[(FieldDescriptor, bool)] {
        &self.entries
    }

    pub fn participant_count(&self) -> usize {
        self.participant_count
    }

    /// Flip one field's include flag, leaving the rest untouched. Returns
    /// the new state, or `None` for an unknown identifier.
    pub fn toggle(&mut self, field_id: &str) -> Option<bool> {
        match self
            .entries
            .iter_mut()
            .find(|(descriptor, _)| descriptor.id == field_id)
        {
            Some((_, included)) => {
                *included = !*included;
                Some(*included)
            }
            None => {
                debug!("toggle on unknown field {:?} ignored", field_id);
                None
            }
        }
    }

    pub fn is_selected(&self, field_id: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|(descriptor, _)| descriptor.id == field_id)
            .map(|(_, included)| *included)
    }

    /// The ordered field list for the export call: enabled entries only,
    /// standard fields first in their fixed order, then custom fields in
    /// discovery order.
    pub fn build_export_request(&self) -> Result<ExportRequest, ExportError> {
        let fields_printed: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, included)| *included)
            .map(|(descriptor, _)| descriptor.id.clone())
            .collect();

        if fields_printed.is_empty() {
            return Err(ExportError::NoFieldsSelected);
        }
        Ok(ExportRequest { fields_printed })
    }

    /// Run the export and return the document plus its save filename.
    ///
    /// Fails before any network call when no fields are selected or the
    /// event has no participants; endpoint failures surface the server's
    /// message. Never retries.
    pub async fn export(
        &self,
        service: &dyn EventService,
        format: ExportFormat,
    ) -> Result<ExportedReport, ExportError> {
        let request = self.build_export_request()?;

        if self.participant_count == 0 {
            return Err(ExportError::GenerationFailed {
                message: format!("no participants registered for {}", self.event_name),
            });
        }

        let bytes = service
            .export_participants(&self.event_id, format, &request.fields_printed)
            .await
            .map_err(ExportError::from)?;

        Ok(ExportedReport {
            filename: export_filename(&self.event_name, format),
            bytes,
        })
    }
}

/// `<event-name>-participants.<ext>`, with path-hostile characters replaced
/// so the name is safe to hand to a save dialog.
pub fn export_filename(event_name: &str, format: ExportFormat) -> String {
    let safe: String = event_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let safe = safe.trim();
    let stem = if safe.is_empty() { "event" } else { safe };
    format!("{}-participants.{}", stem, format.extension())
}
