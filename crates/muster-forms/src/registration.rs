//! Registration form: widget dispatch, value collection, validation, and
//! guarded submission.
//!
//! A [`RegistrationForm`] is created fresh for each registration attempt
//! from the event's field schema and discarded once the submission succeeds
//! or the participant dismisses it; nothing is persisted client-side.

use std::collections::BTreeMap;

use tracing::{debug, error};

use muster_api::{ApiError, FieldSchema, FieldType, FieldValue, FormError};

use crate::service::EventService;

/// Widget a frontend should draw for one custom field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Widget {
    TextInput,
    NumberInput,
    /// Starts unchecked; an untouched checkbox submits `false`.
    Checkbox,
    /// Choice restricted to the listed options; unselected yields the empty
    /// string.
    Dropdown { options: Vec<String> },
}

/// One rendered input: the field it binds to and the widget to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBinding {
    pub name: String,
    pub required: bool,
    pub widget: Widget,
}

/// Map a field set to input bindings, in schema order.
pub fn render(schema: &[FieldSchema]) -> Vec<InputBinding> {
    schema
        .iter()
        .map(|field| InputBinding {
            name: field.name.clone(),
            required: field.required,
            widget: match field.field_type {
                FieldType::Text => Widget::TextInput,
                FieldType::Number => Widget::NumberInput,
                FieldType::Boolean => Widget::Checkbox,
                FieldType::Select => Widget::Dropdown {
                    options: field.options.clone(),
                },
            },
        })
        .collect()
}

/// Raw state of one input widget.
#[derive(Debug, Clone, PartialEq)]
enum Entry {
    /// Text, number and select widgets hold the raw input string; numbers
    /// are only parsed at validation time so a typo never loses input.
    Raw(String),
    Flag(bool),
}

/// Submission failure: either local validation or the API call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SubmitError {
    #[error("form has invalid fields")]
    Invalid { errors: BTreeMap<String, FormError> },

    #[error("a submission is already in flight")]
    InFlight,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Per-attempt value collection and validation over an event's field schema.
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    schema: Vec<FieldSchema>,
    entries: BTreeMap<String, Entry>,
    in_flight: bool,
}

impl RegistrationForm {
    pub fn new(schema: Vec<FieldSchema>) -> Self {
        let entries = initial_entries(&schema);
        Self {
            schema,
            entries,
            in_flight: false,
        }
    }

    pub fn schema(&self) -> &[FieldSchema] {
        &self.schema
    }

    /// Input bindings for the frontend, in schema order.
    pub fn bindings(&self) -> Vec<InputBinding> {
        render(&self.schema)
    }

    /// Whether a submission is currently awaiting the server. The frontend
    /// disables the submit control while this is set.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Store the raw input for a text, number or select widget.
    pub fn set_input(&mut self, name: &str, raw: impl Into<String>) {
        match self.entries.get_mut(name) {
            Some(Entry::Raw(slot)) => *slot = raw.into(),
            Some(Entry::Flag(_)) => debug!("set_input on checkbox field {:?} ignored", name),
            None => debug!("set_input on unknown field {:?} ignored", name),
        }
    }

    /// Store a checkbox answer.
    pub fn set_flag(&mut self, name: &str, value: bool) {
        match self.entries.get_mut(name) {
            Some(Entry::Flag(slot)) => *slot = value,
            Some(Entry::Raw(_)) => debug!("set_flag on non-checkbox field {:?} ignored", name),
            None => debug!("set_flag on unknown field {:?} ignored", name),
        }
    }

    pub fn input(&self, name: &str) -> Option<&str> {
        match self.entries.get(name) {
            Some(Entry::Raw(raw)) => Some(raw),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.entries.get(name) {
            Some(Entry::Flag(value)) => Some(*value),
            _ => None,
        }
    }

    /// Check every field against its schema entry.
    ///
    /// A required field fails with `MissingRequiredField` only when its
    /// answer is absent or an empty string; an explicit `false` checkbox is
    /// a valid answer. Non-empty numeric input that does not parse fails
    /// with `InvalidNumber` whether or not the field is required.
    pub fn validate(&self) -> BTreeMap<String, FormError> {
        let mut errors = BTreeMap::new();
        for field in &self.schema {
            match self.entries.get(&field.name) {
                Some(Entry::Raw(raw)) => {
                    if raw.trim().is_empty() {
                        if field.required {
                            errors.insert(field.name.clone(), FormError::MissingRequiredField);
                        }
                    } else if field.field_type == FieldType::Number {
                        if let Err(e) = FieldValue::parse(FieldType::Number, raw) {
                            errors.insert(field.name.clone(), e);
                        }
                    }
                }
                Some(Entry::Flag(_)) => {}
                None => {
                    if field.required {
                        errors.insert(field.name.clone(), FormError::MissingRequiredField);
                    }
                }
            }
        }
        errors
    }

    /// The typed value map as it will be submitted. Unanswered optional
    /// number fields are omitted (there is no number to send); unanswered
    /// text and select fields submit the empty string.
    pub fn value_map(&self) -> BTreeMap<String, FieldValue> {
        let mut values = BTreeMap::new();
        for field in &self.schema {
            match self.entries.get(&field.name) {
                Some(Entry::Flag(value)) => {
                    values.insert(field.name.clone(), FieldValue::Flag(*value));
                }
                Some(Entry::Raw(raw)) => match field.field_type {
                    FieldType::Number => {
                        if let Ok(value) = FieldValue::parse(FieldType::Number, raw) {
                            values.insert(field.name.clone(), value);
                        }
                    }
                    _ => {
                        values.insert(field.name.clone(), FieldValue::Text(raw.clone()));
                    }
                },
                None => {}
            }
        }
        values
    }

    /// Validate and submit to the registration endpoint.
    ///
    /// Local validation failures block the call entirely. On API failure the
    /// form keeps all entered values so the participant can resubmit; on
    /// success the form is cleared (the frontend closes it and refreshes the
    /// event's registration state). Never retries.
    pub async fn submit(
        &mut self,
        service: &dyn EventService,
        event_id: &str,
    ) -> Result<(), SubmitError> {
        if self.in_flight {
            debug!("submit ignored, request already in flight");
            return Err(SubmitError::InFlight);
        }

        let errors = self.validate();
        if !errors.is_empty() {
            debug!("submit blocked by {} invalid field(s)", errors.len());
            return Err(SubmitError::Invalid { errors });
        }

        let values = self.value_map();
        self.in_flight = true;
        let result = service.register(event_id, &values).await;
        self.in_flight = false;

        match result {
            Ok(()) => {
                self.clear();
                Ok(())
            }
            Err(err) => {
                error!("registration failed for event {}: {}", event_id, err);
                Err(SubmitError::Api(err))
            }
        }
    }

    /// Reset every entry to its initial state.
    pub fn clear(&mut self) {
        self.entries = initial_entries(&self.schema);
    }
}

fn initial_entries(schema: &[FieldSchema]) -> BTreeMap<String, Entry> {
    schema
        .iter()
        .map(|field| {
            let entry = match field.field_type {
                FieldType::Boolean => Entry::Flag(false),
                _ => Entry::Raw(String::new()),
            };
            (field.name.clone(), entry)
        })
        .collect()
}
