//! Schema editor: the buffer-and-commit state machine event creators use to
//! author custom registration fields.
//!
//! The same editor backs the "create event" and "edit event" flows; the
//! caller seeds it with the event's existing fields (or nothing) and takes
//! the finished set back out with [`SchemaEditor::into_fields`]. The editor
//! never touches the network.

use tracing::debug;

use muster_api::{build_options, join_options, validate_name, FieldSchema, FieldType, SchemaError};

/// What the input buffer is currently aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Appending a brand-new field.
    New,
    /// Rewriting the field at this index in place.
    Existing(usize),
}

/// The in-progress field being typed into the editor's input row.
///
/// `options_input` holds the raw comma-separated options text exactly as the
/// creator typed it; it is only split into labels on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBuffer {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub options_input: String,
}

impl FieldBuffer {
    fn blank() -> Self {
        Self {
            name: String::new(),
            field_type: FieldType::Text,
            required: false,
            options_input: String::new(),
        }
    }

    fn from_field(field: &FieldSchema) -> Self {
        Self {
            name: field.name.clone(),
            field_type: field.field_type,
            required: field.required,
            options_input: join_options(&field.options),
        }
    }
}

/// Idle/Editing state machine over a working copy of an event's field set.
#[derive(Debug, Clone)]
pub struct SchemaEditor {
    fields: Vec<FieldSchema>,
    buffer: FieldBuffer,
    editing: Option<EditTarget>,
}

impl SchemaEditor {
    /// Start with an empty field set (create-event flow).
    pub fn new() -> Self {
        Self::with_fields(Vec::new())
    }

    /// Start from an event's existing fields (edit-event flow).
    pub fn with_fields(fields: Vec<FieldSchema>) -> Self {
        Self {
            fields,
            buffer: FieldBuffer::blank(),
            editing: None,
        }
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Hand the finished set to the event create/update flow.
    pub fn into_fields(self) -> Vec<FieldSchema> {
        self.fields
    }

    pub fn buffer(&self) -> &FieldBuffer {
        &self.buffer
    }

    /// Mutable access for the frontend's input bindings. Meaningful only
    /// while editing; committed via [`SchemaEditor::commit`].
    pub fn buffer_mut(&mut self) -> &mut FieldBuffer {
        &mut self.buffer
    }

    pub fn editing(&self) -> Option<EditTarget> {
        self.editing
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Begin adding a new field with a blank text buffer.
    pub fn start_add(&mut self) {
        self.buffer = FieldBuffer::blank();
        self.editing = Some(EditTarget::New);
    }

    /// Load an existing field into the buffer for in-place editing.
    /// Returns false (leaving the state untouched) when the index is stale.
    pub fn start_edit(&mut self, index: usize) -> bool {
        match self.fields.get(index) {
            Some(field) => {
                self.buffer = FieldBuffer::from_field(field);
                self.editing = Some(EditTarget::Existing(index));
                true
            }
            None => {
                debug!("start_edit with stale index {}", index);
                false
            }
        }
    }

    /// Validate the buffer and fold it into the set: append for a new field,
    /// replace in place for an existing one. On failure the editor stays in
    /// its editing state and the set is untouched.
    pub fn commit(&mut self) -> Result<(), SchemaError> {
        let target = match self.editing {
            Some(target) => target,
            None => {
                debug!("commit with nothing being edited");
                return Ok(());
            }
        };

        let editing_index = match target {
            EditTarget::New => None,
            EditTarget::Existing(index) => Some(index),
        };
        let name = validate_name(&self.buffer.name, &self.fields, editing_index)?;

        let options = if self.buffer.field_type == FieldType::Select {
            let options = build_options(&self.buffer.options_input);
            if options.is_empty() {
                return Err(SchemaError::NoOptions { name });
            }
            options
        } else {
            Vec::new()
        };

        let field = FieldSchema {
            name,
            field_type: self.buffer.field_type,
            required: self.buffer.required,
            options,
        };

        match target {
            EditTarget::New => self.fields.push(field),
            EditTarget::Existing(index) => self.fields[index] = field,
        }

        self.reset();
        Ok(())
    }

    /// Delete the field at `index`. If it was the one being edited the
    /// buffer is discarded too; an edit of a later field keeps tracking it.
    pub fn remove(&mut self, index: usize) -> Option<FieldSchema> {
        if index >= self.fields.len() {
            debug!("remove with stale index {}", index);
            return None;
        }
        let removed = self.fields.remove(index);

        match self.editing {
            Some(EditTarget::Existing(editing)) if editing == index => self.reset(),
            Some(EditTarget::Existing(editing)) if editing > index => {
                self.editing = Some(EditTarget::Existing(editing - 1));
            }
            _ => {}
        }

        Some(removed)
    }

    /// Discard buffer changes and return to idle without touching the set.
    pub fn cancel(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        self.buffer = FieldBuffer::blank();
        self.editing = None;
    }
}

impl Default for SchemaEditor {
    fn default() -> Self {
        Self::new()
    }
}
