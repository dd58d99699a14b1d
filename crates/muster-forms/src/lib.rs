//! Client-local form logic for campus events.
//!
//! This crate provides the pieces a frontend composes around an event's
//! custom-field schema:
//!
//! - `editor` - `SchemaEditor`, the buffer-and-commit state machine for
//!   authoring a field set (shared by the create and edit flows)
//! - `registration` - widget dispatch, value collection, validation and
//!   guarded submission for the registration form
//! - `export` - report field discovery/selection and the export pre-flight
//! - `service` - the `EventService` seam implemented by `muster-client`

pub mod editor;
pub mod export;
pub mod registration;
pub mod service;

#[cfg(test)]
mod editor_pbt;

pub use editor::{EditTarget, FieldBuffer, SchemaEditor};
pub use export::{
    export_filename, ExportRequest, ExportSelector, ExportedReport, FieldDescriptor,
};
pub use registration::{render, InputBinding, RegistrationForm, SubmitError, Widget};
pub use service::EventService;
