use serde::{Deserialize, Serialize};

/// Structured error types for API operations.
///
/// Server-reported failures carry the server's own message so the frontend
/// can surface it verbatim; [`ApiError::GENERIC_MESSAGE`] stands in when the
/// server gives none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ApiError {
    #[error("event not found: {id}")]
    EventNotFound { id: String },

    #[error("participant not found: {id}")]
    ParticipantNotFound { id: String },

    #[error("registration failed: {message}")]
    RegistrationFailed { message: String },

    #[error("could not save event fields: {message}")]
    SchemaPersistFailed { message: String },

    #[error("report generation failed: {message}")]
    ExportFailed { message: String },

    #[error("network error: {message}")]
    Network { message: String },

    #[error("unexpected response: {message}")]
    Decode { message: String },

    #[error("server returned {status}: {message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    /// Fallback shown when the server reports a failure without a message.
    pub const GENERIC_MESSAGE: &'static str = "something went wrong, please try again";
}

/// Rejections raised while authoring a custom-field schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("field name cannot be empty")]
    EmptyFieldName,

    #[error("a field named \"{name}\" already exists")]
    DuplicateFieldName { name: String },

    #[error("select field \"{name}\" needs at least one option")]
    NoOptions { name: String },
}

/// Per-field rejections raised when validating a registration form.
///
/// These are recovered entirely client-side: they block submission and never
/// reach the network.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("this field is required")]
    MissingRequiredField,

    #[error("\"{raw}\" is not a number")]
    InvalidNumber { raw: String },
}

/// Rejections raised while assembling or running a participant report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("select at least one field to print")]
    NoFieldsSelected,

    #[error("report generation failed: {message}")]
    GenerationFailed { message: String },
}

impl From<ApiError> for ExportError {
    fn from(err: ApiError) -> Self {
        ExportError::GenerationFailed {
            message: err.to_string(),
        }
    }
}
