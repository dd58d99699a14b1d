pub mod error;
pub mod fields;
pub mod models;
pub mod schema;
pub mod value;

// Re-export error types
pub use error::{ApiError, ExportError, FormError, SchemaError};

// Re-export the standard export field table
pub use fields::{custom_field_id, StandardField, CUSTOM_FIELD_PREFIX, STANDARD_FIELDS};

// Re-export wire models
pub use models::{Event, EventDraft, ExportFormat, Participant, RegisterRequest};

// Re-export schema types and the normalization boundary
pub use schema::{
    build_options, join_options, normalize, normalize_text, validate_name, FieldSchema, FieldType,
};

// Re-export the value union
pub use value::FieldValue;
