//! Participant-supplied values for custom fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::schema::FieldType;

/// A single submitted custom-field value.
///
/// Untagged on the wire: text and select answers serialize as JSON strings,
/// numbers as numbers, checkbox answers as booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Whether this value counts as "unset" for required-field validation.
    ///
    /// Only an empty (or whitespace-only) text answer is unset; an explicit
    /// `false` checkbox is a real answer and `0` is a real number.
    pub fn is_unset(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.trim().is_empty())
    }

    /// Parse a raw widget input according to the field's declared type.
    ///
    /// Malformed numeric input is rejected here, before submission, rather
    /// than deferred to the server.
    pub fn parse(field_type: FieldType, raw: &str) -> Result<FieldValue, FormError> {
        match field_type {
            FieldType::Text | FieldType::Select => Ok(FieldValue::Text(raw.to_string())),
            FieldType::Boolean => Ok(FieldValue::Flag(matches!(
                raw.trim().to_ascii_lowercase().as_str(),
                "true" | "1" | "on" | "yes"
            ))),
            FieldType::Number => {
                let trimmed = raw.trim();
                match trimmed.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(FieldValue::Number(n)),
                    _ => Err(FormError::InvalidNumber {
                        raw: trimmed.to_string(),
                    }),
                }
            }
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Flag(true) => write!(f, "Yes"),
            FieldValue::Flag(false) => write!(f, "No"),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}
