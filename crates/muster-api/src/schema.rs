//! Custom-field schema types and the normalization boundary.
//!
//! An event's `custom_fields` payload may arrive in three shapes: a
//! structured array of field records, a JSON-encoded string of the same, or
//! a legacy comma-separated list of bare names. [`normalize`] collapses all
//! three into `Vec<FieldSchema>` at the decode boundary so nothing deeper in
//! the stack ever branches on representation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::SchemaError;

/// Input kind of a custom field.
///
/// Determines both the widget a frontend renders and the validation rule
/// applied to submitted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    /// Free text. Wire name is `"string"`.
    #[default]
    Text,
    Number,
    Boolean,
    /// Enumerated choice restricted to the field's options.
    Select,
}

impl FieldType {
    /// Wire representation used in event payloads.
    pub fn as_wire(&self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
        }
    }

    /// Decode a wire value. Unknown kinds fall back to `Text`.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" => FieldType::Text,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "select" => FieldType::Select,
            other => {
                if !other.is_empty() {
                    debug!("unknown field type {:?}, treating as string", other);
                }
                FieldType::Text
            }
        }
    }
}

impl Serialize for FieldType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(FieldType::from_wire(&raw))
    }
}

/// One custom field attached to an event.
///
/// `name` is the lookup key in value maps and must be unique (case-sensitive)
/// within an event's field set. `options` is only meaningful for `Select`
/// fields and is omitted from serialization when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            options: Vec::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn select(name: impl Into<String>, options: Vec<String>) -> Self {
        let mut field = Self::new(name, FieldType::Select);
        field.options = options;
        field
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Decode an event's `custom_fields` payload into a uniform schema list.
///
/// Accepts the structured array, a JSON-encoded string of the same, or the
/// legacy comma-separated name list. Anything else (null, objects, numbers)
/// normalizes to the empty set. Malformed entries inside a structured array
/// are dropped rather than poisoning the rest.
pub fn normalize(raw: &serde_json::Value) -> Vec<FieldSchema> {
    match raw {
        serde_json::Value::Array(items) => items
            .iter()
            .filter_map(|item| match serde_json::from_value(item.clone()) {
                Ok(field) => Some(field),
                Err(e) => {
                    debug!("dropping malformed custom field {}: {}", item, e);
                    None
                }
            })
            .collect(),
        serde_json::Value::String(text) => normalize_text(text),
        serde_json::Value::Null => Vec::new(),
        other => {
            debug!("custom_fields has unexpected shape: {}", other);
            Vec::new()
        }
    }
}

/// Decode the string form of `custom_fields`: first as JSON, then as the
/// legacy comma-separated name list.
///
/// Legacy names become non-required `Text` fields. The legacy shape is
/// upgraded in memory only; once a schema is edited it is re-serialized in
/// the structured form.
pub fn normalize_text(raw: &str) -> Vec<FieldSchema> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if value.is_array() {
            return normalize(&value);
        }
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(FieldSchema::text)
        .collect()
}

/// Check a candidate field name against the working set.
///
/// `editing` carries the index of the entry currently being edited in place,
/// if any, so a field may keep its own name. Returns the trimmed name to
/// store on success.
pub fn validate_name(
    candidate: &str,
    existing: &[FieldSchema],
    editing: Option<usize>,
) -> Result<String, SchemaError> {
    let name = candidate.trim();
    if name.is_empty() {
        return Err(SchemaError::EmptyFieldName);
    }

    let clash = existing
        .iter()
        .enumerate()
        .any(|(index, field)| field.name == name && editing != Some(index));
    if clash {
        return Err(SchemaError::DuplicateFieldName {
            name: name.to_string(),
        });
    }

    Ok(name.to_string())
}

/// Split a raw comma-separated options string into option labels.
///
/// Tokens are trimmed, empty tokens dropped, order preserved. Duplicate
/// labels are kept as authored.
pub fn build_options(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join option labels back into the editable comma-separated form.
pub fn join_options(options: &[String]) -> String {
    options.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_wire_round_trip() {
        for ty in [
            FieldType::Text,
            FieldType::Number,
            FieldType::Boolean,
            FieldType::Select,
        ] {
            assert_eq!(FieldType::from_wire(ty.as_wire()), ty);
        }
    }

    #[test]
    fn test_unknown_field_type_defaults_to_text() {
        assert_eq!(FieldType::from_wire("date"), FieldType::Text);
        assert_eq!(FieldType::from_wire(""), FieldType::Text);
        assert_eq!(FieldType::from_wire("  SELECT "), FieldType::Select);
    }

    #[test]
    fn test_normalize_round_trip_is_identity() {
        let fields = vec![
            FieldSchema::text("Team Name").required(),
            FieldSchema::number("Age"),
            FieldSchema::select(
                "Tier",
                vec!["Gold".to_string(), "Silver".to_string(), "Bronze".to_string()],
            )
            .required(),
        ];

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(normalize(&json), fields);

        // A JSON-encoded string of the same array normalizes identically.
        let text = serde_json::to_string(&fields).unwrap();
        assert_eq!(normalize_text(&text), fields);
    }

    #[test]
    fn test_normalize_legacy_comma_list() {
        let fields = normalize_text("a, b, c");
        assert_eq!(fields.len(), 3);
        for (field, name) in fields.iter().zip(["a", "b", "c"]) {
            assert_eq!(field.name, name);
            assert_eq!(field.field_type, FieldType::Text);
            assert!(!field.required);
            assert!(field.options.is_empty());
        }
    }

    #[test]
    fn test_normalize_legacy_drops_empty_names() {
        let fields = normalize_text(" a ,, ,b ");
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_normalize_missing_type_defaults() {
        let raw = serde_json::json!([{"name": "Roll No"}]);
        let fields = normalize(&raw);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type, FieldType::Text);
        assert!(!fields[0].required);
    }

    #[test]
    fn test_normalize_drops_malformed_entries() {
        let raw = serde_json::json!([{"name": "ok"}, {"type": "number"}, 42]);
        let fields = normalize(&raw);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "ok");
    }

    #[test]
    fn test_normalize_rejects_odd_shapes() {
        assert!(normalize(&serde_json::Value::Null).is_empty());
        assert!(normalize(&serde_json::json!({"name": "x"})).is_empty());
        assert!(normalize_text("   ").is_empty());
    }

    #[test]
    fn test_options_omitted_when_empty() {
        let json = serde_json::to_string(&FieldSchema::text("a")).unwrap();
        assert!(!json.contains("options"));

        let json = serde_json::to_string(&FieldSchema::select("t", vec!["x".into()])).unwrap();
        assert!(json.contains("\"options\":[\"x\"]"));
    }

    #[test]
    fn test_validate_name_rejects_duplicates() {
        let existing = vec![FieldSchema::text("Team Name")];

        let err = validate_name("Team Name", &existing, None).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateFieldName {
                name: "Team Name".to_string()
            }
        );

        // Editing the entry itself may keep its name.
        assert_eq!(
            validate_name(" Team Name ", &existing, Some(0)).unwrap(),
            "Team Name"
        );

        // Match is case-sensitive.
        assert!(validate_name("team name", &existing, None).is_ok());
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        assert_eq!(
            validate_name("   ", &[], None).unwrap_err(),
            SchemaError::EmptyFieldName
        );
    }

    #[test]
    fn test_build_options_splits_and_trims() {
        assert_eq!(
            build_options("Gold, Silver, Bronze"),
            vec!["Gold", "Silver", "Bronze"]
        );
        assert_eq!(build_options(" a ,, b , "), vec!["a", "b"]);
        assert!(build_options("").is_empty());
        // Duplicates are preserved as authored.
        assert_eq!(build_options("x, x"), vec!["x", "x"]);
    }

    #[test]
    fn test_join_options_round_trips_through_build() {
        let options = vec!["Gold".to_string(), "Silver".to_string()];
        assert_eq!(build_options(&join_options(&options)), options);
    }
}
