//! The fixed standard participant attributes offered to report exports.

/// A standard export column: stable identifier plus human label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardField {
    pub id: &'static str,
    pub label: &'static str,
}

/// The closed set of standard fields, in the order reports print them.
pub const STANDARD_FIELDS: [StandardField; 8] = [
    StandardField {
        id: "name",
        label: "Name",
    },
    StandardField {
        id: "enrollment_number",
        label: "Enrollment Number",
    },
    StandardField {
        id: "amity_email",
        label: "Amity Email",
    },
    StandardField {
        id: "phone_number",
        label: "Phone Number",
    },
    StandardField {
        id: "branch",
        label: "Branch",
    },
    StandardField {
        id: "year",
        label: "Year",
    },
    StandardField {
        id: "registered_at",
        label: "Registered At",
    },
    StandardField {
        id: "attendance",
        label: "Attendance",
    },
];

/// Prefix distinguishing custom-field columns from standard ones in
/// `fields_printed` identifiers.
pub const CUSTOM_FIELD_PREFIX: &str = "custom_";

/// Export identifier for a custom field name.
pub fn custom_field_id(name: &str) -> String {
    format!("{}{}", CUSTOM_FIELD_PREFIX, name)
}
