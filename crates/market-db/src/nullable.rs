//! Optional reference columns: `""` in the domain, `NULL` in the table.
//!
//! The mapping is lossy: writing `""` and writing nothing both
//! read back as `""`.

use crate::query::SqlValue;

/// Domain → column: an empty string becomes `NULL`.
pub fn to_storage(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Column → domain: `NULL` becomes an empty string.
pub fn from_storage(value: Option<String>) -> String {
    value.unwrap_or_default()
}

/// Applies [`to_storage`] to an already-converted value, for patch payloads.
pub(crate) fn to_storage_value(value: SqlValue) -> SqlValue {
    match value {
        SqlValue::Text(s) if s.is_empty() => SqlValue::Null,
        other => other,
    }
}
