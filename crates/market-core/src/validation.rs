//! # Validation Module
//!
//! Input rules checked before any SQL is issued.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request layer                                                │
//! │  └── Deserialization into the request types (types.rs)                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE + StorageComingStatus::from_str                  │
//! │  ├── Intake status must be a known literal                             │
//! │  └── Patch must name known columns with values of the column's type    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: PostgreSQL                                                   │
//! │  ├── PRIMARY KEY uniqueness                                            │
//! │  └── NOT NULL / type checks                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::types::PatchProduct;

/// JSON shape a patchable column accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// A JSON string.
    Text,
    /// A JSON string, or `null` to clear the reference.
    OptionalText,
    /// A JSON integer that fits in `i64` (money in minor units, counts).
    Integer,
}

impl ColumnKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            ColumnKind::Text => value.is_string(),
            ColumnKind::OptionalText => value.is_string() || value.is_null(),
            ColumnKind::Integer => value.as_i64().is_some(),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            ColumnKind::Text => "expected a string",
            ColumnKind::OptionalText => "expected a string or null",
            ColumnKind::Integer => "expected a 64-bit integer",
        }
    }
}

/// A column that a sparse patch may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchColumn {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl PatchColumn {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        PatchColumn { name, kind }
    }
}

/// Validates a sparse patch against the columns that may be patched.
///
/// ## Rules
/// - At least one field must be supplied
/// - Every field must be one of `columns`; field names end up in the SQL text
/// - Every value must match its column's [`ColumnKind`]
///
/// ## Example
/// ```rust
/// use market_core::PatchProduct;
/// use market_core::validation::{validate_patch_fields, ColumnKind, PatchColumn};
///
/// let columns = [
///     PatchColumn::new("name", ColumnKind::Text),
///     PatchColumn::new("price", ColumnKind::Integer),
/// ];
/// assert!(validate_patch_fields(&PatchProduct::new("p").set("price", 5), &columns).is_ok());
/// assert!(validate_patch_fields(&PatchProduct::new("p").set("price", 5.5), &columns).is_err());
/// assert!(validate_patch_fields(&PatchProduct::new("p"), &columns).is_err());
/// assert!(validate_patch_fields(&PatchProduct::new("p").set("id", "x"), &columns).is_err());
/// ```
pub fn validate_patch_fields(patch: &PatchProduct, columns: &[PatchColumn]) -> ValidationResult<()> {
    if patch.fields.is_empty() {
        return Err(ValidationError::Required {
            field: "fields".to_string(),
        });
    }

    for (field, value) in &patch.fields {
        let column = columns
            .iter()
            .find(|column| column.name == field.as_str())
            .ok_or_else(|| {
                let allowed: Vec<&str> = columns.iter().map(|column| column.name).collect();
                ValidationError::not_allowed(field.as_str(), &allowed)
            })?;

        if !column.kind.accepts(value) {
            return Err(ValidationError::InvalidFormat {
                field: field.clone(),
                reason: column.kind.expected().to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: [PatchColumn; 4] = [
        PatchColumn::new("name", ColumnKind::Text),
        PatchColumn::new("barcode", ColumnKind::Text),
        PatchColumn::new("price", ColumnKind::Integer),
        PatchColumn::new("category_id", ColumnKind::OptionalText),
    ];

    fn reason_for(field: &str, value: Value) -> Option<String> {
        match validate_patch_fields(&PatchProduct::new("p-1").set(field, value), &COLUMNS) {
            Err(ValidationError::InvalidFormat { reason, .. }) => Some(reason),
            _ => None,
        }
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        let err = validate_patch_fields(&PatchProduct::new("p-1"), &COLUMNS).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Required {
                field: "fields".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_column_is_rejected() {
        for field in ["id", "created_at", "name; DROP TABLE product", "title"] {
            let patch = PatchProduct::new("p-1").set(field, "x");
            let err = validate_patch_fields(&patch, &COLUMNS).unwrap_err();
            match err {
                ValidationError::NotAllowed { allowed, .. } => {
                    assert_eq!(allowed, ["name", "barcode", "price", "category_id"], "{field}")
                }
                other => panic!("{field}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_price_must_be_an_integer() {
        for value in [json!(12.6), json!(true), json!("100"), json!(null), json!(u64::MAX)] {
            assert_eq!(
                reason_for("price", value.clone()).as_deref(),
                Some("expected a 64-bit integer"),
                "{value}"
            );
        }
        assert_eq!(reason_for("price", json!(-5)), None);
    }

    #[test]
    fn test_text_columns_must_be_strings() {
        for field in ["name", "barcode"] {
            for value in [json!(42), json!(null), json!(false), json!(["a"])] {
                assert_eq!(
                    reason_for(field, value.clone()).as_deref(),
                    Some("expected a string"),
                    "{field} = {value}"
                );
            }
        }
    }

    #[test]
    fn test_category_is_string_or_null() {
        assert_eq!(reason_for("category_id", json!("c-1")), None);
        assert_eq!(reason_for("category_id", json!("")), None);
        assert_eq!(reason_for("category_id", json!(null)), None);
        assert_eq!(
            reason_for("category_id", json!(42)).as_deref(),
            Some("expected a string or null")
        );
        assert!(reason_for("category_id", json!({"id": "c-1"})).is_some());
    }

    #[test]
    fn test_valid_patch() {
        let patch = PatchProduct::new("p-1")
            .set("name", "Kefir 1l")
            .set("price", 14_000)
            .set("category_id", json!(null));
        assert!(validate_patch_fields(&patch, &COLUMNS).is_ok());
    }
}
