//! # Domain Types
//!
//! Entities and request shapes used throughout the Market store.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Branch      │   │    Category     │   │     Product     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name           │   │  name           │   │  name, barcode  │       │
//! │  │  address        │   │  parent_id ─┐   │   │  price (minor)  │       │
//! │  │  phone_number   │   │      ▲──────┘   │   │  category_id ───┼──►Cat │
//! │  └────────▲────────┘   └─────────────────┘   └─────────────────┘       │
//! │           │                                                             │
//! │  ┌────────┴────────┐        1 : N        ┌──────────────────────────┐  │
//! │  │  StorageComing  │◄────────────────────│  StorageComingProduct    │  │
//! │  │  ─────────────  │                     │  ──────────────────────  │  │
//! │  │  coming_id      │                     │  name, quantity, price   │  │
//! │  │  branch_id      │                     │  total_price = q × price │  │
//! │  │  status         │                     │  category_id             │  │
//! │  │  date_time      │                     │  storage_coming_id       │  │
//! │  └─────────────────┘                     └──────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Optional References
//! Optional references (`category_id`, `parent_id`, `branch_id`, ...) are plain
//! `String`s here. An empty string means "no reference"; the database layer
//! stores it as `NULL` and reads `NULL` back as `""`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, ValidationResult};
use crate::money::Money;
use crate::DEFAULT_LIST_LIMIT;

// =============================================================================
// Listing
// =============================================================================

/// Paging and search parameters shared by every `get_list` operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub search: String,
}

impl ListRequest {
    /// Creates a request for one page without a search filter.
    pub fn page(offset: i64, limit: i64) -> Self {
        ListRequest {
            offset,
            limit,
            search: String::new(),
        }
    }

    /// Adds a case-insensitive substring filter.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Offset to use in SQL: non-positive values become 0.
    pub fn effective_offset(&self) -> i64 {
        if self.offset > 0 {
            self.offset
        } else {
            0
        }
    }

    /// Limit to use in SQL: non-positive values become [`DEFAULT_LIST_LIMIT`].
    pub fn effective_limit(&self) -> i64 {
        if self.limit > 0 {
            self.limit
        } else {
            DEFAULT_LIST_LIMIT
        }
    }

    /// The search term, or `None` when no filter applies.
    pub fn search_term(&self) -> Option<&str> {
        if self.search.is_empty() {
            None
        } else {
            Some(self.search.as_str())
        }
    }
}

/// One page of entities plus the total number of rows matching the filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows matching the filter, independent of offset/limit.
    pub count: i64,
    pub items: Vec<T>,
}

// =============================================================================
// Branch
// =============================================================================

/// A physical shop location receiving stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBranch {
    pub name: String,
    pub address: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBranch {
    pub id: String,
    pub name: String,
    pub address: String,
    pub phone_number: String,
}

// =============================================================================
// Category
// =============================================================================

/// A product category, optionally nested under a parent category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    /// Parent category id, `""` for a top-level category.
    pub parent_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    #[serde(default)]
    pub parent_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: String,
}

// =============================================================================
// Product
// =============================================================================

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub barcode: String,
    /// Price in minor units.
    pub price: Money,
    /// Category id, `""` when uncategorised.
    pub category_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    pub barcode: String,
    pub price: Money,
    #[serde(default)]
    pub category_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub id: String,
    pub name: String,
    pub barcode: String,
    pub price: Money,
    #[serde(default)]
    pub category_id: String,
}

/// Sparse product update: only the listed columns change.
///
/// ## Example
/// ```rust
/// use market_core::PatchProduct;
///
/// let patch = PatchProduct::new("6f1c...")
///     .set("price", 12_900)
///     .set("name", "Green tea 1l");
/// assert_eq!(patch.fields.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatchProduct {
    pub id: String,
    /// Column name → new value. Sorted, so generated SQL is deterministic.
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl PatchProduct {
    pub fn new(id: impl Into<String>) -> Self {
        PatchProduct {
            id: id.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds or replaces one field.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

// =============================================================================
// Storage Coming (stock intake)
// =============================================================================

/// Lifecycle state of a stock intake.
///
/// ## State Machine
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────┐
/// │   create ──► "in process" ──update("fineshed")──► "fineshed"        │
/// │                   ▲   │                              │              │
/// │                   └───┘ update("in process")         │              │
/// │                     date_time kept                   │              │
/// │                                                      ▼              │
/// │                                     date_time = NOW() on each      │
/// │                                     update to "fineshed"           │
/// │                                                                     │
/// │   any other status string ──► ValidationError, nothing written     │
/// └─────────────────────────────────────────────────────────────────────┘
/// ```
///
/// The finished literal is `"fineshed"`, matching rows already stored by
/// earlier deployments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StorageComingStatus {
    #[default]
    #[serde(rename = "in process")]
    InProcess,
    #[serde(rename = "fineshed")]
    Finished,
}

impl StorageComingStatus {
    /// Every accepted status literal.
    pub const ALLOWED: [&'static str; 2] = ["in process", "fineshed"];

    /// The literal stored in the `status` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            StorageComingStatus::InProcess => "in process",
            StorageComingStatus::Finished => "fineshed",
        }
    }

    /// Whether moving into this status stamps a fresh `date_time`.
    pub const fn refreshes_date_time(&self) -> bool {
        matches!(self, StorageComingStatus::Finished)
    }
}

impl fmt::Display for StorageComingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageComingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in process" => Ok(StorageComingStatus::InProcess),
            "fineshed" => Ok(StorageComingStatus::Finished),
            _ => Err(ValidationError::not_allowed("status", &Self::ALLOWED)),
        }
    }
}

impl TryFrom<String> for StorageComingStatus {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A stock intake event at a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageComing {
    pub id: String,
    /// External reference of the delivery (waybill number, ...).
    pub coming_id: String,
    /// Receiving branch, `""` when unassigned.
    pub branch_id: String,
    pub status: StorageComingStatus,
    /// When the intake happened; refreshed when it is marked finished.
    pub date_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStorageComing {
    pub coming_id: String,
    #[serde(default)]
    pub branch_id: String,
}

/// Full update of an intake.
///
/// `status` stays a raw string so that an unsupported value is reported by
/// the update operation itself rather than by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStorageComing {
    pub id: String,
    pub coming_id: String,
    #[serde(default)]
    pub branch_id: String,
    pub status: String,
}

impl UpdateStorageComing {
    /// Parses the requested status.
    pub fn parsed_status(&self) -> ValidationResult<StorageComingStatus> {
        self.status.parse()
    }
}

// =============================================================================
// Storage Coming Product (intake line item)
// =============================================================================

/// One received product line inside an intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageComingProduct {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    /// Unit price in minor units.
    pub price: Money,
    /// Always `quantity × price`.
    pub total_price: Money,
    pub category_id: String,
    pub storage_coming_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStorageComingProduct {
    pub name: String,
    pub quantity: i64,
    pub price: Money,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub storage_coming_id: String,
}

impl CreateStorageComingProduct {
    /// `quantity × price`, or a validation error on overflow.
    pub fn total_price(&self) -> ValidationResult<Money> {
        line_total(self.quantity, self.price)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStorageComingProduct {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub price: Money,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub storage_coming_id: String,
}

impl UpdateStorageComingProduct {
    /// `quantity × price`, or a validation error on overflow.
    pub fn total_price(&self) -> ValidationResult<Money> {
        line_total(self.quantity, self.price)
    }
}

fn line_total(quantity: i64, price: Money) -> ValidationResult<Money> {
    price.times(quantity).ok_or_else(|| ValidationError::Overflow {
        field: "total_price".to_string(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
