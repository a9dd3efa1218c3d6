//! # market-core: Domain Model for the Market Inventory Store
//!
//! This crate holds the entity types, request shapes and the small amount of
//! domain logic the store needs, as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Market Store Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │             Request layer (HTTP handlers, CLI, jobs)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ in-process calls                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ market-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ validation│  │   error   │  │   │
//! │  │   │  Branch   │  │   Money   │  │  status   │  │Validation │  │   │
//! │  │   │  Product  │  │ line total│  │  patch    │  │  Error    │  │   │
//! │  │   │  Intake   │  │           │  │  fields   │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 market-db (Database Layer)                      │   │
//! │  │        PostgreSQL repositories, binder, store facade            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Branch, Category, Product, StorageComing, ...) and requests
//! - [`money`] - Integer money in minor units
//! - [`error`] - Validation error types
//! - [`validation`] - Input rules checked before any store round-trip
//!
//! ## Example Usage
//!
//! ```rust
//! use market_core::{CreateStorageComingProduct, Money, StorageComingStatus};
//!
//! let line = CreateStorageComingProduct {
//!     name: "Sparkling water 0.5l".to_string(),
//!     quantity: 12,
//!     price: Money::from_minor(4_500),
//!     category_id: String::new(),
//!     storage_coming_id: String::new(),
//! };
//! assert_eq!(line.total_price().unwrap().minor(), 54_000);
//!
//! let status: StorageComingStatus = "fineshed".parse().unwrap();
//! assert_eq!(status, StorageComingStatus::Finished);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ValidationError, ValidationResult};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a list request carries a non-positive limit.
pub const DEFAULT_LIST_LIMIT: i64 = 10;
