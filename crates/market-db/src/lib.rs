//! # market-db: Database Layer for the Market Inventory Store
//!
//! This crate provides PostgreSQL access for branches, categories, products,
//! stock intakes and intake line items. It uses sqlx with a single shared
//! connection pool.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Market Store Data Flow                           │
//! │                                                                         │
//! │  Request handler (update_product)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     market-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │     Store     │    │  Repositories │    │    Binder    │  │   │
//! │  │   │   (pool.rs)   │    │ branch.rs ... │    │  (query.rs)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ PgPool        │◄───│ BranchRepo    │───►│ :name → $1   │  │   │
//! │  │   │ OnceLock repo │    │ ProductRepo   │    │ nullable.rs  │  │   │
//! │  │   │ handles       │    │ ...           │    │ "" ↔ NULL    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     PostgreSQL                                  │   │
//! │  │   branch · category · product · storage_coming · income_products│   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Connection settings and environment loading
//! - [`pool`] - The [`Store`] facade owning the pool
//! - [`migrations`] - Embedded database migrations
//! - [`query`] - Named-parameter binder
//! - [`nullable`] - Optional reference mapping
//! - [`error`] - Database error types
//! - [`repository`] - One repository per entity
//!
//! ## Usage
//!
//! ```rust,ignore
//! use market_core::{CreateBranch, ListRequest};
//! use market_db::{Store, StoreConfig};
//!
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//!
//! let id = store.branch().create(&CreateBranch {
//!     name: "Chilonzor".into(),
//!     address: "Bunyodkor 12".into(),
//!     phone_number: "+998901234567".into(),
//! }).await?;
//!
//! let page = store.branch().get_list(&ListRequest::page(0, 20)).await?;
//! store.close().await;
//! ```
//!
//! ## Cancellation
//! Every operation is an `async fn`. Dropping its future (for example via
//! `tokio::time::timeout` or `tokio::select!`) abandons the round-trip and the
//! connection goes back to the pool.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod nullable;
pub mod pool;
pub mod query;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, StoreConfig};
pub use error::{DbError, DbResult};
pub use pool::Store;
pub use query::{BindError, BoundQuery, Params, SqlValue};

// Repository re-exports for convenience
pub use repository::branch::BranchRepository;
pub use repository::category::CategoryRepository;
pub use repository::product::ProductRepository;
pub use repository::storage_coming::StorageComingRepository;
pub use repository::storage_coming_product::StorageComingProductRepository;
