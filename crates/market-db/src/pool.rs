//! # Store Facade
//!
//! Pool creation plus one lazily-built repository per entity.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Store                                          │
//! │                                                                         │
//! │  Service startup                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreConfig::from_env() ← host, user, database, password, port        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store::connect(config).await ← Create pool + run migrations           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │               PgPool                     │                           │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐       │                           │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...   │  (max_connections)        │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘       │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       ▲                                                                 │
//! │       │ cloned handle                                                  │
//! │  ┌────┴──────────────────────────────────────────────────────────┐     │
//! │  │ OnceLock<BranchRepository>      built on first store.branch()  │     │
//! │  │ OnceLock<CategoryRepository>    ...                            │     │
//! │  │ OnceLock<ProductRepository>                                    │     │
//! │  │ OnceLock<StorageComingRepository>                              │     │
//! │  │ OnceLock<StorageComingProductRepository>                       │     │
//! │  └───────────────────────────────────────────────────────────────┘     │
//! │                                                                         │
//! │  Each operation borrows one connection for one statement.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::OnceLock;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::branch::BranchRepository;
use crate::repository::category::CategoryRepository;
use crate::repository::product::ProductRepository;
use crate::repository::storage_coming::StorageComingRepository;
use crate::repository::storage_coming_product::StorageComingProductRepository;

/// Main store handle providing repository access.
///
/// Share it behind an `Arc` (or a framework's state container); every
/// accessor takes `&self`.
///
/// ## Usage
/// ```rust,ignore
/// let store = Store::connect(StoreConfig::from_env()?).await?;
///
/// let branch = store.branch().get_by_id(&id).await?;
/// let page = store.product().get_list(&ListRequest::page(0, 20)).await?;
///
/// store.close().await;
/// ```
#[derive(Debug)]
pub struct Store {
    /// The PostgreSQL connection pool.
    pool: PgPool,

    branch: OnceLock<BranchRepository>,
    category: OnceLock<CategoryRepository>,
    product: OnceLock<ProductRepository>,
    storage_coming: OnceLock<StorageComingRepository>,
    storage_coming_product: OnceLock<StorageComingProductRepository>,
}

impl Store {
    /// Creates the connection pool and, if configured, runs migrations.
    ///
    /// ## Returns
    /// * `Ok(Store)` - Ready-to-use store
    /// * `Err(DbError::ConnectionFailed)` - Server unreachable or credentials rejected
    /// * `Err(DbError::MigrationFailed)` - Schema could not be brought up to date
    pub async fn connect(config: StoreConfig) -> DbResult<Self> {
        info!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "Initializing database connection"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(config.connect_options())
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Database pool created"
        );

        let store = Store::from_pool(pool);

        if config.run_migrations {
            store.run_migrations().await?;
        }

        Ok(store)
    }

    /// Wraps an existing pool. No connection is made and no migrations run.
    pub fn from_pool(pool: PgPool) -> Self {
        Store {
            pool,
            branch: OnceLock::new(),
            category: OnceLock::new(),
            product: OnceLock::new(),
            storage_coming: OnceLock::new(),
            storage_coming_product: OnceLock::new(),
        }
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    ///
    /// For queries not covered by repositories.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the branch repository.
    pub fn branch(&self) -> &BranchRepository {
        self.branch.get_or_init(|| {
            debug!("Initializing branch repository");
            BranchRepository::new(self.pool.clone())
        })
    }

    /// Returns the category repository.
    pub fn category(&self) -> &CategoryRepository {
        self.category.get_or_init(|| {
            debug!("Initializing category repository");
            CategoryRepository::new(self.pool.clone())
        })
    }

    /// Returns the product repository.
    ///
    /// ## Example
    /// ```rust,ignore
    /// store.product().patch(&PatchProduct::new(id).set("price", 9_900)).await?;
    /// ```
    pub fn product(&self) -> &ProductRepository {
        self.product.get_or_init(|| {
            debug!("Initializing product repository");
            ProductRepository::new(self.pool.clone())
        })
    }

    /// Returns the stock intake repository.
    pub fn storage_coming(&self) -> &StorageComingRepository {
        self.storage_coming.get_or_init(|| {
            debug!("Initializing storage coming repository");
            StorageComingRepository::new(self.pool.clone())
        })
    }

    /// Returns the intake line item repository.
    pub fn storage_coming_product(&self) -> &StorageComingProductRepository {
        self.storage_coming_product.get_or_init(|| {
            debug!("Initializing storage coming product repository");
            StorageComingProductRepository::new(self.pool.clone())
        })
    }

    /// Closes the connection pool.
    ///
    /// Waits for checked-out connections to be returned. Calling it again is a
    /// no-op. Operations issued afterwards fail with
    /// [`DbError::ConnectionFailed`].
    pub async fn close(&self) {
        if self.pool.is_closed() {
            return;
        }
        info!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use market_core::{PatchProduct, UpdateStorageComing, ValidationError};

    use super::*;

    /// A store whose pool never dials out until a query runs.
    fn lazy_store() -> Store {
        let options = StoreConfig::new("127.0.0.1", "market").port(1).connect_options();
        Store::from_pool(PgPoolOptions::new().connect_lazy_with(options))
    }

    #[tokio::test]
    async fn test_accessors_return_the_same_instance() {
        let store = lazy_store();

        assert!(std::ptr::eq(store.branch(), store.branch()));
        assert!(std::ptr::eq(store.category(), store.category()));
        assert!(std::ptr::eq(store.product(), store.product()));
        assert!(std::ptr::eq(store.storage_coming(), store.storage_coming()));
        assert!(std::ptr::eq(
            store.storage_coming_product(),
            store.storage_coming_product()
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use_builds_one_repository() {
        let store = Arc::new(lazy_store());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.product() as *const ProductRepository as usize })
            })
            .collect();

        let mut addresses = Vec::new();
        for handle in handles {
            addresses.push(handle.await.unwrap());
        }
        addresses.dedup();
        assert_eq!(addresses.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected_before_any_query() {
        let store = lazy_store();
        let req = UpdateStorageComing {
            id: "s-1".to_string(),
            coming_id: "WB-1".to_string(),
            branch_id: String::new(),
            status: "finished".to_string(),
        };

        let err = store.storage_coming().update(&req).await.unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::NotAllowed { ref field, .. }) if field == "status"
        ));
    }

    #[tokio::test]
    async fn test_empty_patch_is_rejected_before_any_query() {
        let store = lazy_store();
        let err = store.product().patch(&PatchProduct::new("p-1")).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Validation(ValidationError::Required { ref field }) if field == "fields"
        ));
    }

    #[tokio::test]
    async fn test_patch_cannot_touch_id() {
        let store = lazy_store();
        let patch = PatchProduct::new("p-1").set("id", "other");
        let err = store.product().patch(&patch).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_mistyped_patch_values_are_rejected_before_any_query() {
        let store = lazy_store();
        let cases = [
            ("price", serde_json::json!(12.6)),
            ("price", serde_json::json!(true)),
            ("price", serde_json::json!(null)),
            ("name", serde_json::json!(7)),
            ("barcode", serde_json::json!(null)),
            ("category_id", serde_json::json!(42)),
        ];

        for (field, value) in cases {
            let patch = PatchProduct::new("p-1").set(field, value.clone());
            let err = store.product().patch(&patch).await.unwrap_err();
            assert!(
                matches!(
                    err,
                    DbError::Validation(ValidationError::InvalidFormat { field: ref f, .. }) if f == field
                ),
                "{field} = {value}: {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let store = lazy_store();
        assert!(!store.is_closed());

        store.close().await;
        store.close().await;

        assert!(store.is_closed());
        assert!(!store.health_check().await);
    }
}
