//! # Storage Coming Product Repository
//!
//! Line items of a stock intake, stored in `income_products`.
//!
//! `total_price` is never taken from the caller: create and update compute
//! `quantity × price` and write it alongside the inputs.

use market_core::{
    CreateStorageComingProduct, ListRequest, Money, Page, StorageComingProduct,
    UpdateStorageComingProduct,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use super::{fetch_page, generate_id, ListSource};
use crate::error::{DbError, DbResult};
use crate::nullable::{from_storage, to_storage};
use crate::query::{bind_named, Params};

const LIST_SOURCE: ListSource = ListSource {
    table: "income_products",
    columns: "id, name, quantity, price, total_price, category_id, storage_coming_id, created_at, updated_at",
    search_column: "name",
};

/// Repository for intake line items.
#[derive(Debug, Clone)]
pub struct StorageComingProductRepository {
    pool: PgPool,
}

impl StorageComingProductRepository {
    /// Creates a new StorageComingProductRepository.
    pub fn new(pool: PgPool) -> Self {
        StorageComingProductRepository { pool }
    }

    /// Inserts a line item and returns its generated ID.
    ///
    /// ## Errors
    /// * `DbError::Validation` - `quantity × price` overflows
    pub async fn create(&self, req: &CreateStorageComingProduct) -> DbResult<String> {
        let total_price = req.total_price()?;
        let id = generate_id();

        debug!(
            id = %id,
            storage_coming_id = %req.storage_coming_id,
            quantity = req.quantity,
            total_price = %total_price,
            "Creating storage coming product"
        );

        sqlx::query(
            r#"
            INSERT INTO income_products (
                id, name, quantity, price, total_price,
                category_id, storage_coming_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(req.quantity)
        .bind(req.price.minor())
        .bind(total_price.minor())
        .bind(to_storage(&req.category_id))
        .bind(to_storage(&req.storage_coming_id))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Gets a line item by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<StorageComingProduct> {
        let row = sqlx::query(
            r#"
            SELECT id, name, quantity, price, total_price,
                   category_id, storage_coming_id, created_at, updated_at
            FROM income_products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("StorageComingProduct", id))?;

        Ok(line_from_row(&row)?)
    }

    /// Lists line items, filtering by name when `search` is set.
    pub async fn get_list(&self, req: &ListRequest) -> DbResult<Page<StorageComingProduct>> {
        fetch_page(&self.pool, LIST_SOURCE, req, line_from_row).await
    }

    /// Rewrites a line item and recomputes its total. Returns rows affected.
    pub async fn update(&self, req: &UpdateStorageComingProduct) -> DbResult<u64> {
        let total_price = req.total_price()?;

        debug!(id = %req.id, total_price = %total_price, "Updating storage coming product");

        let params = Params::new()
            .with("id", &req.id)
            .with("name", &req.name)
            .with("quantity", req.quantity)
            .with("price", req.price)
            .with("total_price", total_price)
            .with("category_id", to_storage(&req.category_id))
            .with("storage_coming_id", to_storage(&req.storage_coming_id));

        let bound = bind_named(
            r#"
            UPDATE income_products SET
                name = :name,
                quantity = :quantity,
                price = :price,
                total_price = :total_price,
                category_id = :category_id,
                storage_coming_id = :storage_coming_id,
                updated_at = NOW()
            WHERE id = :id
            "#,
            &params,
        )?;

        let result = bound.query().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Deletes a line item. Deleting an unknown ID is not an error.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting storage coming product");

        sqlx::query("DELETE FROM income_products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deletes every line item of one intake. Returns how many were removed.
    pub async fn delete_by_storage_coming(&self, storage_coming_id: &str) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM income_products WHERE storage_coming_id = $1")
            .bind(storage_coming_id)
            .execute(&self.pool)
            .await?;

        debug!(
            storage_coming_id = %storage_coming_id,
            removed = result.rows_affected(),
            "Deleted storage coming products"
        );

        Ok(result.rows_affected())
    }
}

fn line_from_row(row: &PgRow) -> Result<StorageComingProduct, sqlx::Error> {
    Ok(StorageComingProduct {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        quantity: row.try_get("quantity")?,
        price: Money::from_minor(row.try_get("price")?),
        total_price: Money::from_minor(row.try_get("total_price")?),
        category_id: from_storage(row.try_get("category_id")?),
        storage_coming_id: from_storage(row.try_get("storage_coming_id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
