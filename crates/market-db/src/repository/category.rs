//! # Category Repository
//!
//! Database operations for product categories.
//!
//! `parent_id` is optional: `""` is written as `NULL` and read back as `""`.

use market_core::{Category, CreateCategory, ListRequest, Page, UpdateCategory};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use super::{fetch_page, generate_id, ListSource};
use crate::error::{DbError, DbResult};
use crate::nullable::{from_storage, to_storage};
use crate::query::{bind_named, Params};

const LIST_SOURCE: ListSource = ListSource {
    table: "category",
    columns: "id, name, parent_id, created_at, updated_at",
    search_column: "name",
};

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: PgPool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a category and returns its generated ID.
    pub async fn create(&self, req: &CreateCategory) -> DbResult<String> {
        let id = generate_id();

        debug!(id = %id, name = %req.name, parent_id = %req.parent_id, "Creating category");

        sqlx::query(
            r#"
            INSERT INTO category (id, name, parent_id, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(to_storage(&req.parent_id))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Gets a category by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Category> {
        let row = sqlx::query(
            r#"
            SELECT id, name, parent_id, created_at, updated_at
            FROM category
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Category", id))?;

        Ok(category_from_row(&row)?)
    }

    /// Lists categories, filtering by name when `search` is set.
    pub async fn get_list(&self, req: &ListRequest) -> DbResult<Page<Category>> {
        fetch_page(&self.pool, LIST_SOURCE, req, category_from_row).await
    }

    /// Replaces name and parent. Returns rows affected.
    pub async fn update(&self, req: &UpdateCategory) -> DbResult<u64> {
        debug!(id = %req.id, "Updating category");

        let params = Params::new()
            .with("id", &req.id)
            .with("name", &req.name)
            .with("parent_id", to_storage(&req.parent_id));

        let bound = bind_named(
            r#"
            UPDATE category SET
                name = :name,
                parent_id = :parent_id,
                updated_at = NOW()
            WHERE id = :id
            "#,
            &params,
        )?;

        let result = bound.query().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Deletes a category. Children keep their `parent_id`.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn category_from_row(row: &PgRow) -> Result<Category, sqlx::Error> {
    Ok(Category {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        parent_id: from_storage(row.try_get("parent_id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
