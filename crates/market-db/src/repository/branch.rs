//! # Branch Repository
//!
//! Database operations for shop branches.

use market_core::{Branch, CreateBranch, ListRequest, Page, UpdateBranch};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;

use super::{fetch_page, generate_id, ListSource};
use crate::error::{DbError, DbResult};
use crate::query::{bind_named, Params};

const LIST_SOURCE: ListSource = ListSource {
    table: "branch",
    columns: "id, name, address, phone_number, created_at, updated_at",
    search_column: "name",
};

/// Repository for branch database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = store.branch();
///
/// let id = repo.create(&CreateBranch { name: "Chilonzor".into(), ..Default::default() }).await?;
/// let branch = repo.get_by_id(&id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    /// Creates a new BranchRepository.
    pub fn new(pool: PgPool) -> Self {
        BranchRepository { pool }
    }

    /// Inserts a branch and returns its generated ID.
    pub async fn create(&self, req: &CreateBranch) -> DbResult<String> {
        let id = generate_id();

        debug!(id = %id, name = %req.name, "Creating branch");

        sqlx::query(
            r#"
            INSERT INTO branch (id, name, address, phone_number, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.address)
        .bind(&req.phone_number)
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Gets a branch by its ID.
    ///
    /// ## Returns
    /// * `Ok(Branch)` - Branch found
    /// * `Err(DbError::NotFound)` - No branch with this ID
    pub async fn get_by_id(&self, id: &str) -> DbResult<Branch> {
        let row = sqlx::query(
            r#"
            SELECT id, name, address, phone_number, created_at, updated_at
            FROM branch
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Branch", id))?;

        Ok(branch_from_row(&row)?)
    }

    /// Lists branches, filtering by name when `search` is set.
    pub async fn get_list(&self, req: &ListRequest) -> DbResult<Page<Branch>> {
        fetch_page(&self.pool, LIST_SOURCE, req, branch_from_row).await
    }

    /// Replaces every mutable field. Returns rows affected (0 for an unknown ID).
    pub async fn update(&self, req: &UpdateBranch) -> DbResult<u64> {
        debug!(id = %req.id, "Updating branch");

        let params = Params::new()
            .with("id", &req.id)
            .with("name", &req.name)
            .with("address", &req.address)
            .with("phone_number", &req.phone_number);

        let bound = bind_named(
            r#"
            UPDATE branch SET
                name = :name,
                address = :address,
                phone_number = :phone_number,
                updated_at = NOW()
            WHERE id = :id
            "#,
            &params,
        )?;

        let result = bound.query().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Deletes a branch. Deleting an unknown ID is not an error.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting branch");

        sqlx::query("DELETE FROM branch WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn branch_from_row(row: &PgRow) -> Result<Branch, sqlx::Error> {
    Ok(Branch {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        address: row.try_get("address")?,
        phone_number: row.try_get("phone_number")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
