//! # Storage Coming Repository
//!
//! Database operations for stock intakes.
//!
//! ## Status Handling
//! ```text
//! update(req)
//!    │
//!    ├── req.status not a known literal ──► DbError::Validation (no SQL issued)
//!    │
//!    ├── "in process" ──► coming_id, branch_id, status, updated_at
//!    │
//!    └── "fineshed"   ──► same columns + date_time = NOW()
//! ```

use market_core::{
    CreateStorageComing, ListRequest, Page, StorageComing, StorageComingStatus,
    UpdateStorageComing,
};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, info, warn};

use super::{fetch_page, generate_id, ListSource};
use crate::error::{DbError, DbResult};
use crate::nullable::{from_storage, to_storage};
use crate::query::{bind_named, Params};

const LIST_SOURCE: ListSource = ListSource {
    table: "storage_coming",
    columns: "id, coming_id, branch_id, status, date_time, created_at, updated_at",
    search_column: "coming_id",
};

const UPDATE_KEEP_DATE_TIME: &str = r#"
    UPDATE storage_coming SET
        coming_id = :coming_id,
        branch_id = :branch_id,
        status = :status,
        updated_at = NOW()
    WHERE id = :id
"#;

const UPDATE_REFRESH_DATE_TIME: &str = r#"
    UPDATE storage_coming SET
        coming_id = :coming_id,
        branch_id = :branch_id,
        status = :status,
        date_time = NOW(),
        updated_at = NOW()
    WHERE id = :id
"#;

/// Repository for stock intake database operations.
#[derive(Debug, Clone)]
pub struct StorageComingRepository {
    pool: PgPool,
}

impl StorageComingRepository {
    /// Creates a new StorageComingRepository.
    pub fn new(pool: PgPool) -> Self {
        StorageComingRepository { pool }
    }

    /// Opens a new intake in status `"in process"`, dated now.
    pub async fn create(&self, req: &CreateStorageComing) -> DbResult<String> {
        let id = generate_id();

        debug!(id = %id, coming_id = %req.coming_id, branch_id = %req.branch_id, "Creating storage coming");

        sqlx::query(
            r#"
            INSERT INTO storage_coming (id, coming_id, branch_id, status, date_time, created_at, updated_at)
            VALUES ($1, $2, $3, $4, NOW(), NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(&req.coming_id)
        .bind(to_storage(&req.branch_id))
        .bind(StorageComingStatus::InProcess.as_str())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Gets an intake by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<StorageComing> {
        let row = sqlx::query(
            r#"
            SELECT id, coming_id, branch_id, status, date_time, created_at, updated_at
            FROM storage_coming
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("StorageComing", id))?;

        Ok(storage_coming_from_row(&row)?)
    }

    /// Lists intakes, filtering by `coming_id` when `search` is set.
    pub async fn get_list(&self, req: &ListRequest) -> DbResult<Page<StorageComing>> {
        fetch_page(&self.pool, LIST_SOURCE, req, storage_coming_from_row).await
    }

    /// Rewrites an intake. Moving to `"fineshed"` also stamps `date_time`.
    ///
    /// ## Errors
    /// * `DbError::Validation` - unknown status; nothing is written
    pub async fn update(&self, req: &UpdateStorageComing) -> DbResult<u64> {
        let status = req.parsed_status().map_err(|e| {
            warn!(id = %req.id, status = %req.status, "Rejected storage coming status");
            e
        })?;

        let template = if status.refreshes_date_time() {
            UPDATE_REFRESH_DATE_TIME
        } else {
            UPDATE_KEEP_DATE_TIME
        };

        let params = Params::new()
            .with("id", &req.id)
            .with("coming_id", &req.coming_id)
            .with("branch_id", to_storage(&req.branch_id))
            .with("status", status.as_str());

        let bound = bind_named(template, &params)?;
        let result = bound.query().execute(&self.pool).await?;

        if status.refreshes_date_time() && result.rows_affected() > 0 {
            info!(id = %req.id, coming_id = %req.coming_id, "Storage coming finished");
        } else {
            debug!(id = %req.id, status = %status, "Updated storage coming");
        }

        Ok(result.rows_affected())
    }

    /// Deletes an intake. Its line items are left in place.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting storage coming");

        sqlx::query("DELETE FROM storage_coming WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn storage_coming_from_row(row: &PgRow) -> Result<StorageComing, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status =
        StorageComingStatus::try_from(status).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(StorageComing {
        id: row.try_get("id")?,
        coming_id: row.try_get("coming_id")?,
        branch_id: from_storage(row.try_get("branch_id")?),
        status,
        date_time: row.try_get("date_time")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
