//! # Repository Module
//!
//! One repository per entity, all following the same CRUD shape.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Shared Repository Shape                              │
//! │                                                                         │
//! │  store.product()                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── create(&self, req)       INSERT ... NOW(), NOW()   → id           │
//! │  ├── get_by_id(&self, id)     SELECT ... WHERE id = $1  → entity       │
//! │  ├── get_list(&self, req)     SELECT COUNT(*) OVER() ...→ Page         │
//! │  ├── update(&self, req)       UPDATE via :name binder   → rows         │
//! │  ├── patch(&self, req)        sparse UPDATE (product)   → rows         │
//! │  └── delete(&self, id)        DELETE ... WHERE id = $1                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PostgreSQL (one statement per call, no transactions)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`BranchRepository`](branch::BranchRepository)
//! - [`CategoryRepository`](category::CategoryRepository)
//! - [`ProductRepository`](product::ProductRepository)
//! - [`StorageComingRepository`](storage_coming::StorageComingRepository)
//! - [`StorageComingProductRepository`](storage_coming_product::StorageComingProductRepository)

pub mod branch;
pub mod category;
pub mod product;
pub mod storage_coming;
pub mod storage_coming_product;

use market_core::{ListRequest, Page};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;

/// Generates a new entity ID (UUID v4, canonical hyphenated form).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Table metadata needed to build a list query.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ListSource {
    pub table: &'static str,
    pub columns: &'static str,
    /// Column matched by the case-insensitive `search` filter.
    pub search_column: &'static str,
}

impl ListSource {
    fn filter(&self, has_search: bool) -> String {
        let mut filter = String::from(" WHERE TRUE");
        if has_search {
            filter.push_str(&format!(" AND {} ILIKE '%' || $1 || '%'", self.search_column));
        }
        filter
    }

    /// Page query: window count, optional search at `$1`, then offset and limit.
    pub fn page_sql(&self, has_search: bool) -> String {
        let (offset, limit) = if has_search { (2, 3) } else { (1, 2) };
        format!(
            "SELECT COUNT(*) OVER() AS total_count, {} FROM {}{} ORDER BY created_at, id OFFSET ${} LIMIT ${}",
            self.columns,
            self.table,
            self.filter(has_search),
            offset,
            limit
        )
    }

    /// Count of all rows matching the same filter.
    pub fn count_sql(&self, has_search: bool) -> String {
        format!("SELECT COUNT(*) FROM {}{}", self.table, self.filter(has_search))
    }
}

/// Runs a paginated, optionally filtered scan.
///
/// ## Count Semantics
/// ```text
/// rows returned?  ── yes ──► count = total_count of the first row
///       │
///       no
///       │
///  offset > 0? ── yes ──► COUNT(*) with the same filter (page past the end)
///       │
///       no ──► count = 0 (nothing matches)
/// ```
pub(crate) async fn fetch_page<T, F>(
    pool: &PgPool,
    source: ListSource,
    req: &ListRequest,
    map_row: F,
) -> DbResult<Page<T>>
where
    F: Fn(&PgRow) -> Result<T, sqlx::Error>,
{
    let offset = req.effective_offset();
    let limit = req.effective_limit();
    let search = req.search_term();

    debug!(table = source.table, offset, limit, search = ?search, "Listing rows");

    let sql = source.page_sql(search.is_some());
    let mut query = sqlx::query(&sql);
    if let Some(term) = search {
        query = query.bind(term);
    }
    let rows = query.bind(offset).bind(limit).fetch_all(pool).await?;

    let count: i64 = match rows.first() {
        Some(row) => row.try_get("total_count")?,
        None if offset > 0 => {
            let count_sql = source.count_sql(search.is_some());
            let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
            if let Some(term) = search {
                count_query = count_query.bind(term);
            }
            count_query.fetch_one(pool).await?
        }
        None => 0,
    };

    let items = rows.iter().map(map_row).collect::<Result<Vec<_>, _>>()?;

    debug!(table = source.table, count, returned = items.len(), "Listed rows");
    Ok(Page { count, items })
}
