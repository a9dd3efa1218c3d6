//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Update vs Patch
//! ```text
//! update(UpdateProduct)   every mutable column rewritten
//!
//! patch(PatchProduct)     only the supplied columns
//!   { "price": 12900 }  ──►  UPDATE product SET price = :price,
//!                                   updated_at = NOW()
//!                            WHERE id = :id
//! ```
//!
//! Patchable columns are whitelisted; anything else is rejected before SQL is
//! built.

use std::collections::BTreeMap;

use market_core::validation::{validate_patch_fields, ColumnKind, PatchColumn};
use market_core::{
    CreateProduct, ListRequest, Money, Page, PatchProduct, Product, UpdateProduct,
};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};

use super::{fetch_page, generate_id, ListSource};
use crate::error::{DbError, DbResult};
use crate::nullable::{from_storage, to_storage, to_storage_value};
use crate::query::{bind_named, Params, SqlValue};

/// Columns a [`PatchProduct`] may touch, with the JSON shape each accepts.
pub const PATCHABLE_COLUMNS: [PatchColumn; 4] = [
    PatchColumn::new("name", ColumnKind::Text),
    PatchColumn::new("barcode", ColumnKind::Text),
    PatchColumn::new("price", ColumnKind::Integer),
    PatchColumn::new("category_id", ColumnKind::OptionalText),
];

const LIST_SOURCE: ListSource = ListSource {
    table: "product",
    columns: "id, name, barcode, price, category_id, created_at, updated_at",
    search_column: "name",
};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = store.product();
///
/// let id = repo.create(&CreateProduct {
///     name: "Green tea 1l".into(),
///     barcode: "4780000000017".into(),
///     price: Money::from_minor(12_900),
///     category_id: String::new(),
/// }).await?;
///
/// repo.patch(&PatchProduct::new(&id).set("price", 13_500)).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: PgPool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product and returns its generated ID.
    pub async fn create(&self, req: &CreateProduct) -> DbResult<String> {
        let id = generate_id();

        debug!(id = %id, name = %req.name, barcode = %req.barcode, "Creating product");

        sqlx::query(
            r#"
            INSERT INTO product (id, name, barcode, price, category_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            "#,
        )
        .bind(&id)
        .bind(&req.name)
        .bind(&req.barcode)
        .bind(req.price.minor())
        .bind(to_storage(&req.category_id))
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product found
    /// * `Err(DbError::NotFound)` - No product with this ID
    pub async fn get_by_id(&self, id: &str) -> DbResult<Product> {
        let row = sqlx::query(
            r#"
            SELECT id, name, barcode, price, category_id, created_at, updated_at
            FROM product
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok(product_from_row(&row)?)
    }

    /// Lists products, filtering by name when `search` is set.
    pub async fn get_list(&self, req: &ListRequest) -> DbResult<Page<Product>> {
        fetch_page(&self.pool, LIST_SOURCE, req, product_from_row).await
    }

    /// Replaces every mutable field. Returns rows affected.
    pub async fn update(&self, req: &UpdateProduct) -> DbResult<u64> {
        debug!(id = %req.id, "Updating product");

        let params = Params::new()
            .with("id", &req.id)
            .with("name", &req.name)
            .with("barcode", &req.barcode)
            .with("price", req.price)
            .with("category_id", to_storage(&req.category_id));

        let bound = bind_named(
            r#"
            UPDATE product SET
                name = :name,
                barcode = :barcode,
                price = :price,
                category_id = :category_id,
                updated_at = NOW()
            WHERE id = :id
            "#,
            &params,
        )?;

        let result = bound.query().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Updates only the columns named in `req.fields`. Returns rows affected.
    ///
    /// ## Errors
    /// * `DbError::Validation` - no fields, a non-patchable column, or a value
    ///   of the wrong type for its column. Nothing is sent to the database.
    pub async fn patch(&self, req: &PatchProduct) -> DbResult<u64> {
        if let Err(e) = validate_patch_fields(req, &PATCHABLE_COLUMNS) {
            warn!(id = %req.id, error = %e, "Rejected product patch");
            return Err(e.into());
        }

        let params = patch_params(req)?;
        let template = patch_template(&req.fields);
        let bound = bind_named(&template, &params)?;

        debug!(id = %req.id, fields = req.fields.len(), "Patching product");

        let result = bound.query().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Deletes a product. Deleting an unknown ID is not an error.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// `UPDATE product SET a = :a, b = :b, updated_at = NOW() WHERE id = :id`,
/// columns in key order.
fn patch_template(fields: &BTreeMap<String, Value>) -> String {
    let assignments: Vec<String> = fields
        .keys()
        .map(|column| format!("{column} = :{column}"))
        .chain(std::iter::once("updated_at = NOW()".to_string()))
        .collect();

    format!(
        "UPDATE product SET {} WHERE id = :id",
        assignments.join(", ")
    )
}

fn patch_params(req: &PatchProduct) -> DbResult<Params> {
    let mut params = Params::new().with("id", &req.id);

    for (column, value) in &req.fields {
        let value = SqlValue::from_json(column, value.clone())?;
        let value = if column == "category_id" {
            to_storage_value(value)
        } else {
            value
        };
        params.insert(column.as_str(), value);
    }

    Ok(params)
}

fn product_from_row(row: &PgRow) -> Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        barcode: row.try_get("barcode")?,
        price: Money::from_minor(row.try_get("price")?),
        category_id: from_storage(row.try_get("category_id")?),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_template_lists_only_supplied_columns() {
        let patch = PatchProduct::new("p-1").set("price", 13_500).set("name", "Tea");
        assert_eq!(
            patch_template(&patch.fields),
            "UPDATE product SET name = :name, price = :price, updated_at = NOW() WHERE id = :id"
        );
    }

    #[test]
    fn test_patch_binds_in_template_order() {
        let patch = PatchProduct::new("p-1").set("price", 13_500).set("barcode", "478");
        let bound = bind_named(&patch_template(&patch.fields), &patch_params(&patch).unwrap())
            .unwrap();

        assert_eq!(
            bound.sql,
            "UPDATE product SET barcode = $1, price = $2, updated_at = NOW() WHERE id = $3"
        );
        assert_eq!(
            bound.args,
            vec![
                SqlValue::Text("478".to_string()),
                SqlValue::Int(13_500),
                SqlValue::Text("p-1".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_category_patches_to_null() {
        let patch = PatchProduct::new("p-1").set("category_id", "");
        let params = patch_params(&patch).unwrap();
        assert_eq!(params.get("category_id"), Some(&SqlValue::Null));

        let patch = PatchProduct::new("p-1").set("name", "");
        let params = patch_params(&patch).unwrap();
        assert_eq!(params.get("name"), Some(&SqlValue::Text(String::new())));
    }

    #[test]
    fn test_patchable_columns_are_typed() {
        let kind = |name: &str| {
            PATCHABLE_COLUMNS
                .iter()
                .find(|column| column.name == name)
                .map(|column| column.kind)
        };
        assert_eq!(kind("price"), Some(ColumnKind::Integer));
        assert_eq!(kind("name"), Some(ColumnKind::Text));
        assert_eq!(kind("barcode"), Some(ColumnKind::Text));
        assert_eq!(kind("category_id"), Some(ColumnKind::OptionalText));
        assert_eq!(kind("id"), None);
    }

    #[test]
    fn test_oversized_number_is_a_bind_error() {
        let patch = PatchProduct::new("p-1").set("price", json!(u64::MAX));
        assert!(matches!(patch_params(&patch), Err(DbError::Bind(_))));
    }
}
