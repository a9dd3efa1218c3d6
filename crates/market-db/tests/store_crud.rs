//! Store integration tests against a live PostgreSQL server.
//!
//! Run with connection settings in the environment:
//! `POSTGRES_HOST=localhost POSTGRES_DATABASE=market_test cargo test -p market-db -- --ignored`
//!
//! Tests share one database; each one scopes its rows with a unique token in
//! the searchable column so they can run in parallel.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use market_core::{
    CreateBranch, CreateCategory, CreateProduct, CreateStorageComing,
    CreateStorageComingProduct, ListRequest, Money, PatchProduct, StorageComingStatus,
    UpdateBranch, UpdateCategory, UpdateProduct, UpdateStorageComing,
    UpdateStorageComingProduct,
};
use market_db::{DbError, Store, StoreConfig};
use serde_json::json;
use uuid::Uuid;

async fn store() -> Store {
    let config = StoreConfig::from_env().expect("valid POSTGRES_* settings");
    Store::connect(config).await.expect("database reachable")
}

fn token() -> String {
    format!("t{}", Uuid::new_v4().simple())
}

async fn db_now(store: &Store) -> DateTime<Utc> {
    sqlx::query_scalar("SELECT NOW()")
        .fetch_one(store.pool())
        .await
        .unwrap()
}

// =============================================================================
// Branch
// =============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn branch_create_get_update_delete() {
    let store = store().await;
    let name = format!("Chilonzor {}", token());

    let id = store
        .branch()
        .create(&CreateBranch {
            name: name.clone(),
            address: "Bunyodkor 12".to_string(),
            phone_number: "+998901234567".to_string(),
        })
        .await
        .unwrap();

    let branch = store.branch().get_by_id(&id).await.unwrap();
    assert_eq!(branch.id, id);
    assert_eq!(branch.name, name);
    assert_eq!(branch.address, "Bunyodkor 12");
    assert_eq!(branch.phone_number, "+998901234567");
    assert_eq!(branch.created_at, branch.updated_at);

    let rows = store
        .branch()
        .update(&UpdateBranch {
            id: id.clone(),
            name: name.clone(),
            address: "Bunyodkor 14".to_string(),
            phone_number: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let updated = store.branch().get_by_id(&id).await.unwrap();
    assert_eq!(updated.address, "Bunyodkor 14");
    assert_eq!(updated.phone_number, "");
    assert_eq!(updated.created_at, branch.created_at);
    assert!(updated.updated_at >= branch.updated_at);

    store.branch().delete(&id).await.unwrap();
    assert!(store.branch().get_by_id(&id).await.unwrap_err().is_not_found());

    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn unknown_ids_are_not_errors_for_update_and_delete() {
    let store = store().await;
    let missing = Uuid::new_v4().to_string();

    let rows = store
        .branch()
        .update(&UpdateBranch {
            id: missing.clone(),
            name: "nobody".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(rows, 0);

    store.branch().delete(&missing).await.unwrap();
    store.product().delete(&missing).await.unwrap();

    let err = store.category().get_by_id(&missing).await.unwrap_err();
    match err {
        DbError::NotFound { entity, id } => {
            assert_eq!(entity, "Category");
            assert_eq!(id, missing);
        }
        other => panic!("expected NotFound, got {other:?}"),
    }

    store.close().await;
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn pagination_counts_every_match() {
    let store = store().await;
    let tag = token();

    for i in 0..5 {
        store
            .branch()
            .create(&CreateBranch {
                name: format!("{tag} branch {i}"),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    let first = store
        .branch()
        .get_list(&ListRequest::page(0, 2).with_search(&tag))
        .await
        .unwrap();
    assert_eq!(first.count, 5);
    assert_eq!(first.items.len(), 2);

    let last = store
        .branch()
        .get_list(&ListRequest::page(4, 2).with_search(&tag))
        .await
        .unwrap();
    assert_eq!(last.count, 5);
    assert_eq!(last.items.len(), 1);

    let past_end = store
        .branch()
        .get_list(&ListRequest::page(10, 2).with_search(&tag))
        .await
        .unwrap();
    assert_eq!(past_end.count, 5);
    assert!(past_end.items.is_empty());

    // Non-positive limit falls back to the default page size
    let defaulted = store
        .branch()
        .get_list(&ListRequest::page(-1, 0).with_search(&tag))
        .await
        .unwrap();
    assert_eq!(defaulted.items.len(), 5);

    // Pages do not overlap
    let ids: HashSet<String> = first
        .items
        .iter()
        .chain(last.items.iter())
        .map(|b| b.id.clone())
        .collect();
    assert_eq!(ids.len(), 3);

    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn search_is_case_insensitive_and_literal() {
    let store = store().await;
    let tag = token();

    store
        .category()
        .create(&CreateCategory {
            name: format!("Dairy {tag}"),
            parent_id: String::new(),
        })
        .await
        .unwrap();

    let page = store
        .category()
        .get_list(&ListRequest::page(0, 10).with_search(tag.to_uppercase()))
        .await
        .unwrap();
    assert_eq!(page.count, 1);

    let injected = store
        .category()
        .get_list(&ListRequest::page(0, 10).with_search(format!("{tag}' OR '1'='1")))
        .await
        .unwrap();
    assert_eq!(injected.count, 0);

    store.close().await;
}

// =============================================================================
// Category
// =============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn category_parent_round_trips_through_null() {
    let store = store().await;
    let tag = token();

    let root = store
        .category()
        .create(&CreateCategory {
            name: format!("Beverages {tag}"),
            parent_id: String::new(),
        })
        .await
        .unwrap();
    let child = store
        .category()
        .create(&CreateCategory {
            name: format!("Tea {tag}"),
            parent_id: root.clone(),
        })
        .await
        .unwrap();

    assert_eq!(store.category().get_by_id(&root).await.unwrap().parent_id, "");
    assert_eq!(store.category().get_by_id(&child).await.unwrap().parent_id, root);

    let stored: Option<String> = sqlx::query_scalar("SELECT parent_id FROM category WHERE id = $1")
        .bind(&root)
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(stored, None);

    // Detach the child again
    store
        .category()
        .update(&UpdateCategory {
            id: child.clone(),
            name: format!("Tea {tag}"),
            parent_id: String::new(),
        })
        .await
        .unwrap();
    assert_eq!(store.category().get_by_id(&child).await.unwrap().parent_id, "");

    // Deleting the parent leaves the (former) child alone
    store.category().delete(&root).await.unwrap();
    assert!(store.category().get_by_id(&child).await.is_ok());

    store.close().await;
}

// =============================================================================
// Product
// =============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn product_update_and_patch() {
    let store = store().await;
    let tag = token();

    let id = store
        .product()
        .create(&CreateProduct {
            name: format!("Green tea {tag}"),
            barcode: "4780000000017".to_string(),
            price: Money::from_minor(12_900),
            category_id: String::new(),
        })
        .await
        .unwrap();

    let product = store.product().get_by_id(&id).await.unwrap();
    assert_eq!(product.price, Money::from_minor(12_900));
    assert_eq!(product.category_id, "");

    let rows = store
        .product()
        .update(&UpdateProduct {
            id: id.clone(),
            name: product.name.clone(),
            barcode: product.barcode.clone(),
            price: Money::from_minor(13_500),
            category_id: "c-tea".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert_eq!(store.product().get_by_id(&id).await.unwrap().category_id, "c-tea");

    let rows = store
        .product()
        .patch(&PatchProduct::new(&id).set("price", 9_900).set("category_id", ""))
        .await
        .unwrap();
    assert_eq!(rows, 1);

    let patched = store.product().get_by_id(&id).await.unwrap();
    assert_eq!(patched.price, Money::from_minor(9_900));
    assert_eq!(patched.category_id, "");
    assert_eq!(patched.barcode, "4780000000017");
    assert_eq!(patched.name, product.name);

    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn rejected_patch_leaves_row_untouched() {
    let store = store().await;

    let id = store
        .product()
        .create(&CreateProduct {
            name: format!("Kefir {}", token()),
            barcode: "4780000000024".to_string(),
            price: Money::from_minor(8_000),
            category_id: String::new(),
        })
        .await
        .unwrap();
    let before = store.product().get_by_id(&id).await.unwrap();

    let err = store.product().patch(&PatchProduct::new(&id)).await.unwrap_err();
    assert!(err.is_validation());

    let err = store
        .product()
        .patch(&PatchProduct::new(&id).set("price", 1).set("created_at", "2000-01-01"))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(store.product().get_by_id(&id).await.unwrap(), before);

    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn mistyped_patch_values_are_rejected() {
    let store = store().await;

    let id = store
        .product()
        .create(&CreateProduct {
            name: format!("Suzma {}", token()),
            barcode: "4780000000031".to_string(),
            price: Money::from_minor(12_000),
            category_id: String::new(),
        })
        .await
        .unwrap();
    let before = store.product().get_by_id(&id).await.unwrap();

    for (field, value) in [
        ("price", json!(12.6)),
        ("price", json!(true)),
        ("price", json!(null)),
        ("category_id", json!(42)),
    ] {
        let err = store
            .product()
            .patch(&PatchProduct::new(&id).set(field, value.clone()))
            .await
            .unwrap_err();
        assert!(err.is_validation(), "{field} = {value}: {err:?}");
    }

    assert_eq!(store.product().get_by_id(&id).await.unwrap(), before);

    store.close().await;
}

// =============================================================================
// Storage Coming
// =============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn storage_coming_status_controls_date_time() {
    let store = store().await;
    let coming_id = format!("WB-{}", token());

    let id = store
        .storage_coming()
        .create(&CreateStorageComing {
            coming_id: coming_id.clone(),
            branch_id: String::new(),
        })
        .await
        .unwrap();

    let created = store.storage_coming().get_by_id(&id).await.unwrap();
    assert_eq!(created.status, StorageComingStatus::InProcess);
    assert_eq!(created.branch_id, "");

    tokio::time::sleep(Duration::from_millis(20)).await;

    let mut req = UpdateStorageComing {
        id: id.clone(),
        coming_id: coming_id.clone(),
        branch_id: "b-1".to_string(),
        status: "in process".to_string(),
    };
    assert_eq!(store.storage_coming().update(&req).await.unwrap(), 1);

    let in_process = store.storage_coming().get_by_id(&id).await.unwrap();
    assert_eq!(in_process.date_time, created.date_time);
    assert_eq!(in_process.branch_id, "b-1");

    let before_finish = db_now(&store).await;
    req.status = "fineshed".to_string();
    assert_eq!(store.storage_coming().update(&req).await.unwrap(), 1);

    let finished = store.storage_coming().get_by_id(&id).await.unwrap();
    assert_eq!(finished.status, StorageComingStatus::Finished);
    assert!(finished.date_time >= before_finish);
    assert!(finished.date_time > created.date_time);

    // An unknown status writes nothing
    req.status = "done".to_string();
    req.branch_id = "b-2".to_string();
    let err = store.storage_coming().update(&req).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(store.storage_coming().get_by_id(&id).await.unwrap(), finished);

    let page = store
        .storage_coming()
        .get_list(&ListRequest::page(0, 10).with_search(&coming_id))
        .await
        .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].id, id);

    store.close().await;
}

// =============================================================================
// Storage Coming Product
// =============================================================================

#[tokio::test]
#[ignore = "requires database"]
async fn line_items_compute_their_total() {
    let store = store().await;
    let tag = token();

    let intake = store
        .storage_coming()
        .create(&CreateStorageComing {
            coming_id: format!("WB-{tag}"),
            branch_id: String::new(),
        })
        .await
        .unwrap();

    let id = store
        .storage_coming_product()
        .create(&CreateStorageComingProduct {
            name: format!("Rice 5kg {tag}"),
            quantity: 7,
            price: Money::from_minor(61_000),
            category_id: String::new(),
            storage_coming_id: intake.clone(),
        })
        .await
        .unwrap();

    let line = store.storage_coming_product().get_by_id(&id).await.unwrap();
    assert_eq!(line.total_price, Money::from_minor(427_000));
    assert_eq!(line.storage_coming_id, intake);
    assert_eq!(line.category_id, "");

    store
        .storage_coming_product()
        .update(&UpdateStorageComingProduct {
            id: id.clone(),
            name: line.name.clone(),
            quantity: 3,
            price: Money::from_minor(60_000),
            category_id: String::new(),
            storage_coming_id: intake.clone(),
        })
        .await
        .unwrap();
    let line = store.storage_coming_product().get_by_id(&id).await.unwrap();
    assert_eq!(line.total_price, Money::from_minor(180_000));

    let overflow = store
        .storage_coming_product()
        .update(&UpdateStorageComingProduct {
            id: id.clone(),
            name: line.name.clone(),
            quantity: i64::MAX,
            price: Money::from_minor(2),
            category_id: String::new(),
            storage_coming_id: intake.clone(),
        })
        .await
        .unwrap_err();
    assert!(overflow.is_validation());

    // Deleting the intake does not cascade
    store.storage_coming().delete(&intake).await.unwrap();
    assert!(store.storage_coming_product().get_by_id(&id).await.is_ok());

    let removed = store
        .storage_coming_product()
        .delete_by_storage_coming(&intake)
        .await
        .unwrap();
    assert_eq!(removed, 1);
    assert!(store
        .storage_coming_product()
        .get_by_id(&id)
        .await
        .unwrap_err()
        .is_not_found());

    store.close().await;
}

// =============================================================================
// Concurrency & Cancellation
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires database"]
async fn concurrent_creates_yield_distinct_ids() {
    let store = Arc::new(store().await);
    let tag = token();

    let mut handles = Vec::new();
    for i in 0..10 {
        let branch_store = Arc::clone(&store);
        let branch_tag = tag.clone();
        handles.push(tokio::spawn(async move {
            branch_store
                .branch()
                .create(&CreateBranch {
                    name: format!("{branch_tag} {i}"),
                    ..Default::default()
                })
                .await
        }));

        let product_store = Arc::clone(&store);
        let product_tag = tag.clone();
        handles.push(tokio::spawn(async move {
            product_store
                .product()
                .create(&CreateProduct {
                    name: format!("{product_tag} {i}"),
                    ..Default::default()
                })
                .await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().unwrap());
    }
    assert_eq!(ids.len(), 20);

    store.close().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn dropped_operation_leaves_store_usable() {
    let store = store().await;

    let _ = tokio::time::timeout(
        Duration::from_micros(1),
        store.branch().get_list(&ListRequest::page(0, 100)),
    )
    .await;

    assert!(store.health_check().await);
    assert!(store.branch().get_list(&ListRequest::default()).await.is_ok());

    store.close().await;
    let err = store.branch().get_list(&ListRequest::default()).await.unwrap_err();
    assert!(matches!(err, DbError::ConnectionFailed(_)));
}
