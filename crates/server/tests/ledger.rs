//! Integration tests for the inventory and sales ledger.
//!
//! Each test runs against a fresh `SQLite` database with the full migration
//! set applied. Most use an in-memory database capped at one connection
//! (every connection to `sqlite::memory:` is a separate database, so a
//! single shared connection keeps all tasks on the same ledger). Tests that
//! exercise real write contention use a file-backed temporary database with
//! a multi-connection pool instead.

use std::path::PathBuf;

use rust_decimal::Decimal;
use secrecy::SecretString;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tokio::task::JoinSet;

use tally_core::{ProductId, TenantId, Username};
use tally_server::db::{
    MIGRATOR, ProductRepository, PurchaseRepository, SaleRepository, TenantRepository, create_pool,
};
use tally_server::models::{NewProduct, NewPurchase, Product};
use tally_server::services::{InventoryService, LedgerError, ReportsService};

async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

/// A file-backed database with the production pool settings (WAL, multiple
/// connections), for tests where tasks must genuinely contend for the write
/// lock. Returns the path so the caller can clean up.
async fn file_backed_pool(name: &str) -> (SqlitePool, PathBuf) {
    let path = std::env::temp_dir().join(format!("tally-{name}-{}.db", std::process::id()));
    remove_database_files(&path);

    let url = format!("sqlite://{}?mode=rwc", path.display());
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to create file-backed pool");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    (pool, path)
}

fn remove_database_files(path: &PathBuf) {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

async fn create_tenant(pool: &SqlitePool, username: &str) -> TenantId {
    let username = Username::parse(username).expect("valid username");
    let tenant = TenantRepository::new(pool)
        .create(&username, "$argon2id$test-placeholder-hash")
        .await
        .expect("Failed to create tenant");
    tenant.id
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

async fn add_product(
    pool: &SqlitePool,
    owner: TenantId,
    name: &str,
    price: &str,
    stock: i64,
) -> Product {
    InventoryService::new(pool)
        .add_product(
            owner,
            NewProduct {
                name: name.to_owned(),
                unit_price: dec(price),
                initial_stock: stock,
            },
        )
        .await
        .expect("Failed to add product")
}

// ============================================================================
// Product Tests
// ============================================================================

#[tokio::test]
async fn test_add_product_and_list() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;

    let product = add_product(&pool, owner, "Widget", "10.0", 5).await;
    assert_eq!(product.name, "Widget");
    assert_eq!(product.stock, 5);
    assert_eq!(product.unit_price, dec("10.0"));

    let products = ProductRepository::new(&pool)
        .list_for_owner(owner)
        .await
        .expect("list");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, product.id);
}

#[tokio::test]
async fn test_add_product_rejects_bad_input() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;
    let service = InventoryService::new(&pool);

    let err = service
        .add_product(
            owner,
            NewProduct {
                name: "   ".to_owned(),
                unit_price: dec("1.0"),
                initial_stock: 0,
            },
        )
        .await
        .expect_err("blank name must be rejected");
    assert!(matches!(err, LedgerError::Validation(_)));

    let err = service
        .add_product(
            owner,
            NewProduct {
                name: "Widget".to_owned(),
                unit_price: dec("-1.0"),
                initial_stock: 0,
            },
        )
        .await
        .expect_err("negative price must be rejected");
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn test_duplicate_product_names_create_separate_rows() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;

    let first = add_product(&pool, owner, "Widget", "10.0", 5).await;
    let second = add_product(&pool, owner, "Widget", "12.0", 3).await;
    assert_ne!(first.id, second.id);

    let products = ProductRepository::new(&pool)
        .list_for_owner(owner)
        .await
        .expect("list");
    assert_eq!(products.len(), 2);
}

#[tokio::test]
async fn test_increase_stock() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;
    let product = add_product(&pool, owner, "Widget", "10.0", 5).await;
    let service = InventoryService::new(&pool);

    service
        .increase_stock(owner, product.id, 7)
        .await
        .expect("increase");

    let reloaded = ProductRepository::new(&pool)
        .get(owner, product.id)
        .await
        .expect("get")
        .expect("product exists");
    assert_eq!(reloaded.stock, 12);
}

#[tokio::test]
async fn test_increase_stock_zero_is_a_noop() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;
    let product = add_product(&pool, owner, "Widget", "10.0", 5).await;
    let service = InventoryService::new(&pool);

    // Zero succeeds and changes nothing
    service
        .increase_stock(owner, product.id, 0)
        .await
        .expect("zero quantity is valid");

    let reloaded = ProductRepository::new(&pool)
        .get(owner, product.id)
        .await
        .expect("get")
        .expect("product exists");
    assert_eq!(reloaded.stock, 5);

    // Negative is rejected
    let err = service
        .increase_stock(owner, product.id, -1)
        .await
        .expect_err("negative quantity must be rejected");
    assert!(matches!(err, LedgerError::Validation(_)));

    // Unknown product is NotFound, even with zero quantity
    let err = service
        .increase_stock(owner, ProductId::new(9999), 0)
        .await
        .expect_err("unknown product");
    assert!(matches!(err, LedgerError::NotFound));
}

// ============================================================================
// Sale Tests
// ============================================================================

#[tokio::test]
async fn test_sale_decrements_stock_and_freezes_price() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;
    let product = add_product(&pool, owner, "Widget", "10.0", 5).await;
    let service = InventoryService::new(&pool);

    let sale = service
        .record_sale(owner, product.id, 3)
        .await
        .expect("sale succeeds");
    assert_eq!(sale.quantity, 3);
    assert_eq!(sale.unit_price_at_sale, dec("10.0"));

    let reloaded = ProductRepository::new(&pool)
        .get(owner, product.id)
        .await
        .expect("get")
        .expect("product exists");
    assert_eq!(reloaded.stock, 2);

    // A second sale exceeding remaining stock fails and leaves the ledger alone
    let err = service
        .record_sale(owner, product.id, 5)
        .await
        .expect_err("oversell must fail");
    assert!(matches!(
        err,
        LedgerError::InsufficientStock {
            requested: 5,
            available: 2
        }
    ));

    let reloaded = ProductRepository::new(&pool)
        .get(owner, product.id)
        .await
        .expect("get")
        .expect("product exists");
    assert_eq!(reloaded.stock, 2);

    let sales = SaleRepository::new(&pool)
        .list_for_owner(owner)
        .await
        .expect("list sales");
    assert_eq!(sales.len(), 1);
}

#[tokio::test]
async fn test_sale_rejects_non_positive_quantity() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;
    let product = add_product(&pool, owner, "Widget", "10.0", 5).await;
    let service = InventoryService::new(&pool);

    let err = service
        .record_sale(owner, product.id, 0)
        .await
        .expect_err("zero quantity sale");
    assert!(matches!(err, LedgerError::Validation(_)));

    let err = service
        .record_sale(owner, product.id, -2)
        .await
        .expect_err("negative quantity sale");
    assert!(matches!(err, LedgerError::Validation(_)));
}

#[tokio::test]
async fn test_concurrent_sales_never_oversell() {
    // Multi-connection, file-backed pool: the tasks really race on the
    // write lock rather than serializing on a single shared connection.
    let (pool, path) = file_backed_pool("oversell").await;
    let owner = create_tenant(&pool, "alice").await;
    let product = add_product(&pool, owner, "Widget", "10.0", 10).await;

    // 20 concurrent attempts to sell 2 units each; only 5 can succeed and
    // every loser must see InsufficientStock, never a database error
    let mut tasks = JoinSet::new();
    for _ in 0..20 {
        let pool = pool.clone();
        let product_id = product.id;
        tasks.spawn(async move {
            InventoryService::new(&pool)
                .record_sale(owner, product_id, 2)
                .await
        });
    }

    let mut successes = 0;
    let mut stock_failures = 0;
    while let Some(result) = tasks.join_next().await {
        match result.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(LedgerError::InsufficientStock { .. }) => stock_failures += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(successes, 5);
    assert_eq!(stock_failures, 15);

    let reloaded = ProductRepository::new(&pool)
        .get(owner, product.id)
        .await
        .expect("get")
        .expect("product exists");
    assert_eq!(reloaded.stock, 0);

    let sales = SaleRepository::new(&pool)
        .list_for_owner(owner)
        .await
        .expect("list sales");
    assert_eq!(sales.len(), 5);

    pool.close().await;
    remove_database_files(&path);
}

// ============================================================================
// Purchase Tests
// ============================================================================

#[tokio::test]
async fn test_repeat_purchase_copies_most_recent_cost() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;
    let service = InventoryService::new(&pool);

    let original = service
        .record_purchase(
            owner,
            NewPurchase {
                name: "Gadget".to_owned(),
                unit_cost: dec("4.0"),
                quantity: 10,
            },
        )
        .await
        .expect("purchase");

    let repeated = service
        .repeat_purchase(owner, "Gadget", 5)
        .await
        .expect("repeat");
    assert_eq!(repeated.name, "Gadget");
    assert_eq!(repeated.unit_cost, dec("4.0"));
    assert_eq!(repeated.quantity, 5);
    assert_ne!(repeated.id, original.id);

    // The original row is untouched
    let purchases = PurchaseRepository::new(&pool)
        .list_for_owner(owner)
        .await
        .expect("list");
    assert_eq!(purchases.len(), 2);
    assert_eq!(purchases[0].id, original.id);
    assert_eq!(purchases[0].quantity, 10);
    assert_eq!(purchases[0].unit_cost, dec("4.0"));
}

#[tokio::test]
async fn test_repeat_purchase_uses_latest_when_names_collide() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;
    let service = InventoryService::new(&pool);

    for cost in ["4.0", "6.5"] {
        service
            .record_purchase(
                owner,
                NewPurchase {
                    name: "Gadget".to_owned(),
                    unit_cost: dec(cost),
                    quantity: 1,
                },
            )
            .await
            .expect("purchase");
    }

    let repeated = service
        .repeat_purchase(owner, "Gadget", 3)
        .await
        .expect("repeat");
    assert_eq!(repeated.unit_cost, dec("6.5"));
}

#[tokio::test]
async fn test_repeat_purchase_unknown_name() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;

    let err = InventoryService::new(&pool)
        .repeat_purchase(owner, "Nonexistent", 1)
        .await
        .expect_err("unknown name");
    assert!(matches!(err, LedgerError::NotFound));
}

// ============================================================================
// Tenant Isolation Tests
// ============================================================================

#[tokio::test]
async fn test_tenants_cannot_see_each_other() {
    let pool = test_pool().await;
    let alice = create_tenant(&pool, "alice").await;
    let bob = create_tenant(&pool, "bob").await;

    add_product(&pool, alice, "Widget", "10.0", 5).await;
    InventoryService::new(&pool)
        .record_purchase(
            alice,
            NewPurchase {
                name: "Gadget".to_owned(),
                unit_cost: dec("4.0"),
                quantity: 10,
            },
        )
        .await
        .expect("purchase");

    let products = ProductRepository::new(&pool)
        .list_for_owner(bob)
        .await
        .expect("list");
    assert!(products.is_empty());

    let purchases = PurchaseRepository::new(&pool)
        .list_for_owner(bob)
        .await
        .expect("list");
    assert!(purchases.is_empty());
}

#[tokio::test]
async fn test_foreign_product_id_probe_is_not_found() {
    let pool = test_pool().await;
    let alice = create_tenant(&pool, "alice").await;
    let bob = create_tenant(&pool, "bob").await;

    let product = add_product(&pool, alice, "Widget", "10.0", 5).await;
    let service = InventoryService::new(&pool);

    // Bob probing Alice's real product id gets the same answer as a bogus id
    let err = service
        .increase_stock(bob, product.id, 1)
        .await
        .expect_err("foreign id probe");
    assert!(matches!(err, LedgerError::NotFound));

    let err = service
        .record_sale(bob, product.id, 1)
        .await
        .expect_err("foreign id sale");
    assert!(matches!(err, LedgerError::NotFound));

    // Alice's stock is untouched by the probes
    let reloaded = ProductRepository::new(&pool)
        .get(alice, product.id)
        .await
        .expect("get")
        .expect("product exists");
    assert_eq!(reloaded.stock, 5);

    let repeat = service
        .repeat_purchase(bob, "Widget", 1)
        .await
        .expect_err("foreign name repeat");
    assert!(matches!(repeat, LedgerError::NotFound));
}

// ============================================================================
// Report Tests
// ============================================================================

#[tokio::test]
async fn test_sales_report_totals() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;
    let product = add_product(&pool, owner, "Widget", "10.0", 20).await;
    let service = InventoryService::new(&pool);

    service.record_sale(owner, product.id, 3).await.expect("sale");
    service.record_sale(owner, product.id, 2).await.expect("sale");

    let report = ReportsService::new(&pool)
        .sales_report(owner, None, None)
        .await
        .expect("report");
    assert_eq!(report.sales.len(), 2);
    assert_eq!(report.total, dec("50.0"));
    assert_eq!(report.sales[0].product_name, "Widget");
}

#[tokio::test]
async fn test_purchases_report_totals_and_filters() {
    let pool = test_pool().await;
    let owner = create_tenant(&pool, "alice").await;
    let service = InventoryService::new(&pool);

    service
        .record_purchase(
            owner,
            NewPurchase {
                name: "Gadget".to_owned(),
                unit_cost: dec("4.0"),
                quantity: 10,
            },
        )
        .await
        .expect("purchase");

    let reports = ReportsService::new(&pool);

    // Unfiltered: one row, total 40
    let report = reports
        .purchases_report(owner, None, None)
        .await
        .expect("report");
    assert_eq!(report.purchases.len(), 1);
    assert_eq!(report.total, dec("40.0"));

    // Rows were created just now, so the current year matches
    let this_year = chrono::Datelike::year(&chrono::Utc::now());
    let report = reports
        .purchases_report(owner, Some(this_year), None)
        .await
        .expect("report");
    assert_eq!(report.purchases.len(), 1);

    // A year with no activity yields an empty report with total zero
    let report = reports
        .purchases_report(owner, Some(1999), None)
        .await
        .expect("report");
    assert!(report.purchases.is_empty());
    assert_eq!(report.total, Decimal::ZERO);
}

#[tokio::test]
async fn test_reports_are_tenant_scoped() {
    let pool = test_pool().await;
    let alice = create_tenant(&pool, "alice").await;
    let bob = create_tenant(&pool, "bob").await;
    let product = add_product(&pool, alice, "Widget", "10.0", 5).await;

    InventoryService::new(&pool)
        .record_sale(alice, product.id, 1)
        .await
        .expect("sale");

    let report = ReportsService::new(&pool)
        .sales_report(bob, None, None)
        .await
        .expect("report");
    assert!(report.sales.is_empty());
    assert_eq!(report.total, Decimal::ZERO);
}
