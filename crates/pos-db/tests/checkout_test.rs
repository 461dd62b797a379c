//! Checkout engine integration tests against an in-memory local
//! database: the full validate → price → persist path.

use std::sync::Arc;

use pos_core::{CheckoutError, RequestedItem, SaleStatus};
use pos_db::checkout::{CheckoutEngine, CheckoutFailure, CreateSaleRequest};
use pos_db::repository::{SaleFilter, SaleRepository, SettingsRepository};
use pos_db::{schema, Gateway, LocalConfig, LocalGateway, Statement};

async fn setup() -> Arc<dyn Gateway> {
    let gateway: Arc<dyn Gateway> = Arc::new(
        LocalGateway::connect(LocalConfig::in_memory())
            .await
            .expect("in-memory database"),
    );
    schema::initialize(gateway.as_ref()).await.expect("schema");

    gateway
        .execute(
            Statement::new(
                "INSERT INTO users (username, password, role, full_name, created_at, updated_at) \
                 VALUES ('maria', 'not-a-real-hash', 'cashier', 'Maria Santos', \
                 '2026-01-01 00:00:00', '2026-01-01 00:00:00')",
            ),
        )
        .await
        .expect("seed cashier");

    // Widget: 10.00, stock 10. Gadget: 5.50, stock 2.
    for (name, barcode, price, stock) in
        [("Widget", "1000000000001", 1000_i64, 10_i64), ("Gadget", "1000000000002", 550, 2)]
    {
        gateway
            .execute(
                Statement::new(
                    "INSERT INTO products (name, barcode, price_cents, stock, min_stock, \
                     created_at, updated_at) VALUES (?, ?, ?, ?, 5, \
                     '2026-01-01 00:00:00', '2026-01-01 00:00:00')",
                )
                .bind(name)
                .bind(barcode)
                .bind(price)
                .bind(stock),
            )
            .await
            .expect("seed product");
    }

    gateway
}

fn cash_request(items: Vec<RequestedItem>, tendered: Option<i64>) -> CreateSaleRequest {
    CreateSaleRequest {
        cashier_id: 1,
        items,
        payment_method: "cash".to_string(),
        payment_received_cents: tendered,
        discount_cents: 0,
        customer_id: None,
        amount_paid_cents: None,
    }
}

async fn stock_of(gateway: &dyn Gateway, product_id: i64) -> i64 {
    let rows = gateway
        .query(Statement::new("SELECT stock FROM products WHERE id = ?").bind(product_id))
        .await
        .unwrap();
    rows[0].integer("stock").unwrap()
}

#[tokio::test]
async fn completed_cash_sale_persists_everything_atomically() {
    let gateway = setup().await;
    let engine = CheckoutEngine::new(gateway.clone());

    // 2 × 10.00 = 20.00, VAT 12% = 2.40, total 22.40, exact tender.
    let outcome = engine
        .create_sale(cash_request(
            vec![RequestedItem { product_id: 1, quantity: 2 }],
            Some(2240),
        ))
        .await
        .expect("checkout");

    assert_eq!(outcome.sale.total_cents, 2240);
    assert_eq!(outcome.sale.vat_cents, 240);
    assert_eq!(outcome.sale.change_cents, 0);
    assert_eq!(outcome.sale.status, SaleStatus::Completed);
    assert_eq!(outcome.sale.cashier_name.as_deref(), Some("Maria Santos"));
    assert_eq!(outcome.receipt_data.subtotal_cents, 2000);

    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.items[0].unit_price_cents, 1000);
    assert_eq!(outcome.items[0].total_price_cents, 2000);
    assert_eq!(outcome.items[0].product_name.as_deref(), Some("Widget"));

    // Stock decremented, initial payment row written.
    assert_eq!(stock_of(gateway.as_ref(), 1).await, 8);
    let payments = gateway
        .query(Statement::new(
            "SELECT amount_cents, notes FROM payments WHERE sale_id = 1",
        ))
        .await
        .unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].integer("amount_cents").unwrap(), 2240);
    assert_eq!(payments[0].opt_text("notes").unwrap().as_deref(), Some("Initial payment"));
}

#[tokio::test]
async fn overpayment_returns_change() {
    let gateway = setup().await;
    let engine = CheckoutEngine::new(gateway);

    let outcome = engine
        .create_sale(cash_request(
            vec![RequestedItem { product_id: 1, quantity: 2 }],
            Some(2500),
        ))
        .await
        .expect("checkout");

    assert_eq!(outcome.sale.change_cents, 260);
    assert_eq!(outcome.receipt_data.change_cents, 260);
}

#[tokio::test]
async fn partial_payment_goes_pending_with_derived_balance() {
    let gateway = setup().await;
    let engine = CheckoutEngine::new(gateway);

    let mut request = cash_request(vec![RequestedItem { product_id: 1, quantity: 2 }], None);
    request.amount_paid_cents = Some(1000);

    let outcome = engine.create_sale(request).await.expect("checkout");

    assert_eq!(outcome.sale.status, SaleStatus::Pending);
    assert_eq!(outcome.sale.amount_paid_cents, 1000);
    assert_eq!(outcome.sale.change_cents, 0);
    // Balance due is derived, never stored.
    assert_eq!(outcome.sale.balance_due().cents(), 1240);
}

#[tokio::test]
async fn insufficient_stock_leaves_no_trace() {
    let gateway = setup().await;
    let engine = CheckoutEngine::new(gateway.clone());

    // Gadget has stock 2.
    let err = engine
        .create_sale(cash_request(
            vec![RequestedItem { product_id: 2, quantity: 3 }],
            None,
        ))
        .await
        .unwrap_err();

    match err {
        CheckoutFailure::Domain(CheckoutError::InsufficientStock {
            name,
            available,
            requested,
        }) => {
            assert_eq!(name, "Gadget");
            assert_eq!(available, 2);
            assert_eq!(requested, 3);
        }
        other => panic!("unexpected error: {other}"),
    }

    let sales = gateway
        .query(Statement::new("SELECT COUNT(*) AS n FROM sales"))
        .await
        .unwrap();
    assert_eq!(sales[0].integer("n").unwrap(), 0);
    assert_eq!(stock_of(gateway.as_ref(), 2).await, 2);
}

#[tokio::test]
async fn one_bad_line_fails_the_whole_cart() {
    let gateway = setup().await;
    let engine = CheckoutEngine::new(gateway.clone());

    // Widget line is fine; Gadget line exceeds stock. Nothing commits.
    let err = engine
        .create_sale(cash_request(
            vec![
                RequestedItem { product_id: 1, quantity: 2 },
                RequestedItem { product_id: 2, quantity: 5 },
            ],
            None,
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CheckoutFailure::Domain(CheckoutError::InsufficientStock { .. })
    ));

    assert_eq!(stock_of(gateway.as_ref(), 1).await, 10);
    assert_eq!(stock_of(gateway.as_ref(), 2).await, 2);
    let items = gateway
        .query(Statement::new("SELECT COUNT(*) AS n FROM sale_items"))
        .await
        .unwrap();
    assert_eq!(items[0].integer("n").unwrap(), 0);
}

#[tokio::test]
async fn conditional_decrement_blocks_oversell() {
    let gateway = setup().await;

    // The authoritative guard: the WHERE clause refuses the decrement
    // when stock is short, regardless of what was read earlier.
    let result = gateway
        .execute(
            Statement::new(
                "UPDATE products SET stock = stock - ?, updated_at = ? \
                 WHERE id = ? AND stock >= ?",
            )
            .bind(3_i64)
            .bind("2026-08-23 00:00:00")
            .bind(2_i64)
            .bind(3_i64),
        )
        .await
        .unwrap();

    assert_eq!(result.rows_affected, 0);
    assert_eq!(stock_of(gateway.as_ref(), 2).await, 2);
}

#[tokio::test]
async fn concurrent_sales_of_last_unit_cannot_both_commit() {
    let gateway = setup().await;

    gateway
        .execute(Statement::new("UPDATE products SET stock = 1 WHERE id = 2"))
        .await
        .unwrap();

    let engine_a = CheckoutEngine::new(gateway.clone());
    let engine_b = CheckoutEngine::new(gateway.clone());
    let request = || cash_request(vec![RequestedItem { product_id: 2, quantity: 1 }], None);

    let (a, b) = tokio::join!(engine_a.create_sale(request()), engine_b.create_sale(request()));

    assert_eq!(
        a.is_ok() as u8 + b.is_ok() as u8,
        1,
        "exactly one sale must win the last unit"
    );
    assert_eq!(stock_of(gateway.as_ref(), 2).await, 0);

    let sales = gateway
        .query(Statement::new("SELECT COUNT(*) AS n FROM sales"))
        .await
        .unwrap();
    assert_eq!(sales[0].integer("n").unwrap(), 1);
}

#[tokio::test]
async fn price_snapshot_survives_catalog_change() {
    let gateway = setup().await;
    let engine = CheckoutEngine::new(gateway.clone());

    let outcome = engine
        .create_sale(cash_request(
            vec![RequestedItem { product_id: 1, quantity: 1 }],
            None,
        ))
        .await
        .expect("checkout");

    gateway
        .execute(Statement::new("UPDATE products SET price_cents = 9999 WHERE id = 1"))
        .await
        .unwrap();

    let repo = SaleRepository::new(gateway.clone());
    let items = repo.items_for(outcome.sale.id).await.unwrap();
    assert_eq!(items[0].unit_price_cents, 1000);
}

#[tokio::test]
async fn legacy_tax_rate_key_is_honored() {
    let gateway = setup().await;

    // Simulate a database seeded by an earlier release.
    gateway
        .execute(Statement::new("DELETE FROM settings WHERE key = 'vat_rate'"))
        .await
        .unwrap();
    let settings = SettingsRepository::new(gateway.clone());
    settings.upsert("tax_rate", "10.0", None).await.unwrap();

    let engine = CheckoutEngine::new(gateway);
    let outcome = engine
        .create_sale(cash_request(
            vec![RequestedItem { product_id: 1, quantity: 1 }],
            None,
        ))
        .await
        .expect("checkout");

    // 10.00 at 10% VAT.
    assert_eq!(outcome.sale.vat_cents, 100);
    assert_eq!(outcome.sale.total_cents, 1100);
}

#[tokio::test]
async fn missing_vat_keys_fall_back_to_zero() {
    let gateway = setup().await;
    gateway
        .execute(Statement::new("DELETE FROM settings WHERE key IN ('vat_rate', 'tax_rate')"))
        .await
        .unwrap();

    let engine = CheckoutEngine::new(gateway);
    let outcome = engine
        .create_sale(cash_request(
            vec![RequestedItem { product_id: 1, quantity: 1 }],
            None,
        ))
        .await
        .expect("checkout");

    assert_eq!(outcome.sale.vat_cents, 0);
    assert_eq!(outcome.sale.total_cents, 1000);
}

#[tokio::test]
async fn unknown_product_is_rejected_with_its_id() {
    let gateway = setup().await;
    let engine = CheckoutEngine::new(gateway);

    let err = engine
        .create_sale(cash_request(
            vec![RequestedItem { product_id: 999, quantity: 1 }],
            None,
        ))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Product with ID 999 not found");
}

#[tokio::test]
async fn unknown_payment_method_is_rejected_before_any_write() {
    let gateway = setup().await;
    let engine = CheckoutEngine::new(gateway.clone());

    let mut request = cash_request(vec![RequestedItem { product_id: 1, quantity: 1 }], None);
    request.payment_method = "cheque".to_string();

    let err = engine.create_sale(request).await.unwrap_err();
    assert!(matches!(err, CheckoutFailure::Domain(CheckoutError::Validation(_))));

    let sales = gateway
        .query(Statement::new("SELECT COUNT(*) AS n FROM sales"))
        .await
        .unwrap();
    assert_eq!(sales[0].integer("n").unwrap(), 0);
}

#[tokio::test]
async fn insufficient_cash_tender_is_rejected() {
    let gateway = setup().await;
    let engine = CheckoutEngine::new(gateway.clone());

    let err = engine
        .create_sale(cash_request(
            vec![RequestedItem { product_id: 1, quantity: 2 }],
            Some(2000), // total is 2240
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutFailure::Domain(CheckoutError::InsufficientPayment)
    ));
    assert_eq!(stock_of(gateway.as_ref(), 1).await, 10);
}

#[tokio::test]
async fn cashier_sees_only_own_sales_in_history() {
    let gateway = setup().await;

    gateway
        .execute(
            Statement::new(
                "INSERT INTO users (username, password, role, full_name, created_at, updated_at) \
                 VALUES ('jose', 'not-a-real-hash', 'cashier', 'Jose Cruz', \
                 '2026-01-01 00:00:00', '2026-01-01 00:00:00')",
            ),
        )
        .await
        .unwrap();

    let engine = CheckoutEngine::new(gateway.clone());
    engine
        .create_sale(cash_request(vec![RequestedItem { product_id: 1, quantity: 1 }], None))
        .await
        .unwrap();
    let mut other = cash_request(vec![RequestedItem { product_id: 1, quantity: 1 }], None);
    other.cashier_id = 2;
    engine.create_sale(other).await.unwrap();

    let repo = SaleRepository::new(gateway);
    let filter = SaleFilter { page: 1, limit: 20, ..Default::default() };

    let admin_view = repo.list(&filter, 1, true).await.unwrap();
    assert_eq!(admin_view.total, 2);

    let cashier_view = repo.list(&filter, 2, false).await.unwrap();
    assert_eq!(cashier_view.total, 1);
    assert_eq!(cashier_view.sales[0].sale.cashier_id, 2);
    assert_eq!(cashier_view.sales[0].items_count, 1);

    // Direct lookup of someone else's sale reads as not found.
    let first_sale_id = admin_view.sales.iter().map(|e| e.sale.id).min().unwrap();
    assert!(repo.get(first_sale_id, 2, false).await.is_err());
}
