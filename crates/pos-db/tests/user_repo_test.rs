//! User repository integration tests against an in-memory local
//! database: account lifecycle and the sales-history delete guard.

use std::sync::Arc;

use pos_core::{RequestedItem, Role};
use pos_db::checkout::{CheckoutEngine, CreateSaleRequest};
use pos_db::repository::UserRepository;
use pos_db::{schema, DbError, Gateway, LocalConfig, LocalGateway, Statement};

async fn setup() -> Arc<dyn Gateway> {
    let gateway: Arc<dyn Gateway> = Arc::new(
        LocalGateway::connect(LocalConfig::in_memory())
            .await
            .expect("in-memory database"),
    );
    schema::initialize(gateway.as_ref()).await.expect("schema");
    gateway
}

#[tokio::test]
async fn lifecycle_create_update_list_delete() {
    let gateway = setup().await;
    let repo = UserRepository::new(gateway);

    let user = repo
        .create("pedro", "hash-one", Role::Cashier, "Pedro Reyes")
        .await
        .unwrap();
    assert_eq!(user.username, "pedro");
    assert_eq!(user.role, Role::Cashier);

    let updated = repo.update(user.id, "Pedro B. Reyes", Role::Admin).await.unwrap();
    assert_eq!(updated.full_name.as_deref(), Some("Pedro B. Reyes"));
    assert_eq!(updated.role, Role::Admin);

    repo.set_password(user.id, "hash-two").await.unwrap();
    let credentials = repo.get_credentials("pedro").await.unwrap().unwrap();
    assert_eq!(credentials.password_hash, "hash-two");

    assert_eq!(repo.list().await.unwrap().len(), 1);
    repo.delete(user.id).await.unwrap();
    assert_eq!(repo.list().await.unwrap().len(), 0);
}

#[tokio::test]
async fn update_of_unknown_user_is_not_found() {
    let gateway = setup().await;
    let repo = UserRepository::new(gateway);

    let err = repo.update(999, "Nobody", Role::Cashier).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { entity: "User", ref id } if id == "999"));
}

#[tokio::test]
async fn cashier_with_sales_history_cannot_be_deleted() {
    let gateway = setup().await;
    let repo = UserRepository::new(gateway.clone());

    let cashier = repo
        .create("maria", "not-a-real-hash", Role::Cashier, "Maria Santos")
        .await
        .unwrap();

    gateway
        .execute(
            Statement::new(
                "INSERT INTO products (name, price_cents, stock, min_stock, created_at, \
                 updated_at) VALUES ('Widget', 1000, 10, 5, '2026-01-01 00:00:00', \
                 '2026-01-01 00:00:00')",
            ),
        )
        .await
        .expect("seed product");

    CheckoutEngine::new(gateway)
        .create_sale(CreateSaleRequest {
            cashier_id: cashier.id,
            items: vec![RequestedItem { product_id: 1, quantity: 1 }],
            payment_method: "cash".to_string(),
            payment_received_cents: Some(1120),
            discount_cents: 0,
            customer_id: None,
            amount_paid_cents: None,
        })
        .await
        .expect("sale");

    let err = repo.delete(cashier.id).await.unwrap_err();
    assert!(matches!(err, DbError::Referenced { entity: "User", .. }));

    // The account still exists and its history stays attributable.
    assert_eq!(repo.get(cashier.id).await.unwrap().username, "maria");
}
