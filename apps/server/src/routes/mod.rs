//! # HTTP Routes
//!
//! Route table for the JSON API. Every handler authenticates via the
//! extractors in `auth`; admin-only routes take `AdminUser`.
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  POST /api/auth/login                      credentials → token      │
//! │  GET  /api/auth/me                         current user             │
//! │                                                                     │
//! │  POST /api/sales                           checkout (201)           │
//! │  GET  /api/sales                           paginated history        │
//! │  GET  /api/sales/:id                       one sale with items      │
//! │  GET  /api/sales/reports/summary           admin                    │
//! │  GET  /api/sales/reports/:period           admin                    │
//! │  GET  /api/sales/product/:id               admin                    │
//! │                                                                     │
//! │  GET  /api/products[/:id|/barcode/:code]   catalog reads            │
//! │  POST/PUT/DELETE /api/products[/:id]       admin catalog writes     │
//! │                                                                     │
//! │  GET/PUT /api/settings, GET /api/settings/:key                      │
//! │  GET/POST/PUT/DELETE /api/customers[/:id]                           │
//! │  GET/POST/PUT/DELETE /api/users[/:id]      admin account management │
//! │                                                                     │
//! │  GET  /health                              unauthenticated          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod customers;
pub mod products;
pub mod sales;
pub mod settings;
pub mod users;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/sales", post(sales::create).get(sales::list))
        .route("/api/sales/reports/summary", get(sales::summary))
        .route("/api/sales/reports/:period", get(sales::period_report))
        .route("/api/sales/product/:id", get(sales::product_history))
        .route("/api/sales/:id", get(sales::get))
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/barcode/:code", get(products::get_by_barcode))
        .route(
            "/api/products/:id",
            get(products::get).put(products::update).delete(products::delete),
        )
        .route("/api/settings", get(settings::list).put(settings::update))
        .route("/api/settings/:key", get(settings::get))
        .route("/api/customers", get(customers::list).post(customers::create))
        .route(
            "/api/customers/:id",
            get(customers::get).put(customers::update).delete(customers::delete),
        )
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/:id", put(users::update).delete(users::delete))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

// =============================================================================
// Route-Level Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use pos_db::{schema, Gateway, LocalConfig, LocalGateway};

    use crate::auth::{hash_password, JwtManager};
    use crate::state::AppState;

    async fn test_app() -> Router {
        let gateway: Arc<dyn Gateway> = Arc::new(
            LocalGateway::connect(LocalConfig::in_memory()).await.unwrap(),
        );
        schema::initialize(gateway.as_ref()).await.unwrap();

        let users = pos_db::repository::UserRepository::new(gateway.clone());
        let admin_hash = hash_password("root-of-all-tills").unwrap();
        users
            .create("boss", &admin_hash, pos_core::Role::Admin, "The Boss")
            .await
            .unwrap();
        let hash = hash_password("hunter2-but-longer").unwrap();
        users
            .create("maria", &hash, pos_core::Role::Cashier, "Maria Santos")
            .await
            .unwrap();

        gateway
            .execute(
                pos_db::Statement::new(
                    "INSERT INTO products (name, barcode, price_cents, stock, min_stock, \
                     created_at, updated_at) VALUES ('Widget', '1000000000001', 1000, 10, 5, \
                     '2026-01-01 00:00:00', '2026-01-01 00:00:00')",
                ),
            )
            .await
            .unwrap();

        let state = AppState::new(
            gateway,
            JwtManager::new("route-test-secret-16b".to_string(), 3600),
        );
        super::router(state)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn login_as(app: &Router, username: &str, password: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "username": username, "password": password }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["token"].as_str().unwrap().to_string()
    }

    async fn login(app: &Router) -> String {
        login_as(app, "maria", "hunter2-but-longer").await
    }

    #[tokio::test]
    async fn login_then_checkout_round_trip() {
        let app = test_app().await;
        let token = login(&app).await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/sales")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::from(
                        json!({
                            "items": [{ "product_id": 1, "quantity": 2 }],
                            "payment_method": "cash",
                            "payment_received_cents": 2500
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["sale"]["total_cents"], 2240);
        assert_eq!(body["sale"]["change_cents"], 260);
        assert_eq!(body["receipt_data"]["vat_cents"], 240);
        assert_eq!(body["items"][0]["product_name"], "Widget");
    }

    #[tokio::test]
    async fn missing_token_is_401_with_error_body() {
        let app = test_app().await;

        let response = app
            .oneshot(Request::get("/api/sales").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn bad_credentials_are_401() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::post("/api/auth/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "username": "maria", "password": "wrong" }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cashier_cannot_reach_admin_reports() {
        let app = test_app().await;
        let token = login(&app).await;

        let response = app
            .oneshot(
                Request::get("/api/sales/reports/summary")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_creates_cashier_who_can_log_in() {
        let app = test_app().await;
        let token = login_as(&app, "boss", "root-of-all-tills").await;

        let response = app
            .clone()
            .oneshot(
                Request::post("/api/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::from(
                        json!({
                            "username": "pedro",
                            "password": "till-key-pedro",
                            "role": "cashier",
                            "full_name": "Pedro Reyes"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["username"], "pedro");
        assert_eq!(body["role"], "cashier");

        // The new account is immediately usable.
        login_as(&app, "pedro", "till-key-pedro").await;

        let response = app
            .oneshot(
                Request::get("/api/users")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["users"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn cashier_cannot_manage_users() {
        let app = test_app().await;
        let token = login(&app).await;

        let response = app
            .oneshot(
                Request::get("/api/users")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_cannot_delete_own_account() {
        let app = test_app().await;
        let token = login_as(&app, "boss", "root-of-all-tills").await;

        // boss is the first seeded user.
        let response = app
            .oneshot(
                Request::delete("/api/users/1")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Cannot delete your own account");
    }

    #[tokio::test]
    async fn short_password_is_rejected() {
        let app = test_app().await;
        let token = login_as(&app, "boss", "root-of-all-tills").await;

        let response = app
            .oneshot(
                Request::post("/api/users")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::from(
                        json!({
                            "username": "pedro",
                            "password": "short",
                            "role": "cashier",
                            "full_name": "Pedro Reyes"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn understocked_checkout_is_400() {
        let app = test_app().await;
        let token = login(&app).await;

        let response = app
            .oneshot(
                Request::post("/api/sales")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::from(
                        json!({
                            "items": [{ "product_id": 1, "quantity": 999 }],
                            "payment_method": "cash"
                        })
                        .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Insufficient stock for Widget. Available: 10, Requested: 999"
        );
    }
}
