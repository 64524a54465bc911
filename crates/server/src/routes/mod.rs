//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health             - Liveness check
//! GET  /health/ready       - Readiness check (DB ping)
//!
//! # Auth
//! POST /register           - Create a tenant account (rate-limited)
//! POST /login              - Login action
//! GET  /logout             - Logout action
//!
//! # Inventory (requires auth)
//! GET  /                   - Current tenant's product list (JSON)
//! POST /products           - Add a product
//! POST /products/stock     - Increase a product's stock
//! POST /purchases          - Record a purchase
//! POST /purchases/repeat   - Repeat a purchase by name
//! POST /sales              - Record a sale
//!
//! # Reports (requires auth)
//! GET  /sales/report       - Sales report (?year&month)
//! GET  /purchases/report   - Purchases report (?year&month)
//!
//! # Assistant (requires auth)
//! POST /chatbot            - Ask the assistant (rate-limited)
//! ```

pub mod auth;
pub mod chatbot;
pub mod health;
pub mod products;
pub mod purchases;
pub mod sales;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{assistant_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the health check routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/register",
            post(auth::register).route_layer(auth_rate_limiter()),
        )
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
}

/// Create the inventory and reporting routes router.
pub fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/products", post(products::create))
        .route("/products/stock", post(products::increase_stock))
        .route("/purchases", post(purchases::create))
        .route("/purchases/repeat", post(purchases::repeat))
        .route("/sales", post(sales::create))
        .route("/sales/report", get(sales::report))
        .route("/purchases/report", get(purchases::report))
}

/// Create the assistant routes router.
pub fn assistant_routes() -> Router<AppState> {
    Router::new().route(
        "/chatbot",
        post(chatbot::ask).route_layer(assistant_rate_limiter()),
    )
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(ledger_routes())
        .merge(assistant_routes())
}
