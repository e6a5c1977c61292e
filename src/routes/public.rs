use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client: the read-only catalog listings and the account gateway endpoints
/// (login, register).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks. Returns "ok" immediately.
        .route("/health", get(|| async { "ok" }))
        // GET /items/
        // Lists the full catalog in insertion order.
        .route("/items/", get(handlers::list_items))
        // GET /vouchers/
        // Lists all discount vouchers.
        .route("/vouchers/", get(handlers::list_vouchers))
        // POST /login/
        // Verifies credentials and establishes a session. The failure
        // response is uniform regardless of which credential was wrong.
        .route("/login/", post(handlers::login))
        // POST /register/
        // Creates a new 'Customer' account. Duplicate username/email is a 409.
        .route("/register/", post(handlers::register))
}
