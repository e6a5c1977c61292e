use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Defines the routes that require an established session. Every handler
/// here relies on the `AuthUser` extractor middleware being layered above
/// this module, which guarantees the handler receives a resolved account.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me/
        // Returns the account bound to the presented session token.
        .route("/me/", get(handlers::me))
}
