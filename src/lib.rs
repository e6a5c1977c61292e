use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the application entry point.
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application from the `#[utoipa::path]` and `#[derive(utoipa::ToSchema)]`
/// annotations. The resulting JSON is served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_items,
        handlers::list_vouchers,
        handlers::login,
        handlers::register,
        handlers::me,
    ),
    components(
        schemas(
            models::Item,
            models::Voucher,
            models::User,
            models::LoginRequest,
            models::RegisterRequest,
        )
    ),
    tags(
        (name = "shoplite", description = "Minimal shop backend API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding all application
/// services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts database access behind the trait object.
    pub repo: RepositoryState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow extractors (notably AuthUser) to pull individual components
// out of the shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces an established session for the `authenticated_routes`.
///
/// *Mechanism*: it attempts to extract `AuthUser` from the request. Since
/// `AuthUser` implements `FromRequestParts`, a failed session resolution
/// rejects the request with 401 before the handler runs; on success the
/// request proceeds unchanged.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Session-bound routes: protected by the auth middleware.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // Observability and correlation layers (applied outermost).
    base_router
        .layer(
            ServiceBuilder::new()
                // Request ID generation: a unique UUID for every request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Request tracing: wraps the request/response lifecycle in a
                // span carrying the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Request ID propagation: returns x-request-id to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Helper used by `TraceLayer` to customize span creation: the
/// `x-request-id` header (if present) is included in the structured logging
/// metadata alongside the HTTP method and URI, so every log line for a
/// single request is correlated by a unique ID.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
