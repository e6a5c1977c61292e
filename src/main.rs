use shoplite::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point for the application, responsible for
/// initializing all core components: configuration, logging, database, and
/// the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & environment loading (fail-fast).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging filter setup. Prioritizes RUST_LOG, falling back to
    // sensible defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shoplite=debug,tower_http=info,axum=trace".into());

    // 3. Initialize logging based on environment.
    match config.env {
        Env::Local => {
            // LOCAL: pretty output for human readability.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Database initialization (Postgres).
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    // Apply any pending schema migrations before taking traffic.
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to run database migrations.");

    // Instantiate the repository, wrapped in an Arc for thread-safe sharing.
    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 5. Unified state assembly.
    let app_state = AppState { repo, config };

    // 6. Router and server startup.
    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:3000").await.unwrap();

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on 0.0.0.0:3000");
    tracing::info!("API Documentation (Swagger UI) available at: http://localhost:3000/swagger-ui");

    axum::serve(listener, app).await.unwrap();
}
