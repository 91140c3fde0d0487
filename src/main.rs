use news_desk::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    payments::{PaymentState, StripeGateway},
    repository::{PostgresRepository, RepositoryState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Asynchronous entry point: loads configuration, initializes logging,
/// opens the store connection, assembles the shared state, and serves.
#[tokio::main]
async fn main() {
    // Configuration loading (fail-fast for missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // Log filter: RUST_LOG wins, with sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "news_desk=debug,tower_http=info,axum=trace".into());

    // Pretty output for local debugging, JSON for log aggregators in prod.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // Store initialization. The pool is opened once here and shared by
    // every request handler; it is the process's only shared resource.
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // Payment gateway initialization.
    let payments = Arc::new(StripeGateway::new(&config.stripe_secret_key)) as PaymentState;

    let app_state = AppState {
        repo,
        payments,
        config,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind("0.0.0.0:5000")
        .await
        .expect("FATAL: failed to bind listener");

    tracing::info!("Listening on 0.0.0.0:5000");
    tracing::info!("API documentation available at: http://localhost:5000/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: server error");
}
