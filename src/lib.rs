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
pub mod errors;
pub mod handlers;
pub mod models;
pub mod payments;
pub mod repository;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the entry point (main.rs).
pub use config::AppConfig;
pub use errors::ApiError;
pub use payments::{MockPaymentGateway, PaymentState, StripeGateway};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the service, aggregating
/// every handler decorated with `#[utoipa::path]` and every schema used
/// in request/response bodies. Served as JSON at `/api-docs/openapi.json`
/// and browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::issue_token, handlers::register_user, handlers::get_all_users,
        handlers::list_users, handlers::check_admin, handlers::promote_user,
        handlers::get_user, handlers::update_profile, handlers::search_articles,
        handlers::top_viewed, handlers::list_articles, handlers::get_article,
        handlers::submit_article, handlers::increment_view, handlers::update_article,
        handlers::approve_article, handlers::decline_article, handlers::promote_premium,
        handlers::delete_article, handlers::add_publisher, handlers::list_publishers,
        handlers::create_payment_intent
    ),
    components(
        schemas(
            models::User, models::Article, models::Publisher, models::Role,
            models::ArticleStatus, models::ContentTier, models::TokenRequest,
            models::TokenResponse, models::RegisterUserRequest, models::RegisterOutcome,
            models::UpdateProfileRequest, models::AdminCheckResponse,
            models::SubmitArticleRequest, models::SubmitOutcome,
            models::UpdateArticleRequest, models::DeclineRequest,
            models::AddPublisherRequest, models::PaymentIntentRequest,
            models::PaymentIntentResponse, models::UpdateReport, models::DeleteReport,
            models::UserPage, models::ArticlePage,
        )
    ),
    tags(
        (name = "news-desk", description = "News publishing platform API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe, immutable container holding every service a
/// handler may need: the persistence layer, the payment gateway, and the
/// loaded configuration. Constructed once at startup and cloned per
/// request; there is no other shared mutable state in the process, so the
/// store is the sole point of contention.
#[derive(Clone)]
pub struct AppState {
    /// Repository layer: abstracts the document store behind a trait.
    pub repo: RepositoryState,
    /// Payment gateway: abstracts the payment-intent collaborator.
    pub payments: PaymentState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Allow handlers and extractors to pull individual components from the
// shared AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for PaymentState {
    fn from_ref(app_state: &AppState) -> PaymentState {
        app_state.payments.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the authenticated route group. The
/// `AuthUser` extractor runs as part of the middleware signature: a
/// missing or invalid bearer token rejects the request with 401 before
/// the handler executes.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the full routing surface, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        // Documentation: auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware; mixed-tier methods gate themselves.
        .merge(public::public_routes())
        // Authenticated routes: the auth layer rejects missing/invalid
        // tokens before the handlers run.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Moderation routes: the admin role check happens inside each
        // handler, re-resolved from the store per request.
        .merge(admin::admin_routes())
        .with_state(state);

    // Observability and correlation layers, outermost.
    base_router
        .layer(
            ServiceBuilder::new()
                // Generate a unique id for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // Wrap the request/response lifecycle in a correlated span.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // Return the generated x-request-id header to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: includes the `x-request-id` header (if
/// present) in the structured metadata so every log line for one request
/// correlates by a unique id.
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
