use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Public Router Module
///
/// Endpoints reachable without credentials, plus the mixed-tier paths
/// whose restricted methods carry their own gate in the handler. Reads
/// here serve anonymous browsing; writes (submission, profile edit, the
/// full-field article replace) are open by design and the repository
/// applies the lifecycle defaults server-side.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /jwt
        // Issues a signed bearer token (1-day expiry) for the supplied claims.
        .route("/jwt", post(handlers::issue_token))
        // POST /users — idempotent registration.
        // GET /users?page&limit — paged listing; admin-gated inside the handler.
        .route(
            "/users",
            post(handlers::register_user).get(handlers::list_users),
        )
        // GET /allUsers
        // Unpaginated user summary for the homepage.
        .route("/allUsers", get(handlers::get_all_users))
        // GET/PATCH /user/{email}
        // Single-user fetch and the name/photo profile edit.
        .route(
            "/user/{email}",
            get(handlers::get_user).patch(handlers::update_profile),
        )
        // GET /articles?publisher&tag&title&email — conjunctive filtered search.
        // POST /articles — submission; the store forces status to pending.
        .route(
            "/articles",
            get(handlers::search_articles).post(handlers::submit_article),
        )
        // GET /topViewed
        // The six most-viewed articles for the homepage.
        .route("/topViewed", get(handlers::top_viewed))
        // GET /allArticles?page&limit
        // Paged article listing with an independent total count.
        .route("/allArticles", get(handlers::list_articles))
        // GET /articles/{id} — single fetch.
        // PATCH /articles/{id} — atomic view-count increment.
        // DELETE /articles/{id} — token-gated via the AuthUser extractor;
        // any authenticated caller may delete any article (no ownership check).
        .route(
            "/articles/{id}",
            get(handlers::get_article)
                .patch(handlers::increment_view)
                .delete(handlers::delete_article),
        )
        // PATCH /article/update/{id}
        // Full-field replace of the editable attributes; status and tier
        // are not in the writable set.
        .route("/article/update/{id}", patch(handlers::update_article))
        // GET /publishers — public listing.
        // POST /publishers — admin-gated inside the handler.
        .route(
            "/publishers",
            get(handlers::list_publishers).post(handlers::add_publisher),
        )
        // POST /create-payment-intent
        // Delegates to the payment gateway; returns the client secret.
        .route(
            "/create-payment-intent",
            post(handlers::create_payment_intent),
        )
}
