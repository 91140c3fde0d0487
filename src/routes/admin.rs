use crate::{AppState, handlers};
use axum::{Router, routing::patch};

/// Admin Router Module
///
/// The moderation endpoints, restricted to users whose role is admin.
/// Each handler authenticates via the `AuthUser` extractor and then calls
/// `require_admin`, which re-resolves privilege from the store on every
/// request; a role embedded in an old token is never trusted.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // PATCH /articles/status/{id}
        // Approves an article. No prior-state guard: approving from any
        // status is a silent success.
        .route("/articles/status/{id}", patch(handlers::approve_article))
        // PATCH /articles/decline/{id}
        // Declines an article and records the reason from the body.
        .route("/articles/decline/{id}", patch(handlers::decline_article))
        // PATCH /articles/premium/{id}
        // Promotes the content tier to premium. No demotion exists.
        .route("/articles/premium/{id}", patch(handlers::promote_premium))
}
