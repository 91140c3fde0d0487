use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes requiring a verified bearer token. The router is wrapped in the
/// auth middleware layer above this module, so unauthenticated requests
/// are rejected with 401 before any handler runs; handlers still receive
/// the `AuthUser` extractor for identity-sensitive checks.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /users/admin/{email}
        // Self-service role check: the path email must equal the caller's
        // verified identity, preventing one user from probing another's role.
        //
        // PATCH /users/admin/{email}
        // Admin promotion by user id; the elevated-privilege gate runs
        // inside the handler (privilege is re-resolved from the store).
        .route(
            "/users/admin/{email}",
            get(handlers::check_admin).patch(handlers::promote_user),
        )
}
