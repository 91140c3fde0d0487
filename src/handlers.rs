use crate::{
    AppState,
    auth::{self, AuthUser},
    errors::ApiError,
    models::{
        AddPublisherRequest, AdminCheckResponse, Article, ArticleFilter, ArticlePage,
        ArticleStatus, DeclineRequest, DeleteReport, PaymentIntentRequest, PaymentIntentResponse,
        Publisher, RegisterOutcome, RegisterUserRequest, SubmitArticleRequest, SubmitOutcome,
        TokenRequest, TokenResponse, UpdateArticleRequest, UpdateProfileRequest, UpdateReport,
        User, UserPage,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

/// Homepage top-list size, fixed by the product.
const TOP_VIEWED_LIMIT: i64 = 6;

// --- Query Parameter Structs ---

/// PageQuery
///
/// The page/limit pair accepted by the paged listing endpoints. Both are
/// required and 1-indexed; the pagination engine does not guard against
/// zero or negative values (caller responsibility).
#[derive(serde::Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: i64,
    pub limit: i64,
}

// --- Token Issuance ---

/// issue_token
///
/// [Public Route] Signs the supplied claims into a bearer token with a
/// fixed 1-day expiry. Pure delegation to the signing collaborator; no
/// store access and no role embedded in the token.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = TokenRequest,
    responses((status = 200, description = "Signed token", body = TokenResponse))
)]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = auth::issue_token(&state.config.jwt_secret, &payload.email)?;
    Ok(Json(TokenResponse { token }))
}

// --- User Directory ---

/// register_user
///
/// [Public Route] Idempotent registration. A request for an email that
/// already exists reports `created=false` with no identifier; this is a
/// deliberate idempotence guarantee, not a failure.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterUserRequest,
    responses((status = 200, description = "Registration outcome", body = RegisterOutcome))
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Json<RegisterOutcome> {
    let inserted_id = state.repo.register_user(payload).await;
    Json(RegisterOutcome {
        created: inserted_id.is_some(),
        inserted_id,
    })
}

/// get_all_users
///
/// [Public Route] Unrestricted, unpaginated user listing for small
/// homepage summaries.
#[utoipa::path(
    get,
    path = "/allUsers",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn get_all_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.repo.all_users().await)
}

/// list_users
///
/// [Admin Route] Paged user listing. Privilege is re-resolved from the
/// store before the query runs.
#[utoipa::path(
    get,
    path = "/users",
    params(PageQuery),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 403, description = "Not admin")
    )
)]
pub async fn list_users(
    identity: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserPage>, ApiError> {
    auth::require_admin(&state.repo, &identity).await?;
    Ok(Json(state.repo.users_paged(query.page, query.limit).await))
}

/// check_admin
///
/// [Authenticated Route] Self-service "am I admin" query. The path email
/// must match the caller's own verified identity; probing another user's
/// role is forbidden. A missing user record answers `admin=false`.
#[utoipa::path(
    get,
    path = "/users/admin/{email}",
    params(("email" = String, Path, description = "Must equal the caller's verified email")),
    responses(
        (status = 200, description = "Role check", body = AdminCheckResponse),
        (status = 403, description = "Email does not match the caller")
    )
)]
pub async fn check_admin(
    identity: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AdminCheckResponse>, ApiError> {
    if email != identity.email {
        return Err(ApiError::Forbidden);
    }
    let admin = state
        .repo
        .get_user_by_email(&email)
        .await
        .map(|user| user.role == crate::models::Role::Admin)
        .unwrap_or(false);
    Ok(Json(AdminCheckResponse { admin }))
}

/// promote_user
///
/// [Admin Route] Sets the target user's role to admin. No demotion
/// operation exists. The change is visible to authorization checks at the
/// target's next privileged request; no synchronization barrier.
#[utoipa::path(
    patch,
    path = "/users/admin/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Updated", body = UpdateReport),
        (status = 403, description = "Not admin")
    )
)]
pub async fn promote_user(
    identity: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UpdateReport>, ApiError> {
    auth::require_admin(&state.repo, &identity).await?;
    Ok(Json(state.repo.promote_user(id).await))
}

/// get_user
///
/// [Public Route] Fetches one user by email.
#[utoipa::path(
    get,
    path = "/user/{email}",
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "No such user")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<User>, ApiError> {
    match state.repo.get_user_by_email(&email).await {
        Some(user) => Ok(Json(user)),
        None => Err(ApiError::NotFound),
    }
}

/// update_profile
///
/// [Public Route] Replaces exactly the name and photo fields with what
/// was supplied. An absent photo clears the stored value, so callers must
/// send both fields to avoid clearing one inadvertently.
#[utoipa::path(
    patch,
    path = "/user/{email}",
    params(("email" = String, Path, description = "User email")),
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Updated", body = UpdateReport))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Json<UpdateReport> {
    Json(state.repo.update_profile(&email, payload).await)
}

// --- Article Store ---

/// search_articles
///
/// [Public Route] Filtered search. Each present filter is ANDed; the
/// title filter is a case-insensitive substring match; no filters returns
/// the full collection. Store failures on this path surface as 500.
#[utoipa::path(
    get,
    path = "/articles",
    params(ArticleFilter),
    responses(
        (status = 200, description = "Matching articles", body = [Article]),
        (status = 500, description = "Store failure")
    )
)]
pub async fn search_articles(
    State(state): State<AppState>,
    Query(filter): Query<ArticleFilter>,
) -> Result<Json<Vec<Article>>, ApiError> {
    match state.repo.search_articles(filter).await {
        Ok(articles) => Ok(Json(articles)),
        Err(e) => {
            tracing::error!("article search failed: {}", e);
            Err(ApiError::Internal)
        }
    }
}

/// top_viewed
///
/// [Public Route] The six most-viewed articles for the homepage, ties
/// broken by store-native order.
#[utoipa::path(
    get,
    path = "/topViewed",
    responses((status = 200, description = "Top articles by views", body = [Article]))
)]
pub async fn top_viewed(State(state): State<AppState>) -> Json<Vec<Article>> {
    Json(state.repo.top_viewed(TOP_VIEWED_LIMIT).await)
}

/// list_articles
///
/// [Public Route] Paged article listing; same total/items consistency
/// caveat as the user listing.
#[utoipa::path(
    get,
    path = "/allArticles",
    params(PageQuery),
    responses((status = 200, description = "One page of articles", body = ArticlePage))
)]
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<ArticlePage> {
    Json(state.repo.articles_paged(query.page, query.limit).await)
}

/// get_article
///
/// [Public Route] Fetches one article by id.
#[utoipa::path(
    get,
    path = "/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = Article),
        (status = 404, description = "No such article")
    )
)]
pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError> {
    match state.repo.get_article(id).await {
        Some(article) => Ok(Json(article)),
        None => Err(ApiError::NotFound),
    }
}

/// submit_article
///
/// [Public Route] Article submission. The store applies the lifecycle
/// defaults (status Pending, tier Normal, zero views) server-side; the
/// payload cannot carry a status.
#[utoipa::path(
    post,
    path = "/articles",
    request_body = SubmitArticleRequest,
    responses((status = 200, description = "Submitted", body = SubmitOutcome))
)]
pub async fn submit_article(
    State(state): State<AppState>,
    Json(payload): Json<SubmitArticleRequest>,
) -> Json<SubmitOutcome> {
    let inserted_id = state.repo.submit_article(payload).await;
    Json(SubmitOutcome { inserted_id })
}

/// increment_view
///
/// [Public Route] Atomically increments the article's view count and
/// returns the post-increment document. The repository performs this as
/// one indivisible store operation, so concurrent page views never lose
/// an increment.
#[utoipa::path(
    patch,
    path = "/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Post-increment article", body = Article),
        (status = 404, description = "No such article")
    )
)]
pub async fn increment_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError> {
    match state.repo.increment_view(id).await {
        Some(article) => Ok(Json(article)),
        None => Err(ApiError::NotFound),
    }
}

/// update_article
///
/// [Public Route] Full-field replace of the editable attributes. Status
/// and tier are excluded from the writable set; the moderation endpoints
/// remain the only path that changes them.
#[utoipa::path(
    patch,
    path = "/article/update/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = UpdateArticleRequest,
    responses((status = 200, description = "Updated", body = UpdateReport))
)]
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Json<UpdateReport> {
    Json(state.repo.update_article(id, payload).await)
}

/// approve_article
///
/// [Admin Route] Sets the status to approved. There is no prior-state
/// guard: approving an already-approved or declined article is a silent
/// success, and any stale decline reason stays in place.
#[utoipa::path(
    patch,
    path = "/articles/status/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Updated", body = UpdateReport),
        (status = 403, description = "Not admin")
    )
)]
pub async fn approve_article(
    identity: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UpdateReport>, ApiError> {
    auth::require_admin(&state.repo, &identity).await?;
    Ok(Json(
        state
            .repo
            .set_status(id, ArticleStatus::Approved, None)
            .await,
    ))
}

/// decline_article
///
/// [Admin Route] Sets the status to declined and records the reason. No
/// prior-state guard; declining from any status succeeds.
#[utoipa::path(
    patch,
    path = "/articles/decline/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    request_body = DeclineRequest,
    responses(
        (status = 200, description = "Updated", body = UpdateReport),
        (status = 403, description = "Not admin")
    )
)]
pub async fn decline_article(
    identity: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DeclineRequest>,
) -> Result<Json<UpdateReport>, ApiError> {
    auth::require_admin(&state.repo, &identity).await?;
    Ok(Json(
        state
            .repo
            .set_status(id, ArticleStatus::Declined, Some(payload.decline_reason))
            .await,
    ))
}

/// promote_premium
///
/// [Admin Route] Promotes the content tier to premium. No demotion
/// operation exists.
#[utoipa::path(
    patch,
    path = "/articles/premium/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Updated", body = UpdateReport),
        (status = 403, description = "Not admin")
    )
)]
pub async fn promote_premium(
    identity: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UpdateReport>, ApiError> {
    auth::require_admin(&state.repo, &identity).await?;
    Ok(Json(state.repo.set_premium(id).await))
}

/// delete_article
///
/// [Authenticated Route] Deletes an article by id. Any authenticated
/// caller may delete any article; there is no ownership-or-admin check.
/// Deleting a nonexistent id reports zero documents affected, not an
/// error.
#[utoipa::path(
    delete,
    path = "/articles/{id}",
    params(("id" = Uuid, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Delete outcome", body = DeleteReport),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn delete_article(
    _identity: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Json<DeleteReport> {
    Json(state.repo.delete_article(id).await)
}

// --- Publisher Directory ---

/// add_publisher
///
/// [Admin Route] Registers a named content source. Publishers are
/// immutable after creation.
#[utoipa::path(
    post,
    path = "/publishers",
    request_body = AddPublisherRequest,
    responses(
        (status = 200, description = "Created", body = SubmitOutcome),
        (status = 403, description = "Not admin")
    )
)]
pub async fn add_publisher(
    identity: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<AddPublisherRequest>,
) -> Result<Json<SubmitOutcome>, ApiError> {
    auth::require_admin(&state.repo, &identity).await?;
    let inserted_id = state.repo.add_publisher(payload).await;
    Ok(Json(SubmitOutcome { inserted_id }))
}

/// list_publishers
///
/// [Public Route] Lists all publishers.
#[utoipa::path(
    get,
    path = "/publishers",
    responses((status = 200, description = "All publishers", body = [Publisher]))
)]
pub async fn list_publishers(State(state): State<AppState>) -> Json<Vec<Publisher>> {
    Json(state.repo.list_publishers().await)
}

// --- Payments ---

/// create_payment_intent
///
/// [Public Route] Delegates intent creation to the payment gateway. The
/// dollar price is converted to integer cents by truncation before the
/// call.
#[utoipa::path(
    post,
    path = "/create-payment-intent",
    request_body = PaymentIntentRequest,
    responses(
        (status = 200, description = "Client secret", body = PaymentIntentResponse),
        (status = 500, description = "Gateway failure")
    )
)]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(payload): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, ApiError> {
    let amount_cents = (payload.price * 100.0) as i64;
    match state.payments.create_intent(amount_cents).await {
        Ok(client_secret) => Ok(Json(PaymentIntentResponse { client_secret })),
        Err(e) => {
            tracing::error!("payment intent failed: {}", e);
            Err(ApiError::Internal)
        }
    }
}
