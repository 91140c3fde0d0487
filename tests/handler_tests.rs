use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use news_desk::{
    AppState,
    auth::AuthUser,
    config::AppConfig,
    errors::ApiError,
    handlers::{self, PageQuery},
    models::{
        AddPublisherRequest, ArticleStatus, ContentTier, DeclineRequest, PaymentIntentRequest,
        RegisterUserRequest, SubmitArticleRequest, UpdateProfileRequest,
    },
    payments::MockPaymentGateway,
    repository::{MemoryRepository, Repository},
};
use std::sync::Arc;
use uuid::Uuid;

// --- Test Setup ---

fn test_state() -> AppState {
    AppState {
        repo: Arc::new(MemoryRepository::new()),
        payments: Arc::new(MockPaymentGateway::new()),
        config: AppConfig::default(),
    }
}

fn failing_payment_state() -> AppState {
    AppState {
        repo: Arc::new(MemoryRepository::new()),
        payments: Arc::new(MockPaymentGateway::new_failing()),
        config: AppConfig::default(),
    }
}

/// Registers a user, promotes them to admin, and returns their identity.
async fn seed_admin(state: &AppState, email: &str) -> AuthUser {
    let id = state
        .repo
        .register_user(RegisterUserRequest {
            email: email.to_string(),
            name: "Admin".to_string(),
            photo_url: None,
        })
        .await
        .unwrap();
    state.repo.promote_user(id).await;
    AuthUser {
        email: email.to_string(),
    }
}

async fn seed_regular(state: &AppState, email: &str) -> AuthUser {
    state
        .repo
        .register_user(RegisterUserRequest {
            email: email.to_string(),
            name: "Regular".to_string(),
            photo_url: None,
        })
        .await;
    AuthUser {
        email: email.to_string(),
    }
}

async fn seed_article(state: &AppState, title: &str) -> Uuid {
    state
        .repo
        .submit_article(SubmitArticleRequest {
            title: title.to_string(),
            description: "body".to_string(),
            image: None,
            publisher: "Daily".to_string(),
            author_name: "Author".to_string(),
            author_email: "author@example.com".to_string(),
            author_photo: None,
            tags: vec!["tech".to_string()],
            posted_date: Utc::now(),
        })
        .await
}

// --- Registration & Users ---

#[tokio::test]
async fn register_handler_reports_idempotent_duplicate() {
    let state = test_state();
    let payload = RegisterUserRequest {
        email: "new@example.com".to_string(),
        name: "New".to_string(),
        photo_url: None,
    };

    let first = handlers::register_user(State(state.clone()), Json(payload.clone())).await;
    assert!(first.0.created);
    assert!(first.0.inserted_id.is_some());

    let second = handlers::register_user(State(state), Json(payload)).await;
    assert!(!second.0.created);
    assert!(second.0.inserted_id.is_none());
}

#[tokio::test]
async fn get_user_answers_404_for_unknown_email() {
    let state = test_state();
    let result = handlers::get_user(State(state), Path("missing@example.com".to_string())).await;
    assert_eq!(result.unwrap_err(), ApiError::NotFound);
}

#[tokio::test]
async fn update_profile_clears_omitted_photo() {
    let state = test_state();
    seed_regular(&state, "edit@example.com").await;

    let report = handlers::update_profile(
        State(state.clone()),
        Path("edit@example.com".to_string()),
        Json(UpdateProfileRequest {
            name: "Edited".to_string(),
            photo_url: None,
        }),
    )
    .await;
    assert_eq!(report.0.modified_count, 1);

    let user = state
        .repo
        .get_user_by_email("edit@example.com")
        .await
        .unwrap();
    assert_eq!(user.name, "Edited");
    assert_eq!(user.photo_url, None);
}

#[tokio::test]
async fn paged_user_listing_requires_admin() {
    let state = test_state();
    let regular = seed_regular(&state, "plain@example.com").await;

    let denied = handlers::list_users(
        regular,
        State(state.clone()),
        Query(PageQuery { page: 1, limit: 10 }),
    )
    .await;
    assert_eq!(denied.unwrap_err(), ApiError::Forbidden);

    let admin = seed_admin(&state, "boss@example.com").await;
    let page = handlers::list_users(
        admin,
        State(state),
        Query(PageQuery { page: 1, limit: 10 }),
    )
    .await
    .unwrap();
    assert_eq!(page.0.total, 2);
}

#[tokio::test]
async fn admin_check_refuses_to_probe_another_account() {
    let state = test_state();
    let caller = seed_regular(&state, "me@example.com").await;

    let probing = handlers::check_admin(
        caller.clone(),
        State(state.clone()),
        Path("someone-else@example.com".to_string()),
    )
    .await;
    assert_eq!(probing.unwrap_err(), ApiError::Forbidden);

    let own = handlers::check_admin(caller, State(state), Path("me@example.com".to_string()))
        .await
        .unwrap();
    assert!(!own.0.admin);
}

#[tokio::test]
async fn admin_check_answers_false_for_missing_record() {
    let state = test_state();
    // A valid token for an email with no directory record.
    let ghost = AuthUser {
        email: "ghost@example.com".to_string(),
    };
    let response = handlers::check_admin(ghost, State(state), Path("ghost@example.com".to_string()))
        .await
        .unwrap();
    assert!(!response.0.admin);
}

#[tokio::test]
async fn promotion_is_admin_only() {
    let state = test_state();
    let regular = seed_regular(&state, "plain@example.com").await;
    let target = state
        .repo
        .register_user(RegisterUserRequest {
            email: "target@example.com".to_string(),
            name: "Target".to_string(),
            photo_url: None,
        })
        .await
        .unwrap();

    let denied =
        handlers::promote_user(regular, State(state.clone()), Path(target)).await;
    assert_eq!(denied.unwrap_err(), ApiError::Forbidden);

    let admin = seed_admin(&state, "boss@example.com").await;
    let report = handlers::promote_user(admin, State(state.clone()), Path(target))
        .await
        .unwrap();
    assert_eq!(report.0.modified_count, 1);
    assert_eq!(
        state
            .repo
            .get_user_by_email("target@example.com")
            .await
            .unwrap()
            .role,
        news_desk::models::Role::Admin
    );
}

// --- Article Lifecycle ---

#[tokio::test]
async fn article_lookup_and_increment_answer_404_for_unknown_id() {
    let state = test_state();
    let missing = Uuid::new_v4();

    let get = handlers::get_article(State(state.clone()), Path(missing)).await;
    assert_eq!(get.unwrap_err(), ApiError::NotFound);

    let bump = handlers::increment_view(State(state), Path(missing)).await;
    assert_eq!(bump.unwrap_err(), ApiError::NotFound);
}

#[tokio::test]
async fn moderation_endpoints_reject_non_admins() {
    let state = test_state();
    let regular = seed_regular(&state, "plain@example.com").await;
    let id = seed_article(&state, "Pending Piece").await;

    let approve =
        handlers::approve_article(regular.clone(), State(state.clone()), Path(id)).await;
    assert_eq!(approve.unwrap_err(), ApiError::Forbidden);

    let decline = handlers::decline_article(
        regular.clone(),
        State(state.clone()),
        Path(id),
        Json(DeclineRequest {
            decline_reason: "nope".to_string(),
        }),
    )
    .await;
    assert_eq!(decline.unwrap_err(), ApiError::Forbidden);

    let premium = handlers::promote_premium(regular, State(state.clone()), Path(id)).await;
    assert_eq!(premium.unwrap_err(), ApiError::Forbidden);

    // Nothing changed.
    let article = state.repo.get_article(id).await.unwrap();
    assert_eq!(article.status, ArticleStatus::Pending);
    assert_eq!(article.tier, ContentTier::Normal);
}

#[tokio::test]
async fn admin_walks_the_full_moderation_flow() {
    let state = test_state();
    let admin = seed_admin(&state, "boss@example.com").await;
    let id = seed_article(&state, "Contested Piece").await;

    let declined = handlers::decline_article(
        admin.clone(),
        State(state.clone()),
        Path(id),
        Json(DeclineRequest {
            decline_reason: "needs sources".to_string(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(declined.0.modified_count, 1);

    // Approving a declined article succeeds; no transition graph.
    let approved = handlers::approve_article(admin.clone(), State(state.clone()), Path(id))
        .await
        .unwrap();
    assert_eq!(approved.0.modified_count, 1);

    let premium = handlers::promote_premium(admin, State(state.clone()), Path(id))
        .await
        .unwrap();
    assert_eq!(premium.0.modified_count, 1);

    let article = state.repo.get_article(id).await.unwrap();
    assert_eq!(article.status, ArticleStatus::Approved);
    assert_eq!(article.tier, ContentTier::Premium);
    assert_eq!(article.decline_reason.as_deref(), Some("needs sources"));
}

#[tokio::test]
async fn any_authenticated_caller_may_delete() {
    let state = test_state();
    // Not the author, not an admin, not even registered.
    let stranger = AuthUser {
        email: "stranger@example.com".to_string(),
    };
    let id = seed_article(&state, "Short-lived").await;

    let report = handlers::delete_article(stranger.clone(), State(state.clone()), Path(id)).await;
    assert_eq!(report.0.deleted_count, 1);

    // Deleting again reports zero affected, still a 200-shaped response.
    let again = handlers::delete_article(stranger, State(state), Path(id)).await;
    assert_eq!(again.0.deleted_count, 0);
}

// --- Publishers ---

#[tokio::test]
async fn publisher_creation_is_admin_only() {
    let state = test_state();
    let regular = seed_regular(&state, "plain@example.com").await;

    let denied = handlers::add_publisher(
        regular,
        State(state.clone()),
        Json(AddPublisherRequest {
            name: "Daily Planet".to_string(),
            logo: "dp.png".to_string(),
        }),
    )
    .await;
    assert_eq!(denied.unwrap_err(), ApiError::Forbidden);

    let admin = seed_admin(&state, "boss@example.com").await;
    handlers::add_publisher(
        admin,
        State(state.clone()),
        Json(AddPublisherRequest {
            name: "Daily Planet".to_string(),
            logo: "dp.png".to_string(),
        }),
    )
    .await
    .unwrap();

    let listed = handlers::list_publishers(State(state)).await;
    assert_eq!(listed.0.len(), 1);
    assert_eq!(listed.0[0].name, "Daily Planet");
}

// --- Payments ---

#[tokio::test]
async fn payment_intent_converts_dollars_to_cents() {
    let state = test_state();
    let response = handlers::create_payment_intent(
        State(state),
        Json(PaymentIntentRequest { price: 4.5 }),
    )
    .await
    .unwrap();
    // The mock embeds the cent amount it was asked for.
    assert_eq!(response.0.client_secret, "pi_mock_450_secret_test");
}

#[tokio::test]
async fn payment_gateway_failure_surfaces_as_internal() {
    let state = failing_payment_state();
    let result = handlers::create_payment_intent(
        State(state),
        Json(PaymentIntentRequest { price: 10.0 }),
    )
    .await;
    assert_eq!(result.unwrap_err(), ApiError::Internal);
}
