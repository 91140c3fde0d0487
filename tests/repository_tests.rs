use chrono::Utc;
use news_desk::{
    models::{
        ArticleFilter, ArticleStatus, ContentTier, RegisterUserRequest, Role,
        SubmitArticleRequest, UpdateArticleRequest, UpdateProfileRequest,
    },
    repository::{MemoryRepository, Repository, paginate},
};
use std::sync::Arc;
use uuid::Uuid;

// --- Test Utilities ---

fn user_req(email: &str) -> RegisterUserRequest {
    RegisterUserRequest {
        email: email.to_string(),
        name: "Test User".to_string(),
        photo_url: Some("https://example.com/avatar.png".to_string()),
    }
}

fn article_req(title: &str, publisher: &str, tag: &str, author_email: &str) -> SubmitArticleRequest {
    SubmitArticleRequest {
        title: title.to_string(),
        description: "body".to_string(),
        image: None,
        publisher: publisher.to_string(),
        author_name: "Author".to_string(),
        author_email: author_email.to_string(),
        author_photo: None,
        tags: vec![tag.to_string()],
        posted_date: Utc::now(),
    }
}

// --- Pagination Engine ---

#[test]
fn paginate_computes_skip_and_take() {
    assert_eq!(paginate(1, 10), (0, 10));
    assert_eq!(paginate(2, 10), (10, 10));
    assert_eq!(paginate(5, 3), (12, 3));
}

// --- User Directory ---

#[tokio::test]
async fn register_is_idempotent_by_email() {
    let repo = MemoryRepository::new();

    let first = repo.register_user(user_req("dup@example.com")).await;
    assert!(first.is_some());

    // Second registration with the same email is a no-op, not an error.
    let second = repo.register_user(user_req("dup@example.com")).await;
    assert!(second.is_none());

    assert_eq!(repo.all_users().await.len(), 1);
}

#[tokio::test]
async fn new_users_start_as_regular_and_promotion_sticks() {
    let repo = MemoryRepository::new();
    let id = repo.register_user(user_req("a@example.com")).await.unwrap();

    let user = repo.get_user_by_email("a@example.com").await.unwrap();
    assert_eq!(user.role, Role::Regular);

    let report = repo.promote_user(id).await;
    assert_eq!(report.modified_count, 1);
    let user = repo.get_user_by_email("a@example.com").await.unwrap();
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn promote_unknown_user_modifies_nothing() {
    let repo = MemoryRepository::new();
    let report = repo.promote_user(Uuid::new_v4()).await;
    assert_eq!(report.modified_count, 0);
}

#[tokio::test]
async fn users_paged_returns_slice_and_full_total() {
    let repo = MemoryRepository::new();
    for i in 0..25 {
        repo.register_user(user_req(&format!("user{}@example.com", i)))
            .await
            .unwrap();
    }

    // Page 2 with limit 10 is items 11-20 in store order.
    let page = repo.users_paged(2, 10).await;
    assert_eq!(page.total, 25);
    assert_eq!(page.items.len(), 10);
    assert_eq!(page.items[0].email, "user10@example.com");
    assert_eq!(page.items[9].email, "user19@example.com");

    // Total equals the full collection count regardless of page.
    let last = repo.users_paged(3, 10).await;
    assert_eq!(last.total, 25);
    assert_eq!(last.items.len(), 5);
}

#[tokio::test]
async fn update_profile_replaces_both_fields_exactly() {
    let repo = MemoryRepository::new();
    repo.register_user(user_req("edit@example.com")).await;

    let report = repo
        .update_profile(
            "edit@example.com",
            UpdateProfileRequest {
                name: "Renamed".to_string(),
                // Omitting the photo clears the stored value: the known
                // footgun is preserved, not fixed.
                photo_url: None,
            },
        )
        .await;
    assert_eq!(report.modified_count, 1);

    let user = repo.get_user_by_email("edit@example.com").await.unwrap();
    assert_eq!(user.name, "Renamed");
    assert_eq!(user.photo_url, None);
}

// --- Article Store ---

#[tokio::test]
async fn submissions_default_to_pending_normal_zero_views() {
    let repo = MemoryRepository::new();
    let id = repo
        .submit_article(article_req("Hello", "Daily", "tech", "a@x.com"))
        .await;

    let article = repo.get_article(id).await.unwrap();
    assert_eq!(article.status, ArticleStatus::Pending);
    assert_eq!(article.tier, ContentTier::Normal);
    assert_eq!(article.view, 0);
    assert_eq!(article.decline_reason, None);
}

#[tokio::test]
async fn search_without_filters_returns_everything() {
    let repo = MemoryRepository::new();
    repo.submit_article(article_req("One", "Daily", "tech", "a@x.com"))
        .await;
    repo.submit_article(article_req("Two", "Weekly", "art", "b@x.com"))
        .await;

    let all = repo.search_articles(ArticleFilter::default()).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn search_filters_are_conjunctive() {
    let repo = MemoryRepository::new();
    repo.submit_article(article_req("Breaking News", "Daily", "tech", "a@x.com"))
        .await;
    repo.submit_article(article_req("Breaking Records", "Daily", "sport", "a@x.com"))
        .await;
    repo.submit_article(article_req("Breaking News", "Weekly", "tech", "b@x.com"))
        .await;

    let hits = repo
        .search_articles(ArticleFilter {
            publisher: Some("Daily".to_string()),
            tag: Some("tech".to_string()),
            title: Some("breaking".to_string()),
            email: Some("a@x.com".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Breaking News");
    assert_eq!(hits[0].publisher, "Daily");
}

#[tokio::test]
async fn title_filter_is_case_insensitive_substring() {
    let repo = MemoryRepository::new();
    repo.submit_article(article_req("Breaking News", "Daily", "tech", "a@x.com"))
        .await;

    let hits = repo
        .search_articles(ArticleFilter {
            title: Some("new".to_string()),
            ..ArticleFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);

    let miss = repo
        .search_articles(ArticleFilter {
            title: Some("sports".to_string()),
            ..ArticleFilter::default()
        })
        .await
        .unwrap();
    assert!(miss.is_empty());
}

#[tokio::test]
async fn top_viewed_orders_by_views_descending() {
    let repo = MemoryRepository::new();
    let low = repo
        .submit_article(article_req("Low", "D", "t", "a@x.com"))
        .await;
    let high = repo
        .submit_article(article_req("High", "D", "t", "a@x.com"))
        .await;
    let mid = repo
        .submit_article(article_req("Mid", "D", "t", "a@x.com"))
        .await;

    for _ in 0..5 {
        repo.increment_view(high).await;
    }
    for _ in 0..2 {
        repo.increment_view(mid).await;
    }
    repo.increment_view(low).await;

    let top = repo.top_viewed(2).await;
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].title, "High");
    assert_eq!(top[1].title, "Mid");
}

#[tokio::test]
async fn increment_view_returns_post_increment_document() {
    let repo = MemoryRepository::new();
    let id = repo
        .submit_article(article_req("Counted", "D", "t", "a@x.com"))
        .await;

    let article = repo.increment_view(id).await.unwrap();
    assert_eq!(article.view, 1);
    let article = repo.increment_view(id).await.unwrap();
    assert_eq!(article.view, 2);

    assert!(repo.increment_view(Uuid::new_v4()).await.is_none());
}

#[tokio::test]
async fn concurrent_increments_lose_no_updates() {
    let repo = Arc::new(MemoryRepository::new());
    let id = repo
        .submit_article(article_req("Hot", "D", "t", "a@x.com"))
        .await;

    let mut handles = Vec::new();
    for _ in 0..50 {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.increment_view(id).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Exactly N net increments for N concurrent calls.
    assert_eq!(repo.get_article(id).await.unwrap().view, 50);
}

#[tokio::test]
async fn status_transitions_have_no_prior_state_guard() {
    let repo = MemoryRepository::new();
    let id = repo
        .submit_article(article_req("Contested", "D", "t", "a@x.com"))
        .await;

    repo.set_status(id, ArticleStatus::Declined, Some("too short".to_string()))
        .await;
    let article = repo.get_article(id).await.unwrap();
    assert_eq!(article.status, ArticleStatus::Declined);
    assert_eq!(article.decline_reason.as_deref(), Some("too short"));

    // Declined -> approved must succeed; no transition graph is enforced.
    let report = repo.set_status(id, ArticleStatus::Approved, None).await;
    assert_eq!(report.modified_count, 1);
    let article = repo.get_article(id).await.unwrap();
    assert_eq!(article.status, ArticleStatus::Approved);
    // Approving only touches the status; the stale reason stays behind.
    assert_eq!(article.decline_reason.as_deref(), Some("too short"));
}

#[tokio::test]
async fn premium_promotion_sets_tier() {
    let repo = MemoryRepository::new();
    let id = repo
        .submit_article(article_req("Gated", "D", "t", "a@x.com"))
        .await;

    let report = repo.set_premium(id).await;
    assert_eq!(report.modified_count, 1);
    assert_eq!(
        repo.get_article(id).await.unwrap().tier,
        ContentTier::Premium
    );
}

#[tokio::test]
async fn full_replace_cannot_touch_status_or_tier() {
    let repo = MemoryRepository::new();
    let id = repo
        .submit_article(article_req("Original", "Daily", "tech", "a@x.com"))
        .await;
    repo.set_status(id, ArticleStatus::Approved, None).await;

    let report = repo
        .update_article(
            id,
            UpdateArticleRequest {
                title: "Rewritten".to_string(),
                image: Some("new.png".to_string()),
                publisher: "Weekly".to_string(),
                description: "updated body".to_string(),
                view: 9,
                author_name: "Editor".to_string(),
                author_email: "e@x.com".to_string(),
                author_photo: None,
                posted_date: Utc::now(),
                tags: vec!["politics".to_string()],
            },
        )
        .await;
    assert_eq!(report.modified_count, 1);

    let article = repo.get_article(id).await.unwrap();
    assert_eq!(article.title, "Rewritten");
    assert_eq!(article.view, 9);
    // The moderation fields survive a full replace untouched.
    assert_eq!(article.status, ArticleStatus::Approved);
    assert_eq!(article.tier, ContentTier::Normal);
}

#[tokio::test]
async fn articles_paged_matches_user_paging_semantics() {
    let repo = MemoryRepository::new();
    for i in 0..12 {
        repo.submit_article(article_req(&format!("A{}", i), "D", "t", "a@x.com"))
            .await;
    }

    let page = repo.articles_paged(2, 5).await;
    assert_eq!(page.total, 12);
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.items[0].title, "A5");
}

#[tokio::test]
async fn delete_missing_article_reports_zero_affected() {
    let repo = MemoryRepository::new();
    let report = repo.delete_article(Uuid::new_v4()).await;
    assert_eq!(report.deleted_count, 0);
}

#[tokio::test]
async fn delete_existing_article_removes_it() {
    let repo = MemoryRepository::new();
    let id = repo
        .submit_article(article_req("Gone", "D", "t", "a@x.com"))
        .await;

    let report = repo.delete_article(id).await;
    assert_eq!(report.deleted_count, 1);
    assert!(repo.get_article(id).await.is_none());
}

// --- Publisher Directory ---

#[tokio::test]
async fn publishers_are_listable_after_creation() {
    let repo = MemoryRepository::new();
    repo.add_publisher(news_desk::models::AddPublisherRequest {
        name: "Daily Planet".to_string(),
        logo: "dp.png".to_string(),
    })
    .await;

    let publishers = repo.list_publishers().await;
    assert_eq!(publishers.len(), 1);
    assert_eq!(publishers[0].name, "Daily Planet");
}

#[tokio::test]
async fn articles_accept_unknown_publisher_names() {
    // The publisher reference is soft: nothing validates it.
    let repo = MemoryRepository::new();
    let id = repo
        .submit_article(article_req("Orphan", "No Such Publisher", "t", "a@x.com"))
        .await;
    assert_eq!(
        repo.get_article(id).await.unwrap().publisher,
        "No Such Publisher"
    );
}
