use crate::models::{
    AddPublisherRequest, Article, ArticleFilter, ArticlePage, ArticleStatus, ContentTier,
    DeleteReport, Publisher, RegisterUserRequest, Role, SubmitArticleRequest, UpdateArticleRequest,
    UpdateProfileRequest, UpdateReport, User, UserPage,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// paginate
///
/// The shared pagination rule: a 1-indexed page and a limit become a
/// (skip, take) pair with `skip = (page - 1) * limit`. The function does
/// not validate its inputs; callers must supply positive integers, and
/// zero or negative values produce undefined slices. The accompanying
/// `total` is always a full, independent collection count so pagination
/// UIs can compute page counts.
pub fn paginate(page: i64, limit: i64) -> (i64, i64) {
    ((page - 1) * limit, limit)
}

/// Repository
///
/// The abstract contract for all persistence operations, shared as
/// `Arc<dyn Repository>` across axum's task boundaries. Handlers talk to
/// this trait only, which lets the Postgres implementation and the
/// in-memory one swap freely (tests run entirely against the latter).
#[async_trait]
pub trait Repository: Send + Sync {
    // --- User Directory ---

    /// Idempotent by email: returns the new id, or None when a user with
    /// this email already exists. A duplicate is a no-op, never an error.
    async fn register_user(&self, req: RegisterUserRequest) -> Option<Uuid>;
    /// Unrestricted, unpaginated listing for small summary views.
    async fn all_users(&self) -> Vec<User>;
    /// Paged listing in store-native order. `total` and `items` are read
    /// independently and may disagree under concurrent writes.
    async fn users_paged(&self, page: i64, limit: i64) -> UserPage;
    async fn get_user_by_email(&self, email: &str) -> Option<User>;
    /// Replaces exactly the name and photo fields with what is supplied,
    /// including an absent photo (which clears the stored value).
    async fn update_profile(&self, email: &str, req: UpdateProfileRequest) -> UpdateReport;
    /// Sets the role to Admin. There is no demotion operation.
    async fn promote_user(&self, id: Uuid) -> UpdateReport;

    // --- Article Store ---

    /// Conjunctive filtered search; title matches case-insensitively as a
    /// substring; no pagination. A store failure surfaces as Err here and
    /// becomes a 500 at the handler.
    async fn search_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>, String>;
    /// Ordered by view count descending, ties in store-native order.
    async fn top_viewed(&self, limit: i64) -> Vec<Article>;
    async fn articles_paged(&self, page: i64, limit: i64) -> ArticlePage;
    async fn get_article(&self, id: Uuid) -> Option<Article>;
    /// Inserts with the server-enforced defaults: status Pending, tier
    /// Normal, view 0.
    async fn submit_article(&self, req: SubmitArticleRequest) -> Uuid;
    /// Atomically increments the view count by 1 and returns the
    /// post-increment document. The increment and the fetch are one
    /// indivisible store operation, so N concurrent calls on the same id
    /// net exactly N increments.
    async fn increment_view(&self, id: Uuid) -> Option<Article>;
    /// Full-field replace of the editable attributes. Status and tier are
    /// not in the writable set.
    async fn update_article(&self, id: Uuid, req: UpdateArticleRequest) -> UpdateReport;
    /// Sets the lifecycle status with no prior-state guard: any elevated
    /// caller may set any status at any time. A decline reason is written
    /// only when supplied; approving leaves a stale reason in place.
    async fn set_status(
        &self,
        id: Uuid,
        status: ArticleStatus,
        decline_reason: Option<String>,
    ) -> UpdateReport;
    /// Promotes the content tier to Premium. No demotion operation.
    async fn set_premium(&self, id: Uuid) -> UpdateReport;
    /// Deletes by id. A missing id reports zero documents affected.
    async fn delete_article(&self, id: Uuid) -> DeleteReport;

    // --- Publisher Directory ---

    async fn add_publisher(&self, req: AddPublisherRequest) -> Uuid;
    async fn list_publishers(&self) -> Vec<Publisher>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

// Column list reused by every article query that returns full documents.
const ARTICLE_COLUMNS: &str = "id, title, description, image, publisher, author_name, \
     author_email, author_photo, tags, posted_date, view, status, decline_reason, tier";

/// PostgresRepository
///
/// The production implementation, backed by a PgPool opened once at
/// startup and injected into the application state. Queries are
/// runtime-checked so the crate builds without a live database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// register_user
    ///
    /// `ON CONFLICT (email) DO NOTHING RETURNING id` makes the insert
    /// idempotent in a single statement: a duplicate returns no row, which
    /// maps to None without a separate existence read.
    async fn register_user(&self, req: RegisterUserRequest) -> Option<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query_scalar::<_, Uuid>(
            "INSERT INTO users (id, email, name, photo_url, role) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email) DO NOTHING RETURNING id",
        )
        .bind(id)
        .bind(&req.email)
        .bind(&req.name)
        .bind(&req.photo_url)
        .bind(Role::Regular)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("register_user error: {:?}", e);
            None
        })
    }

    async fn all_users(&self) -> Vec<User> {
        match sqlx::query_as::<_, User>("SELECT id, email, name, photo_url, role FROM users")
            .fetch_all(&self.pool)
            .await
        {
            Ok(users) => users,
            Err(e) => {
                tracing::error!("all_users error: {:?}", e);
                vec![]
            }
        }
    }

    /// users_paged
    ///
    /// No ORDER BY on purpose: the slice comes back in store-native order,
    /// which is insertion-order-ish and not guaranteed stable across
    /// concurrent writes. The count runs as its own query.
    async fn users_paged(&self, page: i64, limit: i64) -> UserPage {
        let (skip, take) = paginate(page, limit);
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let items = sqlx::query_as::<_, User>(
            "SELECT id, email, name, photo_url, role FROM users OFFSET $1 LIMIT $2",
        )
        .bind(skip)
        .bind(take)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("users_paged error: {:?}", e);
            vec![]
        });
        UserPage { total, items }
    }

    async fn get_user_by_email(&self, email: &str) -> Option<User> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, name, photo_url, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user_by_email error: {:?}", e);
            None
        })
    }

    /// update_profile
    ///
    /// Writes both columns unconditionally with whatever was supplied; an
    /// absent photo therefore clears the stored value.
    async fn update_profile(&self, email: &str, req: UpdateProfileRequest) -> UpdateReport {
        match sqlx::query("UPDATE users SET name = $2, photo_url = $3 WHERE email = $1")
            .bind(email)
            .bind(&req.name)
            .bind(&req.photo_url)
            .execute(&self.pool)
            .await
        {
            Ok(res) => UpdateReport {
                modified_count: res.rows_affected(),
            },
            Err(e) => {
                tracing::error!("update_profile error: {:?}", e);
                UpdateReport { modified_count: 0 }
            }
        }
    }

    async fn promote_user(&self, id: Uuid) -> UpdateReport {
        match sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(Role::Admin)
            .execute(&self.pool)
            .await
        {
            Ok(res) => UpdateReport {
                modified_count: res.rows_affected(),
            },
            Err(e) => {
                tracing::error!("promote_user error: {:?}", e);
                UpdateReport { modified_count: 0 }
            }
        }
    }

    /// search_articles
    ///
    /// Builds the WHERE clause dynamically with QueryBuilder so every
    /// present filter is a bound parameter (no SQL injection surface).
    /// `ILIKE` gives the case-insensitive substring match on title.
    async fn search_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>, String> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE true"
        ));

        if let Some(publisher) = filter.publisher {
            builder.push(" AND publisher = ");
            builder.push_bind(publisher);
        }
        if let Some(tag) = filter.tag {
            builder.push(" AND ");
            builder.push_bind(tag);
            builder.push(" = ANY(tags)");
        }
        if let Some(title) = filter.title {
            builder.push(" AND title ILIKE ");
            builder.push_bind(format!("%{}%", title));
        }
        if let Some(email) = filter.email {
            builder.push(" AND author_email = ");
            builder.push_bind(email);
        }

        builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("search_articles error: {:?}", e);
                e.to_string()
            })
    }

    async fn top_viewed(&self, limit: i64) -> Vec<Article> {
        match sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY view DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        {
            Ok(articles) => articles,
            Err(e) => {
                tracing::error!("top_viewed error: {:?}", e);
                vec![]
            }
        }
    }

    async fn articles_paged(&self, page: i64, limit: i64) -> ArticlePage {
        let (skip, take) = paginate(page, limit);
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .unwrap_or(0);
        let items = sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles OFFSET $1 LIMIT $2"
        ))
        .bind(skip)
        .bind(take)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("articles_paged error: {:?}", e);
            vec![]
        });
        ArticlePage { total, items }
    }

    async fn get_article(&self, id: Uuid) -> Option<Article> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_article error: {:?}", e);
            None
        })
    }

    /// submit_article
    ///
    /// The lifecycle defaults are applied here, not trusted from the
    /// caller: every submission lands as Pending/Normal with zero views.
    async fn submit_article(&self, req: SubmitArticleRequest) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO articles \
             (id, title, description, image, publisher, author_name, author_email, \
              author_photo, tags, posted_date, view, status, decline_reason, tier) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, $11, NULL, $12)",
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&req.image)
        .bind(&req.publisher)
        .bind(&req.author_name)
        .bind(&req.author_email)
        .bind(&req.author_photo)
        .bind(&req.tags)
        .bind(req.posted_date)
        .bind(ArticleStatus::Pending)
        .bind(ContentTier::Normal)
        .execute(&self.pool)
        .await
        .expect("Failed to insert article");
        id
    }

    /// increment_view
    ///
    /// One statement does the read-modify-write and the fetch: this is the
    /// single place where a split read-then-write would lose updates under
    /// concurrent page views.
    async fn increment_view(&self, id: Uuid) -> Option<Article> {
        sqlx::query_as::<_, Article>(&format!(
            "UPDATE articles SET view = view + 1 WHERE id = $1 RETURNING {ARTICLE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("increment_view error: {:?}", e);
            None
        })
    }

    async fn update_article(&self, id: Uuid, req: UpdateArticleRequest) -> UpdateReport {
        match sqlx::query(
            "UPDATE articles SET title = $2, image = $3, publisher = $4, description = $5, \
             view = $6, author_name = $7, author_email = $8, author_photo = $9, \
             posted_date = $10, tags = $11 WHERE id = $1",
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.image)
        .bind(&req.publisher)
        .bind(&req.description)
        .bind(req.view)
        .bind(&req.author_name)
        .bind(&req.author_email)
        .bind(&req.author_photo)
        .bind(req.posted_date)
        .bind(&req.tags)
        .execute(&self.pool)
        .await
        {
            Ok(res) => UpdateReport {
                modified_count: res.rows_affected(),
            },
            Err(e) => {
                tracing::error!("update_article error: {:?}", e);
                UpdateReport { modified_count: 0 }
            }
        }
    }

    /// set_status
    ///
    /// A decline writes the reason alongside the status; an approve only
    /// touches the status column, leaving any earlier decline reason in
    /// place (it is meaningful only while status is Declined).
    async fn set_status(
        &self,
        id: Uuid,
        status: ArticleStatus,
        decline_reason: Option<String>,
    ) -> UpdateReport {
        let result = match decline_reason {
            Some(reason) => {
                sqlx::query("UPDATE articles SET status = $2, decline_reason = $3 WHERE id = $1")
                    .bind(id)
                    .bind(status)
                    .bind(reason)
                    .execute(&self.pool)
                    .await
            }
            None => {
                sqlx::query("UPDATE articles SET status = $2 WHERE id = $1")
                    .bind(id)
                    .bind(status)
                    .execute(&self.pool)
                    .await
            }
        };
        match result {
            Ok(res) => UpdateReport {
                modified_count: res.rows_affected(),
            },
            Err(e) => {
                tracing::error!("set_status error: {:?}", e);
                UpdateReport { modified_count: 0 }
            }
        }
    }

    async fn set_premium(&self, id: Uuid) -> UpdateReport {
        match sqlx::query("UPDATE articles SET tier = $2 WHERE id = $1")
            .bind(id)
            .bind(ContentTier::Premium)
            .execute(&self.pool)
            .await
        {
            Ok(res) => UpdateReport {
                modified_count: res.rows_affected(),
            },
            Err(e) => {
                tracing::error!("set_premium error: {:?}", e);
                UpdateReport { modified_count: 0 }
            }
        }
    }

    async fn delete_article(&self, id: Uuid) -> DeleteReport {
        match sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(res) => DeleteReport {
                deleted_count: res.rows_affected(),
            },
            Err(e) => {
                tracing::error!("delete_article error: {:?}", e);
                DeleteReport { deleted_count: 0 }
            }
        }
    }

    async fn add_publisher(&self, req: AddPublisherRequest) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO publishers (id, name, logo) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(&req.name)
            .bind(&req.logo)
            .execute(&self.pool)
            .await
            .expect("Failed to insert publisher");
        id
    }

    async fn list_publishers(&self) -> Vec<Publisher> {
        match sqlx::query_as::<_, Publisher>("SELECT id, name, logo FROM publishers")
            .fetch_all(&self.pool)
            .await
        {
            Ok(publishers) => publishers,
            Err(e) => {
                tracing::error!("list_publishers error: {:?}", e);
                vec![]
            }
        }
    }
}

// --- In-memory implementation ---

#[derive(Default)]
struct MemoryInner {
    users: Vec<User>,
    articles: Vec<Article>,
    publishers: Vec<Publisher>,
}

/// MemoryRepository
///
/// A full in-process implementation of the `Repository` contract, used by
/// the test suite and local demos. The single mutex gives the same
/// per-operation atomicity the store provides: every method is one
/// critical section, so concurrent view increments cannot lose updates.
#[derive(Default)]
pub struct MemoryRepository {
    inner: Mutex<MemoryInner>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn register_user(&self, req: RegisterUserRequest) -> Option<Uuid> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == req.email) {
            return None;
        }
        let id = Uuid::new_v4();
        inner.users.push(User {
            id,
            email: req.email,
            name: req.name,
            photo_url: req.photo_url,
            role: Role::Regular,
        });
        Some(id)
    }

    async fn all_users(&self) -> Vec<User> {
        self.inner.lock().unwrap().users.clone()
    }

    async fn users_paged(&self, page: i64, limit: i64) -> UserPage {
        let inner = self.inner.lock().unwrap();
        let (skip, take) = paginate(page, limit);
        let items = inner
            .users
            .iter()
            .skip(skip as usize)
            .take(take as usize)
            .cloned()
            .collect();
        UserPage {
            total: inner.users.len() as i64,
            items,
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Option<User> {
        self.inner
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    async fn update_profile(&self, email: &str, req: UpdateProfileRequest) -> UpdateReport {
        let mut inner = self.inner.lock().unwrap();
        match inner.users.iter_mut().find(|u| u.email == email) {
            Some(user) => {
                user.name = req.name;
                // Whatever was supplied is written, including None.
                user.photo_url = req.photo_url;
                UpdateReport { modified_count: 1 }
            }
            None => UpdateReport { modified_count: 0 },
        }
    }

    async fn promote_user(&self, id: Uuid) -> UpdateReport {
        let mut inner = self.inner.lock().unwrap();
        match inner.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = Role::Admin;
                UpdateReport { modified_count: 1 }
            }
            None => UpdateReport { modified_count: 0 },
        }
    }

    async fn search_articles(&self, filter: ArticleFilter) -> Result<Vec<Article>, String> {
        let inner = self.inner.lock().unwrap();
        let title_needle = filter.title.as_ref().map(|t| t.to_lowercase());
        let matches = inner
            .articles
            .iter()
            .filter(|a| {
                filter
                    .publisher
                    .as_ref()
                    .is_none_or(|p| &a.publisher == p)
                    && filter.tag.as_ref().is_none_or(|t| a.tags.contains(t))
                    && title_needle
                        .as_ref()
                        .is_none_or(|t| a.title.to_lowercase().contains(t))
                    && filter.email.as_ref().is_none_or(|e| &a.author_email == e)
            })
            .cloned()
            .collect();
        Ok(matches)
    }

    async fn top_viewed(&self, limit: i64) -> Vec<Article> {
        let inner = self.inner.lock().unwrap();
        let mut articles = inner.articles.clone();
        // Stable sort: ties keep store-native (insertion) order.
        articles.sort_by(|a, b| b.view.cmp(&a.view));
        articles.truncate(limit.max(0) as usize);
        articles
    }

    async fn articles_paged(&self, page: i64, limit: i64) -> ArticlePage {
        let inner = self.inner.lock().unwrap();
        let (skip, take) = paginate(page, limit);
        let items = inner
            .articles
            .iter()
            .skip(skip as usize)
            .take(take as usize)
            .cloned()
            .collect();
        ArticlePage {
            total: inner.articles.len() as i64,
            items,
        }
    }

    async fn get_article(&self, id: Uuid) -> Option<Article> {
        self.inner
            .lock()
            .unwrap()
            .articles
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    async fn submit_article(&self, req: SubmitArticleRequest) -> Uuid {
        let mut inner = self.inner.lock().unwrap();
        let id = Uuid::new_v4();
        inner.articles.push(Article {
            id,
            title: req.title,
            description: req.description,
            image: req.image,
            publisher: req.publisher,
            author_name: req.author_name,
            author_email: req.author_email,
            author_photo: req.author_photo,
            tags: req.tags,
            posted_date: req.posted_date,
            view: 0,
            status: ArticleStatus::Pending,
            decline_reason: None,
            tier: ContentTier::Normal,
        });
        id
    }

    async fn increment_view(&self, id: Uuid) -> Option<Article> {
        let mut inner = self.inner.lock().unwrap();
        inner.articles.iter_mut().find(|a| a.id == id).map(|a| {
            a.view += 1;
            a.clone()
        })
    }

    async fn update_article(&self, id: Uuid, req: UpdateArticleRequest) -> UpdateReport {
        let mut inner = self.inner.lock().unwrap();
        match inner.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                article.title = req.title;
                article.image = req.image;
                article.publisher = req.publisher;
                article.description = req.description;
                article.view = req.view;
                article.author_name = req.author_name;
                article.author_email = req.author_email;
                article.author_photo = req.author_photo;
                article.posted_date = req.posted_date;
                article.tags = req.tags;
                UpdateReport { modified_count: 1 }
            }
            None => UpdateReport { modified_count: 0 },
        }
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: ArticleStatus,
        decline_reason: Option<String>,
    ) -> UpdateReport {
        let mut inner = self.inner.lock().unwrap();
        match inner.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                article.status = status;
                if let Some(reason) = decline_reason {
                    article.decline_reason = Some(reason);
                }
                UpdateReport { modified_count: 1 }
            }
            None => UpdateReport { modified_count: 0 },
        }
    }

    async fn set_premium(&self, id: Uuid) -> UpdateReport {
        let mut inner = self.inner.lock().unwrap();
        match inner.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                article.tier = ContentTier::Premium;
                UpdateReport { modified_count: 1 }
            }
            None => UpdateReport { modified_count: 0 },
        }
    }

    async fn delete_article(&self, id: Uuid) -> DeleteReport {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.articles.len();
        inner.articles.retain(|a| a.id != id);
        DeleteReport {
            deleted_count: (before - inner.articles.len()) as u64,
        }
    }

    async fn add_publisher(&self, req: AddPublisherRequest) -> Uuid {
        let mut inner = self.inner.lock().unwrap();
        let id = Uuid::new_v4();
        inner.publishers.push(Publisher {
            id,
            name: req.name,
            logo: req.logo,
        });
        id
    }

    async fn list_publishers(&self) -> Vec<Publisher> {
        self.inner.lock().unwrap().publishers.clone()
    }
}
