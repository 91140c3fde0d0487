use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enumerated Fields (validated at the store boundary) ---

/// Role
///
/// The RBAC field on a user record. Every account starts as `Regular`;
/// promotion to `Admin` is a privileged, irreversible operation (there is
/// no demotion path).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Regular,
    Admin,
}

/// ArticleStatus
///
/// Lifecycle status of an article. Submissions always start `Pending`.
/// The approve/decline operations carry no prior-state guard: any status
/// remains reachable from any other via the two privileged operations.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "article_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ArticleStatus {
    #[default]
    Pending,
    Approved,
    Declined,
}

/// ContentTier
///
/// Whether an article is freely readable (`Normal`) or gated behind
/// payment (`Premium`). Only an admin may promote the tier; no demotion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "content_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ContentTier {
    #[default]
    Normal,
    Premium,
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// A platform account from the `users` table. At most one record exists
/// per email; the repository enforces this on registration.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    // Unique across all users; the identity key carried in bearer tokens.
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub role: Role,
}

/// Article
///
/// A piece of content from the `articles` table. The view counter is
/// non-negative and only ever increases through the atomic increment
/// path; `decline_reason` is meaningful only while status is `Declined`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    // Soft reference to a publisher by name. Not validated against the
    // publishers table; unknown names are accepted silently.
    pub publisher: String,
    pub author_name: String,
    pub author_email: String,
    pub author_photo: Option<String>,
    pub tags: Vec<String>,
    #[ts(type = "string")]
    pub posted_date: DateTime<Utc>,
    pub view: i64,
    pub status: ArticleStatus,
    pub decline_reason: Option<String>,
    pub tier: ContentTier,
}

/// Publisher
///
/// A named content source (logo + name) from the `publishers` table.
/// Created only by an admin, otherwise immutable, publicly listable.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Publisher {
    pub id: Uuid,
    pub name: String,
    pub logo: String,
}

// --- Request Payloads (Input Schemas) ---

/// TokenRequest
///
/// Input for the token issuance endpoint (POST /jwt). Carries the claims
/// to sign; the subject email is the only claim the core relies on.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenRequest {
    pub email: String,
}

/// TokenResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// RegisterUserRequest
///
/// Input payload for idempotent registration (POST /users). The role is
/// not accepted from callers; every new account starts as `Regular`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: String,
    pub photo_url: Option<String>,
}

/// RegisterOutcome
///
/// Result of a registration attempt. A duplicate email is not an error:
/// `created` is false and no identifier is returned.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterOutcome {
    pub created: bool,
    pub inserted_id: Option<Uuid>,
}

/// UpdateProfileRequest
///
/// Replaces exactly the name and photo fields of a user record. Both
/// fields are written with whatever is supplied, so a caller omitting
/// `photo_url` clears the stored value. Known footgun, preserved:
/// callers must send both fields to avoid clearing one inadvertently.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub photo_url: Option<String>,
}

/// AdminCheckResponse
///
/// Output of the self-service "am I admin" query.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AdminCheckResponse {
    pub admin: bool,
}

/// ArticleFilter
///
/// Optional search criteria for the public article listing. Each present
/// filter is ANDed; `title` is a case-insensitive substring match; absent
/// filters impose no constraint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, utoipa::IntoParams, Default)]
#[ts(export)]
pub struct ArticleFilter {
    pub publisher: Option<String>,
    pub tag: Option<String>,
    pub title: Option<String>,
    /// Matches the article's author email exactly.
    pub email: Option<String>,
}

/// SubmitArticleRequest
///
/// Input payload for article submission (POST /articles). Status and tier
/// are deliberately absent: the store applies the `Pending`/`Normal`
/// defaults server-side, so a submission cannot smuggle a moderation
/// decision past the admin gate.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SubmitArticleRequest {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub publisher: String,
    pub author_name: String,
    pub author_email: String,
    pub author_photo: Option<String>,
    pub tags: Vec<String>,
    #[ts(type = "string")]
    pub posted_date: DateTime<Utc>,
}

/// SubmitOutcome
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SubmitOutcome {
    pub inserted_id: Uuid,
}

/// UpdateArticleRequest
///
/// Full-field replace of an article's editable attributes
/// (PATCH /article/update/{id}). Status and tier are not part of the
/// writable set; the moderation endpoints remain the only way to change
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateArticleRequest {
    pub title: String,
    pub image: Option<String>,
    pub publisher: String,
    pub description: String,
    pub view: i64,
    pub author_name: String,
    pub author_email: String,
    pub author_photo: Option<String>,
    #[ts(type = "string")]
    pub posted_date: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// DeclineRequest
///
/// Carries the reason recorded alongside a declined status.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DeclineRequest {
    pub decline_reason: String,
}

/// AddPublisherRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AddPublisherRequest {
    pub name: String,
    pub logo: String,
}

/// PaymentIntentRequest
///
/// Price in dollars; converted to integer cents by truncation before the
/// gateway call, matching the platform's billing convention.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PaymentIntentRequest {
    pub price: f64,
}

/// PaymentIntentResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

// --- Operation Reports & Paged Listings (Output) ---

/// UpdateReport
///
/// Outcome of a single-document update. Zero modified documents is a
/// success (the target did not exist), not an error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateReport {
    pub modified_count: u64,
}

/// DeleteReport
///
/// Outcome of a delete. Deleting a nonexistent id reports zero documents
/// affected rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DeleteReport {
    pub deleted_count: u64,
}

/// UserPage
///
/// One bounded slice of the user collection plus the full collection
/// count. The count is read independently from the page fetch, so the two
/// can disagree under concurrent writes; this is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserPage {
    pub total: i64,
    pub items: Vec<User>,
}

/// ArticlePage
///
/// Same semantics and the same total/items consistency caveat as
/// [`UserPage`].
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ArticlePage {
    pub total: i64,
    pub items: Vec<Article>,
}
