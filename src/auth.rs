use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::AppConfig, errors::ApiError, models::Role, repository::RepositoryState};

/// Fixed token lifetime: one day, matching the issuance contract.
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims
///
/// The payload signed into every bearer token. The subject email is the
/// only identity the core relies on; the role is deliberately NOT part of
/// the claims, because privilege is re-resolved from the store on every
/// privileged request (a promotion takes effect at the next such request
/// without reauthentication).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject email, the identity key into the user directory.
    pub email: String,
    /// Expiration time (seconds since epoch). Tokens past this are rejected.
    pub exp: usize,
    /// Issued-at time (seconds since epoch).
    pub iat: usize,
}

/// AuthUser
///
/// The verified identity of a request, produced by the extractor below.
/// Carries only what the token proves: the subject email.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
}

/// issue_token
///
/// Signs the supplied claims into a bearer token with a fixed 1-day
/// expiry. This is the collaborator half of the credential contract; it
/// holds no state beyond the shared signing secret.
pub fn issue_token(secret: &str, email: &str) -> Result<String, ApiError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        email: email.to_string(),
        iat: now as usize,
        exp: (now + TOKEN_TTL_SECS) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token issuance failed: {:?}", e);
        ApiError::Internal
    })
}

/// AuthUser Extractor Implementation
///
/// Implements axum's `FromRequestParts`, making `AuthUser` usable as a
/// handler argument on any protected route. Verification is pure: the
/// bearer token is checked against the service's signing secret and its
/// expiry, and the decoded email becomes the request identity. No store
/// access happens here.
///
/// Rejections: `MissingCredential` (401) when no Authorization header is
/// present, `InvalidCredential` (401) when the signature fails to verify
/// or the token is expired.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    // Allows the extractor to pull AppConfig (for the signing secret).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // Header extraction. A missing header is its own failure mode,
        // distinct from a malformed or forged token.
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::MissingCredential)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::InvalidCredential)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        // Expired signatures and malformed/forged tokens all collapse into
        // the same 401 outcome on the wire.
        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| ApiError::InvalidCredential)?;

        Ok(AuthUser {
            email: token_data.claims.email,
        })
    }
}

/// require_admin
///
/// The elevated-privilege gate. Looks up the user record matching the
/// verified identity's email and fails with `Forbidden` if no such user
/// exists or the role is not `Admin`.
///
/// Must only be invoked after the `AuthUser` extractor has succeeded for
/// the same request; it trusts that the identity is authentic. Privilege
/// is resolved from the store on every call rather than cached, so a role
/// change lands at the caller's next privileged request.
pub async fn require_admin(repo: &RepositoryState, identity: &AuthUser) -> Result<(), ApiError> {
    match repo.get_user_by_email(&identity.email).await {
        Some(user) if user.role == Role::Admin => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}
