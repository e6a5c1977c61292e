use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppResult,
    repository::RepositoryState,
};

/// Sessions expire a day after login.
const SESSION_TTL_SECS: i64 = 60 * 60 * 24;

/// Claims
///
/// The payload structure carried inside a session token. The claims are
/// signed with the server's session secret and validated on every
/// session-bound request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the UUID of the user, used to fetch the account from
    /// the `users` table on each request.
    pub sub: Uuid,
    /// Expiration time (exp): timestamp after which the token must not be
    /// accepted. Keeps stolen or stale tokens from living forever.
    pub exp: usize,
    /// Issued at (iat).
    pub iat: usize,
}

// --- Credential Service ---

/// hash_password
///
/// Hashes a plaintext password with bcrypt at the default cost. The
/// plaintext is consumed here and never stored or logged.
pub fn hash_password(password: &str) -> AppResult<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// verify_password
///
/// Constant-cost verification of a plaintext candidate against a stored
/// bcrypt hash. A malformed stored hash verifies as false rather than
/// surfacing an error the client could distinguish.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

// --- Session Tokens ---

/// issue_token
///
/// Creates the signed session token returned to the client after a
/// successful login. This is the "establish a session" step: the token is
/// the session, there is no server-side session table.
pub fn issue_token(user_id: Uuid, secret: &str) -> AppResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + SESSION_TTL_SECS) as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

/// decode_token
///
/// Validates the signature and expiry of a presented session token and
/// returns its claims.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &decoding_key, &validation)?;
    Ok(data.claims)
}

/// AuthUser Extractor Result
///
/// The resolved identity of a session-bound request: the account matched by
/// the presented session token, fetched fresh from the store so deleted
/// accounts lose access immediately.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any session-bound handler. This keeps session
/// resolution (extractor) cleanly separated from business logic (handler).
///
/// The process:
/// 1. Dependency resolution: Repository and AppConfig from the app state.
/// 2. Local bypass: development-time access via the 'x-user-id' header.
/// 3. Token validation: Bearer token extraction and signature/expiry check.
/// 4. Store lookup: fetching the user's current record.
///
/// Rejection: StatusCode::UNAUTHORIZED (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local development bypass: a known user id in the 'x-user-id' header
        // stands in for a real session. Guarded by the Env check so it can
        // never activate in production.
        if config.env == Env::Local {
            if let Some(user_id_header) = parts.headers.get("x-user-id") {
                if let Ok(id_str) = user_id_header.to_str() {
                    if let Ok(user_id) = Uuid::parse_str(id_str) {
                        // The id must still map to a real account so the role
                        // and email are loaded from the store, not invented.
                        if let Ok(Some(user)) = repo.find_user(user_id).await {
                            return Ok(AuthUser {
                                id: user.id,
                                username: user.username,
                                email: user.email,
                                role: user.role,
                            });
                        }
                    }
                }
            }
        }
        // Production, or the bypass did not apply: standard token flow.

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let claims = decode_token(token, &config.session_secret)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        // A valid token for a deleted account must not grant access.
        let user = repo
            .find_user(claims.sub)
            .await
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
        })
    }
}
