use crate::{
    AppState,
    auth::{self, AuthUser},
    error::{AppError, AppResult},
    models::{Item, LoginRequest, RegisterRequest, User, Voucher},
};
use axum::{Json, extract::State, http::StatusCode};

/// Name of the response header carrying the session token after login.
pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

// --- Catalog Reader ---

/// list_items
///
/// [Public Route] Lists the full catalog in insertion order. An empty
/// catalog is a 200 with an empty array, not an error.
#[utoipa::path(
    get,
    path = "/items/",
    responses((status = 200, description = "All items", body = [Item]))
)]
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<Item>>> {
    let items = state.repo.list_items().await?;
    Ok(Json(items))
}

/// list_vouchers
///
/// [Public Route] Lists all discount vouchers in insertion order.
#[utoipa::path(
    get,
    path = "/vouchers/",
    responses((status = 200, description = "All vouchers", body = [Voucher]))
)]
pub async fn list_vouchers(State(state): State<AppState>) -> AppResult<Json<Vec<Voucher>>> {
    let vouchers = state.repo.list_vouchers().await?;
    Ok(Json(vouchers))
}

// --- Account Handler ---

/// login
///
/// [Public Route] Verifies a username/password pair and establishes a
/// session. On success the response body is the public user representation
/// and the signed session token is returned in the `x-session-token` header;
/// session-bound routes accept it as a Bearer token.
///
/// Both failure modes — unknown username and wrong password — produce the
/// identical 400 "Invalid credentials" response so the endpoint cannot be
/// used to probe which accounts exist.
#[utoipa::path(
    post,
    path = "/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = User),
        (status = 400, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<([(&'static str, String); 1], Json<User>)> {
    let row = state
        .repo
        .find_user_by_username(&payload.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !auth::verify_password(&payload.password, &row.password_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let token = auth::issue_token(row.id, &state.config.session_secret)?;
    tracing::info!(user_id = %row.id, "session established");

    Ok(([(SESSION_TOKEN_HEADER, token)], Json(row.into_user())))
}

/// register
///
/// [Public Route] Creates a new account with role 'Customer'. The payload is
/// validated before any business logic runs, the password is bcrypt-hashed
/// before it reaches the repository, and a duplicate username or email is a
/// 409 with no record created.
#[utoipa::path(
    post,
    path = "/register/",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username or email taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    payload.validate().map_err(AppError::Validation)?;

    let password_hash = auth::hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(&payload.username, &payload.email, &password_hash)
        .await?;

    tracing::info!(user_id = %user.id, "account created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// me
///
/// [Session-bound Route] Returns the account matched by the presented
/// session token. The identity is resolved entirely by the `AuthUser`
/// extractor; an invalid or missing token never reaches this body.
#[utoipa::path(
    get,
    path = "/me/",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "No valid session")
    )
)]
pub async fn me(
    AuthUser {
        id,
        username,
        email,
        role,
    }: AuthUser,
) -> Json<User> {
    Json(User {
        id,
        username,
        email,
        role,
    })
}
