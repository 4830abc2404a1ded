//! Authentication and session management endpoints

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::AppState;
use crate::domain::users;
use crate::services::cookies::{self, config::ACCESS_TOKEN_NAME, config::REFRESH_TOKEN_NAME};
use crate::services::error::LogErr;
use crate::services::password;
use crate::services::session;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_session))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(get_me))
        .route("/auth/password/forgot", post(forgot_password))
        .route("/auth/password/reset", post(reset_password))
}

// ============================================================================
// Auth Extractor - validates JWT cookie and extracts user_id
// ============================================================================

/// Extractor that validates the access_token cookie and returns the user_id
pub struct AuthUser(pub i64);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .log_500("Cookie extraction error")?;

        let access_token = jar
            .get(ACCESS_TOKEN_NAME)
            .map(|c| c.value())
            .ok_or(StatusCode::UNAUTHORIZED)?;

        // Expired tokens are routine; the client refreshes and retries
        let user_id = session::validate_access_token(access_token, &state.jwt_secret)
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser(user_id))
    }
}

/// Issue access and refresh cookies for a freshly authenticated user
async fn start_session(
    state: &AppState,
    user_id: i64,
    status: StatusCode,
    body: Option<MeResponse>,
) -> Result<Response, StatusCode> {
    let access_token = session::create_access_token(user_id, &state.jwt_secret)
        .log_500("Create access token error")?;
    let refresh_token = session::create_refresh_token(user_id, &state.db)
        .await
        .log_500("Create refresh token error")?;

    let mut response = match body {
        Some(me) => (status, Json(me)).into_response(),
        None => status.into_response(),
    };
    let settings = &state.config.cookies;
    response.headers_mut().append(
        SET_COOKIE,
        cookies::build_access_cookie(&access_token, settings)?,
    );
    response.headers_mut().append(
        SET_COOKIE,
        cookies::build_refresh_cookie(&refresh_token, settings)?,
    );

    Ok(response)
}

/// Argon2 is CPU-bound, so it runs off the async workers
async fn hash_blocking(password: String) -> Result<String, StatusCode> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .log_500("Password hashing task error")?
        .log_500("Password hashing error")
}

async fn verify_blocking(
    password: String,
    stored_hash: Option<String>,
) -> Result<bool, StatusCode> {
    tokio::task::spawn_blocking(move || {
        password::verify_or_decoy(&password, stored_hash.as_deref())
    })
    .await
    .log_500("Password verification task error")
}

// ============================================================================
// Registration and login
// ============================================================================

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    username: String,
    password: String,
}

/// POST /auth/register - Create an account and start a session
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, StatusCode> {
    let email = users::normalize_email(&payload.email);
    let username = payload.username.trim();

    if !email.contains('@') || username.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    password::check_strength(&payload.password).map_err(|_| StatusCode::BAD_REQUEST)?;

    let password_hash = hash_blocking(payload.password).await?;

    let user_id = users::create_user(&state.db, &email, username, &password_hash)
        .await
        .log_500("Create user error")?
        .ok_or(StatusCode::CONFLICT)?;

    info!(user_id, "registered user");

    let me = MeResponse {
        id: user_id,
        email,
        username: username.to_string(),
    };
    start_session(&state, user_id, StatusCode::CREATED, Some(me)).await
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// POST /auth/login - Verify credentials and start a session
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Response, StatusCode> {
    let credentials = users::get_credentials_by_email(&state.db, &payload.email)
        .await
        .log_500("Get credentials error")?;

    // Unknown emails still pay for a hash check
    let (user_id, stored_hash) = match credentials {
        Some(c) => (Some(c.id), Some(c.password_hash)),
        None => (None, None),
    };
    let verified = verify_blocking(payload.password, stored_hash).await?;

    let Some(user_id) = user_id.filter(|_| verified) else {
        return Err(StatusCode::UNAUTHORIZED);
    };

    start_session(&state, user_id, StatusCode::NO_CONTENT, None).await
}

// ============================================================================
// Session endpoints
// ============================================================================

/// POST /auth/refresh - Refresh the access token using the refresh token cookie
/// Implements refresh token rotation: old token is invalidated, new one is issued
async fn refresh_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, StatusCode> {
    let old_refresh_token = jar
        .get(REFRESH_TOKEN_NAME)
        .map(|c| c.value().to_string())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Invalid or expired tokens are expected for stale sessions, so no log
    let (user_id, new_refresh_token) = session::rotate_refresh_token(&old_refresh_token, &state.db)
        .await
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    let access_token = session::create_access_token(user_id, &state.jwt_secret)
        .log_500("Create access token error")?;

    let settings = &state.config.cookies;
    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().append(
        SET_COOKIE,
        cookies::build_access_cookie(&access_token, settings)?,
    );
    response.headers_mut().append(
        SET_COOKIE,
        cookies::build_refresh_cookie(&new_refresh_token, settings)?,
    );

    Ok(response)
}

/// POST /auth/logout - Clear session and revoke refresh token
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Response, StatusCode> {
    if let Some(refresh_token) = jar.get(REFRESH_TOKEN_NAME) {
        // The client is logged out either way
        if let Err(e) = session::revoke_refresh_token(refresh_token.value(), &state.db).await {
            warn!(error = %e, "failed to revoke refresh token during logout");
        }
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    for cookie in cookies::build_clear_cookies(&state.config.cookies)? {
        response.headers_mut().append(SET_COOKIE, cookie);
    }

    Ok(response)
}

#[derive(Serialize)]
struct MeResponse {
    id: i64,
    email: String,
    username: String,
}

/// GET /auth/me - Get current user info (validates session)
async fn get_me(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MeResponse>, StatusCode> {
    // A valid JWT for a deleted user is still unauthorized
    let user = users::get_user_by_id(&state.db, user_id)
        .await
        .log_500("Get user by ID error")?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        username: user.username,
    }))
}

// ============================================================================
// Password reset
// ============================================================================

#[derive(Deserialize)]
struct ForgotPasswordRequest {
    email: String,
}

/// POST /auth/password/forgot - Send a reset code if the account exists.
/// Always 204 so the response does not reveal whether the email is registered.
async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> StatusCode {
    let email = users::normalize_email(&payload.email);

    match users::get_credentials_by_email(&state.db, &email).await {
        Ok(Some(_)) => {
            if let Err(e) = state.otp.send_code(&email).await {
                warn!(error = %e, "failed to send password reset code");
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "password reset lookup failed"),
    }

    StatusCode::NO_CONTENT
}

#[derive(Deserialize)]
struct ResetPasswordRequest {
    email: String,
    code: String,
    new_password: String,
}

/// POST /auth/password/reset - Set a new password using an emailed code.
/// Signs the user out everywhere on success.
async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<StatusCode, StatusCode> {
    password::check_strength(&payload.new_password).map_err(|_| StatusCode::BAD_REQUEST)?;

    let email = users::normalize_email(&payload.email);
    let code = payload.code.trim();
    if code.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let valid = state
        .otp
        .verify_code(&email, code)
        .await
        .log_status("OTP verification error", StatusCode::BAD_GATEWAY)?;
    if !valid {
        return Err(StatusCode::BAD_REQUEST);
    }

    let credentials = users::get_credentials_by_email(&state.db, &email)
        .await
        .log_500("Get credentials error")?
        .ok_or(StatusCode::BAD_REQUEST)?;

    let password_hash = hash_blocking(payload.new_password).await?;

    replace_password(&state.db, credentials.id, &password_hash).await?;

    info!(user_id = credentials.id, "password reset");

    Ok(StatusCode::NO_CONTENT)
}

/// Store the new hash and drop every refresh token in one transaction
async fn replace_password(
    db: &PgPool,
    user_id: i64,
    password_hash: &str,
) -> Result<(), StatusCode> {
    let mut tx = db.begin().await.log_500("Begin password reset error")?;

    users::update_password(&mut *tx, user_id, password_hash)
        .await
        .log_500("Update password error")?;

    session::revoke_all_user_tokens(&mut *tx, user_id)
        .await
        .log_500("Revoke user tokens error")?;

    tx.commit().await.log_500("Commit password reset error")?;

    Ok(())
}
