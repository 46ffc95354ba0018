//! Handlers for the `/auth` resource (register, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mediaboard_core::error::CoreError;
use mediaboard_db::models::user::{CreateUser, UserResponse};
use mediaboard_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_length, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Token type reported alongside every access token.
const TOKEN_TYPE_BEARER: &str = "bearer";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub login: String,
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub nick: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create an account. Admin accounts can only be self-registered when
/// `ALLOW_ADMIN_SIGNUP` is enabled.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;
    validate_password_length(&input.password)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    if input.is_admin && !state.config.allow_admin_signup {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admin registration is disabled".into(),
        )));
    }

    if UserRepo::find_by_login(&state.pool, &input.login)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Login '{}' is already taken",
            input.login
        ))));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            login: input.login,
            password_hash,
            nick: input.nick,
            is_admin: input.is_admin,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, is_admin = user.is_admin, "User registered");

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/v1/auth/login
///
/// Authenticate with login + password and receive a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid login or password".into()));

    let user = UserRepo::find_by_login(&state.pool, &input.login)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    let access_token = generate_access_token(user.id, user.role(), &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: TOKEN_TYPE_BEARER,
        expires_in: state.config.jwt.expires_in_secs(),
    }))
}
