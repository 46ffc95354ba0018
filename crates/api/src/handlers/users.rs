//! Handlers for the `/users` resource.
//!
//! Every route requires authentication. Profiles can be edited by their owner
//! or an admin; deletion is admin-only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use mediaboard_core::error::CoreError;
use mediaboard_core::types::DbId;
use mediaboard_db::models::user::{UpdateUser, UserResponse};
use mediaboard_db::repositories::{PostFileRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::upload::remove_stored;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::ListParams;
use crate::state::AppState;

/// Request body for `PUT /users/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100))]
    pub nick: Option<String>,
    pub is_admin: Option<bool>,
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let opts = params.to_options()?;
    let users = UserRepo::list(&state.pool, opts.skip, opts.limit).await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// GET /api/v1/users/me/profile (also `/users/me`)
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<UserResponse>> {
    let me = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user.user_id))?;
    Ok(Json(UserResponse::from(&me)))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/v1/users/{id}
///
/// Update a nick (self or admin). Only admins may change `is_admin`.
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    input.validate()?;

    if UserRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::not_found("User", id));
    }
    if !user.can_modify(id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only update your own profile".into(),
        )));
    }
    if input.is_admin.is_some() && !user.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only an admin can change admin status".into(),
        )));
    }

    let updated = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            nick: input.nick,
            is_admin: input.is_admin,
        },
    )
    .await?
    .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(user_id = id, actor_id = user.user_id, "User updated");

    Ok(Json(UserResponse::from(&updated)))
}

/// DELETE /api/v1/users/{id}
///
/// Permanently delete a user with their posts, comments and uploaded files.
/// Returns 204 No Content.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let files = PostFileRepo::list_by_user(&state.pool, id).await?;

    if !UserRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("User", id));
    }

    remove_stored(&state, &files).await;

    tracing::info!(
        user_id = id,
        admin_id = admin.user_id,
        removed_files = files.len(),
        "User deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
