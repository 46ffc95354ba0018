//! Route definitions for the `/users` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`. All require authentication.
///
/// ```text
/// GET    /       -> list_users
/// GET    /me/profile -> get_me
/// GET    /me     -> get_me (alias)
/// GET    /{id}   -> get_user
/// PUT    /{id}   -> update_user (self or admin)
/// DELETE /{id}   -> delete_user (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users))
        .route("/me/profile", get(users::get_me))
        .route("/me", get(users::get_me))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
}
