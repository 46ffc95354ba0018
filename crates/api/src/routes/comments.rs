//! Route definitions for comments on a post.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

/// Routes mounted at `/posts/{id}/comments`.
///
/// ```text
/// GET    /               -> list_comments
/// POST   /               -> create_comment (auth)
/// DELETE /{comment_id}   -> delete_comment (author or admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/{comment_id}", delete(comments::delete_comment))
}
