//! Route definitions for the `/posts` resource, its files and audio metadata.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{media, metadata, posts};
use crate::state::AppState;

/// Routes mounted at `/posts`.
///
/// ```text
/// GET    /                                -> list_posts
/// POST   /                                -> create_post (auth, multipart)
/// GET    /{id}                            -> get_post
/// PUT    /{id}                            -> update_post (owner or admin, multipart)
/// DELETE /{id}                            -> delete_post (owner or admin)
/// POST   /{id}/upvote                     -> upvote_post
/// POST   /{id}/downvote                   -> downvote_post
///
/// GET    /{id}/file                       -> serve_primary_file (Range aware)
/// GET    /{id}/files/{file_id}            -> serve_post_file (Range aware)
///
/// GET    /{id}/metadata                   -> get_post_metadata
/// GET    /{id}/cover                      -> get_post_cover
/// GET    /{id}/files/{file_id}/metadata   -> get_file_metadata
/// GET    /{id}/files/{file_id}/cover      -> get_file_cover
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(posts::list_posts).post(posts::create_post))
        .route(
            "/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/{id}/upvote", post(posts::upvote_post))
        .route("/{id}/downvote", post(posts::downvote_post))
        .route("/{id}/file", get(media::serve_primary_file))
        .route("/{id}/files/{file_id}", get(media::serve_post_file))
        .route("/{id}/metadata", get(metadata::get_post_metadata))
        .route("/{id}/cover", get(metadata::get_post_cover))
        .route(
            "/{id}/files/{file_id}/metadata",
            get(metadata::get_file_metadata),
        )
        .route("/{id}/files/{file_id}/cover", get(metadata::get_file_cover))
}
