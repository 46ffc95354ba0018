pub mod auth;
pub mod comments;
pub mod health;
pub mod posts;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/register                              register (public)
/// /auth/login                                 login (public)
///
/// /users                                      list (auth)
/// /users/me/profile                           current user (auth)
/// /users/me                                   alias of /users/me/profile
/// /users/{id}                                 get, update (self/admin), delete (admin)
///
/// /posts                                      list (public), create (auth)
/// /posts/{id}                                 get (public), update, delete (owner/admin)
/// /posts/{id}/upvote                          +1 (public)
/// /posts/{id}/downvote                        -1 (public)
/// /posts/{id}/file                            first file, Range aware
/// /posts/{id}/files/{file_id}                 specific file, Range aware
/// /posts/{id}/metadata                        audio tags of the first file
/// /posts/{id}/cover                           cover art of the first file
/// /posts/{id}/files/{file_id}/metadata        audio tags of a file
/// /posts/{id}/files/{file_id}/cover           cover art of a file
///
/// /posts/{id}/comments                        list (public), create (auth)
/// /posts/{id}/comments/{comment_id}           delete (author/admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/posts", posts::router())
        .nest("/posts/{id}/comments", comments::router())
}
