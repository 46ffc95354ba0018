//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod comment_repo;
pub mod post_file_repo;
pub mod post_repo;
pub mod user_repo;

pub use comment_repo::CommentRepo;
pub use post_file_repo::PostFileRepo;
pub use post_repo::PostRepo;
pub use user_repo::UserRepo;
