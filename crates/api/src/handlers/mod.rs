pub mod auth;
pub mod comments;
pub mod media;
pub mod metadata;
pub mod posts;
pub mod upload;
pub mod users;
