//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Where the entity is mutable, an update DTO with `Option` fields

pub mod comment;
pub mod post;
pub mod post_file;
pub mod user;

/// Paging and visibility options for listing posts or comments.
#[derive(Debug, Clone, Copy)]
pub struct ListOptions {
    pub skip: i64,
    pub limit: i64,
    pub include_deleted: bool,
}
