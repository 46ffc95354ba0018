//! Shared query parameter types for API handlers.

use mediaboard_core::error::CoreError;
use mediaboard_db::models::ListOptions;
use serde::Deserialize;

/// Largest page a list endpoint will return.
pub const MAX_PAGE_SIZE: i64 = 100;

/// `?skip=&limit=&include_deleted=` for post and comment listings.
///
/// `limit` defaults to [`MAX_PAGE_SIZE`] and must lie in `1..=100`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub include_deleted: bool,
}

impl ListParams {
    pub fn to_options(&self) -> Result<ListOptions, CoreError> {
        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(CoreError::Validation("skip must be >= 0".into()));
        }
        let limit = self.limit.unwrap_or(MAX_PAGE_SIZE);
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(CoreError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(ListOptions {
            skip,
            limit,
            include_deleted: self.include_deleted,
        })
    }
}
