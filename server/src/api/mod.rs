//! JSON handlers, grouped by resource.

pub mod auth;
pub mod movies;
pub mod reviews;

use cinereview_core::PageRequest;
use cinereview_web::AppError;

/// Default `limit` of movie listings.
pub const MOVIES_PAGE_LIMIT: u32 = 20;

/// Default `limit` of review listings.
pub const REVIEWS_PAGE_LIMIT: u32 = 10;

/// Validate optional `page` / `limit` query parameters.
fn page_request(
    page: Option<u32>,
    limit: Option<u32>,
    default_limit: u32,
) -> Result<PageRequest, AppError> {
    PageRequest::from_query(page, limit, default_limit)
        .map_err(|e| AppError::validation(e.to_string()))
}
