pub mod catalog;
pub mod library;
pub mod profile;
pub mod recommendations;
pub mod session;

use marquee_core::category::Category;

use crate::error::AppResult;

/// Parse a `{category}` path segment. Accepts the wire names and their
/// common aliases.
pub(crate) fn parse_category(raw: &str) -> AppResult<Category> {
    Ok(raw.parse::<Category>()?)
}
