//! Remote naming for one user's data.
//!
//! ```text
//! users/{uid}/movie/{id}       entity documents
//! users/{uid}/tv/{id}          entity documents
//! users/{uid}/profile/taste    { "notes": "..." }
//! ```

use marquee_core::category::Category;
use marquee_core::types::UserId;

/// Document id of the taste-notes document inside [`profile_collection`].
pub const TASTE_DOC_ID: &str = "taste";

/// Field of the taste-notes document holding the free text.
pub const NOTES_FIELD: &str = "notes";

/// Collection holding one category of a user's entity records.
pub fn entity_collection(user: &UserId, category: Category) -> String {
    format!("users/{}/{}", user.as_str(), category.as_str())
}

/// Collection holding the user's profile documents.
pub fn profile_collection(user: &UserId) -> String {
    format!("users/{}/profile", user.as_str())
}
