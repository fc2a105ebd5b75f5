/// Domain errors shared by every crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A category name that is neither a wire name nor a known alias.
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// A star rating outside 1-5.
    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Validation failed: {0}")]
    Validation(String),
}
