//! Marquee domain core.
//!
//! Zero internal dependencies: the watchlist data model, the taste
//! profile builder, model-response parsing, and request sequencing live
//! here so the cache, the recommendation pipeline and the HTTP layer can
//! all share them.

pub mod category;
pub mod entity;
pub mod error;
pub mod profile;
pub mod response;
pub mod sequencing;
pub mod types;
