//! Catalog API client.
//!
//! - [`CatalogQuery`] — path-style query descriptor (`/search/movie?query=..`).
//! - [`Catalog`] — the operations the library and the recommendation
//!   pipeline consume.
//! - [`TmdbCatalog`] — HTTP implementation speaking the TMDB v3 format.
//! - [`normalize`] — tolerant conversion of raw JSON into
//!   [`CatalogItem`](marquee_core::entity::CatalogItem)s.

pub mod client;
pub mod genres;
pub mod normalize;
pub mod query;

pub use client::{Catalog, CatalogConfig, CatalogError, TmdbCatalog};
pub use query::CatalogQuery;
