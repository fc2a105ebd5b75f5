//! Entity records, catalog items and the two kinds of partial update.
//!
//! An [`EntityRecord`] carries two groups of fields:
//!
//! - **descriptive** fields copied from the catalog (title, genres, score,
//!   ...) that backfill may refresh through a [`DescriptivePatch`];
//! - **user-owned** fields (`watched`, `watched_at`, `rating`, `notes`,
//!   `added_at`) that only a [`UserStateUpdate`] may touch.
//!
//! Keeping the two update types separate makes it impossible for backfill
//! to overwrite anything the user entered.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::category::Category;
use crate::error::CoreError;
use crate::types::{EntityId, Timestamp};

/// Maximum number of cast names kept on a record.
pub const MAX_CAST: usize = 4;

// ---------------------------------------------------------------------------
// Rating
// ---------------------------------------------------------------------------

/// A user rating, 1 to 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(stars: u8) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&stars) {
            Ok(Self(stars))
        } else {
            Err(CoreError::InvalidRating(stars))
        }
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

// ---------------------------------------------------------------------------
// CatalogItem
// ---------------------------------------------------------------------------

/// A normalized catalog record. Same descriptive fields as an
/// [`EntityRecord`], no user-owned state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: EntityId,
    pub category: Category,
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub backdrop: Option<String>,
    /// 0-100.
    #[serde(default)]
    pub catalog_score: Option<u8>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    /// Minutes, movies only.
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Season count, TV only.
    #[serde(default)]
    pub seasons: Option<u32>,
}

// ---------------------------------------------------------------------------
// EntityRecord
// ---------------------------------------------------------------------------

/// One tracked media item as stored in the user's remote collection.
///
/// Serialized in the remote document shape (camelCase keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub id: EntityId,
    pub category: Category,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<String>,
    /// Tri-state: `None` means the key is absent from the document
    /// (never fetched), `Some(None)` means the catalog has no date.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub release_date: Option<Option<String>>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub backdrop: Option<String>,
    #[serde(default)]
    pub catalog_score: Option<u8>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub seasons: Option<u32>,

    // -- user-owned --
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub watched_at: Option<Timestamp>,
    /// A stored value outside 1-5 decodes as unrated.
    #[serde(default, deserialize_with = "deserialize_rating")]
    pub rating: Option<Rating>,
    #[serde(default)]
    pub notes: String,
    /// Legacy documents without `addedAt` decode as the Unix epoch.
    #[serde(default)]
    pub added_at: Timestamp,
}

/// Distinguishes a present-but-null key from an absent one.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Accepts `"1999"` or `1999`; anything else decodes as unknown.
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(year)) => Some(year),
        Some(Value::Number(year)) => Some(year.to_string()),
        _ => None,
    })
}

fn deserialize_rating<'de, D>(deserializer: D) -> Result<Option<Rating>, D::Error>
where
    D: Deserializer<'de>,
{
    let stars = Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(Value::as_u64)
        .and_then(|n| u8::try_from(n).ok());
    Ok(stars.and_then(|n| Rating::new(n).ok()))
}

impl EntityRecord {
    /// Build a fresh, unwatched record from a catalog item.
    pub fn from_catalog(item: &CatalogItem, added_at: Timestamp) -> Self {
        Self {
            id: item.id,
            category: item.category,
            title: item.title.clone(),
            year: item.year.clone(),
            release_date: Some(item.release_date.clone()),
            overview: item.overview.clone(),
            poster: item.poster.clone(),
            backdrop: item.backdrop.clone(),
            catalog_score: item.catalog_score,
            genres: item.genres.clone(),
            genre_ids: item.genre_ids.clone(),
            cast: item.cast.iter().take(MAX_CAST).cloned().collect(),
            director: item.director.clone(),
            runtime: item.runtime,
            seasons: item.seasons,
            watched: false,
            watched_at: None,
            rating: None,
            notes: String::new(),
            added_at,
        }
    }

    /// Decode a remote document.
    ///
    /// Documents are owned by their collection, so a body that omits `id`
    /// or `category` inherits them from the document key and the
    /// collection it was delivered on.
    pub fn from_document(
        doc_id: &str,
        category: Category,
        mut body: Value,
    ) -> Result<Self, serde_json::Error> {
        if let Value::Object(map) = &mut body {
            if !map.contains_key("id") {
                if let Ok(id) = doc_id.parse::<EntityId>() {
                    map.insert("id".into(), Value::from(id));
                }
            }
            map.entry("category")
                .or_insert_with(|| Value::from(category.as_str()));
        }
        serde_json::from_value(body)
    }

    /// Encode as a remote document body.
    pub fn to_document(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Document key in the remote collection.
    pub fn document_id(&self) -> String {
        self.id.to_string()
    }

    /// Whether backfill should fetch catalog detail for this record.
    pub fn needs_backfill(&self) -> bool {
        self.catalog_score.is_none()
            || self.genres.is_empty()
            || self.genre_ids.is_empty()
            || self.release_date.is_none()
    }
}

// ---------------------------------------------------------------------------
// Partial updates
// ---------------------------------------------------------------------------

/// A partial update restricted to descriptive fields.
///
/// Only fields set to `Some` are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptivePatch {
    pub year: Option<String>,
    pub release_date: Option<Option<String>>,
    pub catalog_score: Option<u8>,
    pub genres: Option<Vec<String>>,
    pub genre_ids: Option<Vec<i64>>,
}

impl DescriptivePatch {
    /// Collect the fields `record` is missing that `detail` can supply.
    pub fn fill_missing(record: &EntityRecord, detail: &CatalogItem) -> Self {
        let mut patch = Self::default();

        if record.catalog_score.is_none() {
            patch.catalog_score = detail.catalog_score;
        }
        if record.genres.is_empty() && !detail.genres.is_empty() {
            patch.genres = Some(detail.genres.clone());
        }
        if record.genre_ids.is_empty() && !detail.genre_ids.is_empty() {
            patch.genre_ids = Some(detail.genre_ids.clone());
        }
        if record.release_date.is_none() {
            patch.release_date = Some(detail.release_date.clone());
            if record.year.is_none() {
                patch.year = detail.year.clone();
            }
        }

        patch
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render as a document field map (camelCase keys).
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(year) = &self.year {
            fields.insert("year".into(), Value::from(year.clone()));
        }
        if let Some(release_date) = &self.release_date {
            fields.insert("releaseDate".into(), Value::from(release_date.clone()));
        }
        if let Some(score) = self.catalog_score {
            fields.insert("catalogScore".into(), Value::from(score));
        }
        if let Some(genres) = &self.genres {
            fields.insert("genres".into(), Value::from(genres.clone()));
        }
        if let Some(genre_ids) = &self.genre_ids {
            fields.insert("genreIds".into(), Value::from(genre_ids.clone()));
        }
        fields
    }
}

/// A partial update restricted to user-owned fields.
#[derive(Debug, Clone, PartialEq)]
pub enum UserStateUpdate {
    /// Mark watched now, with an optional rating and notes.
    MarkWatched {
        rating: Option<Rating>,
        notes: String,
        at: Timestamp,
    },
    /// Reset to the unwatched defaults.
    Unmark,
    /// Change rating and notes without touching the watched flag.
    Rate { rating: Option<Rating>, notes: String },
}

impl UserStateUpdate {
    /// Render as a document field map (camelCase keys).
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match self {
            Self::MarkWatched { rating, notes, at } => {
                fields.insert("watched".into(), Value::Bool(true));
                fields.insert("watchedAt".into(), Value::from(at.to_rfc3339()));
                fields.insert("rating".into(), rating_value(*rating));
                fields.insert("notes".into(), Value::from(notes.clone()));
            }
            Self::Unmark => {
                fields.insert("watched".into(), Value::Bool(false));
                fields.insert("watchedAt".into(), Value::Null);
                fields.insert("rating".into(), Value::Null);
                fields.insert("notes".into(), Value::from(""));
            }
            Self::Rate { rating, notes } => {
                fields.insert("rating".into(), rating_value(*rating));
                fields.insert("notes".into(), Value::from(notes.clone()));
            }
        }
        fields
    }
}

fn rating_value(rating: Option<Rating>) -> Value {
    rating.map_or(Value::Null, |r| Value::from(r.stars()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
