//! Taste profile derivation.
//!
//! [`build_profile`] is a pure function over the user's entity records. It
//! is recomputed on demand and never persisted.

use std::collections::HashMap;

use serde::Serialize;

use crate::category::Category;
use crate::entity::EntityRecord;

/// Maximum number of genres kept in [`TasteProfile::top_genres`].
pub const MAX_TOP_GENRES: usize = 8;

/// Ratings at or above this go to `loved`.
pub const LOVED_MIN_RATING: u8 = 4;

/// Ratings equal to this go to `liked`.
pub const LIKED_RATING: u8 = 3;

/// Genre weight contributed by a watched item without a rating.
pub const UNRATED_GENRE_WEIGHT: u32 = 3;

/// A rated item in the `loved` or `liked` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileEntry {
    pub title: String,
    pub year: Option<String>,
    pub category: Category,
    pub genres: Vec<String>,
    pub stars: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Derived summary of a user's preferences, sent as generation context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TasteProfile {
    pub loved: Vec<ProfileEntry>,
    pub liked: Vec<ProfileEntry>,
    pub watched_unrated: Vec<String>,
    pub watchlist: Vec<String>,
    pub top_genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personal_notes: Option<String>,
}

impl TasteProfile {
    /// True when there is nothing to personalise on.
    pub fn is_empty(&self) -> bool {
        self.loved.is_empty()
            && self.liked.is_empty()
            && self.watched_unrated.is_empty()
            && self.watchlist.is_empty()
            && self.personal_notes.is_none()
    }
}

/// Derive a [`TasteProfile`] from every entity record across both
/// categories plus the user's free-text notes.
///
/// Watched items rated 1 or 2 land in none of `loved`, `liked` or
/// `watched_unrated`; they still contribute their rating to genre scores.
///
/// The input is first put into a canonical order (`added_at`, category,
/// id), so genre ties resolve by first appearance in that order and the
/// result does not depend on the order the records were passed in.
pub fn build_profile<'a, I>(entities: I, personal_notes: &str) -> TasteProfile
where
    I: IntoIterator<Item = &'a EntityRecord>,
{
    let mut ordered: Vec<&EntityRecord> = entities.into_iter().collect();
    ordered.sort_by(|a, b| {
        a.added_at
            .cmp(&b.added_at)
            .then(a.category.cmp(&b.category))
            .then(a.id.cmp(&b.id))
    });

    let mut profile = TasteProfile::default();
    let mut scores = GenreScores::default();

    for entity in ordered {
        if !entity.watched {
            profile.watchlist.push(entity.title.clone());
            continue;
        }

        let weight = entity
            .rating
            .map_or(UNRATED_GENRE_WEIGHT, |r| u32::from(r.stars()));
        for genre in &entity.genres {
            scores.add(genre, weight);
        }

        match entity.rating.map(|r| r.stars()) {
            None => profile.watched_unrated.push(entity.title.clone()),
            Some(stars) if stars >= LOVED_MIN_RATING => profile.loved.push(entry(entity, stars)),
            Some(stars) if stars == LIKED_RATING => profile.liked.push(entry(entity, stars)),
            Some(_) => {}
        }
    }

    profile.top_genres = scores.ranked(MAX_TOP_GENRES);

    let notes = personal_notes.trim();
    if !notes.is_empty() {
        profile.personal_notes = Some(notes.to_string());
    }

    profile
}

fn entry(entity: &EntityRecord, stars: u8) -> ProfileEntry {
    let notes = entity.notes.trim();
    ProfileEntry {
        title: entity.title.clone(),
        year: entity.year.clone(),
        category: entity.category,
        genres: entity.genres.clone(),
        stars,
        notes: (!notes.is_empty()).then(|| notes.to_string()),
    }
}

/// Genre score accumulator that remembers first-seen order.
#[derive(Default)]
struct GenreScores {
    order: Vec<(String, u32)>,
    index: HashMap<String, usize>,
}

impl GenreScores {
    fn add(&mut self, genre: &str, weight: u32) {
        match self.index.get(genre) {
            Some(&i) => self.order[i].1 += weight,
            None => {
                self.index.insert(genre.to_string(), self.order.len());
                self.order.push((genre.to_string(), weight));
            }
        }
    }

    /// Descending by score; the stable sort keeps first-seen order on ties.
    fn ranked(mut self, limit: usize) -> Vec<String> {
        self.order.sort_by(|a, b| b.1.cmp(&a.1));
        self.order
            .into_iter()
            .take(limit)
            .map(|(genre, _)| genre)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
