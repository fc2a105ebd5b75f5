//! Raw catalog JSON → [`CatalogItem`].
//!
//! Every optional field may be missing or null in the source. Missing
//! values become `None` or empty lists; only a missing numeric `id` makes
//! an item unusable.

use marquee_core::category::Category;
use marquee_core::entity::{CatalogItem, MAX_CAST};
use serde_json::Value;

use crate::genres::genre_names;

/// Default base for poster and backdrop paths.
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";

const POSTER_SIZE: &str = "w500";
const BACKDROP_SIZE: &str = "w1280";

/// Normalize a single search result or detail document.
pub fn normalize_item(category: Category, raw: &Value, image_base: &str) -> Option<CatalogItem> {
    let id = raw.get("id")?.as_i64()?;

    let title = str_field(raw, "title")
        .or_else(|| str_field(raw, "name"))
        .unwrap_or_default()
        .to_string();
    let release_date = str_field(raw, "release_date")
        .or_else(|| str_field(raw, "first_air_date"))
        .map(str::to_string);
    let year = release_date
        .as_deref()
        .and_then(|d| d.get(..4))
        .map(str::to_string);

    let (genres, genre_ids) = genres(raw);

    Some(CatalogItem {
        id,
        category,
        title,
        year,
        release_date,
        overview: str_field(raw, "overview").unwrap_or_default().to_string(),
        poster: image_url(raw, "poster_path", image_base, POSTER_SIZE),
        backdrop: image_url(raw, "backdrop_path", image_base, BACKDROP_SIZE),
        catalog_score: raw
            .get("vote_average")
            .and_then(Value::as_f64)
            .map(score_from_average),
        genres,
        genre_ids,
        cast: cast(raw),
        director: director(raw),
        runtime: runtime(raw),
        seasons: raw
            .get("number_of_seasons")
            .and_then(Value::as_u64)
            .map(|n| n as u32),
    })
}

/// Normalize the `results` array of a list response. Unusable entries are
/// skipped; a missing array yields an empty list.
pub fn normalize_results(category: Category, raw: &Value, image_base: &str) -> Vec<CatalogItem> {
    raw.get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .filter_map(|r| normalize_item(category, r, image_base))
                .collect()
        })
        .unwrap_or_default()
}

/// 0-10 average → 0-100 integer score.
fn score_from_average(average: f64) -> u8 {
    (average * 10.0).round().clamp(0.0, 100.0) as u8
}

/// Non-empty string field.
fn str_field<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn image_url(raw: &Value, key: &str, base: &str, size: &str) -> Option<String> {
    str_field(raw, key).map(|path| format!("{base}/{size}{path}"))
}

/// Detail documents carry `genres: [{id, name}]`; list results only carry
/// `genre_ids`, which are mapped to names through the static table.
fn genres(raw: &Value) -> (Vec<String>, Vec<i64>) {
    if let Some(objects) = raw.get("genres").and_then(Value::as_array) {
        let names = objects
            .iter()
            .filter_map(|g| str_field(g, "name"))
            .map(str::to_string)
            .collect();
        let ids = objects
            .iter()
            .filter_map(|g| g.get("id").and_then(Value::as_i64))
            .collect();
        return (names, ids);
    }

    let ids: Vec<i64> = raw
        .get("genre_ids")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    (genre_names(&ids), ids)
}

fn cast(raw: &Value) -> Vec<String> {
    raw.pointer("/credits/cast")
        .and_then(Value::as_array)
        .map(|cast| {
            cast.iter()
                .filter_map(|c| str_field(c, "name"))
                .take(MAX_CAST)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Film director from the crew list, or the first creator of a series.
fn director(raw: &Value) -> Option<String> {
    let from_crew = raw
        .pointer("/credits/crew")
        .and_then(Value::as_array)
        .and_then(|crew| {
            crew.iter()
                .find(|c| c.get("job").and_then(Value::as_str) == Some("Director"))
        })
        .and_then(|c| str_field(c, "name"));

    from_crew
        .or_else(|| {
            raw.get("created_by")
                .and_then(Value::as_array)
                .and_then(|creators| creators.first())
                .and_then(|c| str_field(c, "name"))
        })
        .map(str::to_string)
}

/// Movie runtime, or the first listed episode runtime for a series.
fn runtime(raw: &Value) -> Option<u32> {
    raw.get("runtime")
        .and_then(Value::as_u64)
        .or_else(|| {
            raw.get("episode_run_time")
                .and_then(Value::as_array)
                .and_then(|r| r.first())
                .and_then(Value::as_u64)
        })
        .filter(|minutes| *minutes > 0)
        .map(|minutes| minutes as u32)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
