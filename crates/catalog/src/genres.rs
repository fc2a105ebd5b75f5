//! Static genre code table.
//!
//! List endpoints only carry numeric `genre_ids`; detail endpoints carry
//! names. This table bridges the two so every normalized item has names.

/// `(code, name)` pairs for both movie and TV genres.
const GENRES: &[(i64, &str)] = &[
    (12, "Adventure"),
    (14, "Fantasy"),
    (16, "Animation"),
    (18, "Drama"),
    (27, "Horror"),
    (28, "Action"),
    (35, "Comedy"),
    (36, "History"),
    (37, "Western"),
    (53, "Thriller"),
    (80, "Crime"),
    (99, "Documentary"),
    (878, "Science Fiction"),
    (9648, "Mystery"),
    (10402, "Music"),
    (10749, "Romance"),
    (10751, "Family"),
    (10752, "War"),
    (10759, "Action & Adventure"),
    (10762, "Kids"),
    (10763, "News"),
    (10764, "Reality"),
    (10765, "Sci-Fi & Fantasy"),
    (10766, "Soap"),
    (10767, "Talk"),
    (10768, "War & Politics"),
    (10770, "TV Movie"),
];

/// Name for a genre code, if known.
pub fn genre_name(code: i64) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(id, _)| *id == code)
        .map(|(_, name)| *name)
}

/// Names for a list of codes, skipping unknown codes.
pub fn genre_names(codes: &[i64]) -> Vec<String> {
    codes
        .iter()
        .filter_map(|code| genre_name(*code))
        .map(str::to_string)
        .collect()
}
