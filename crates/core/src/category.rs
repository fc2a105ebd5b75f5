//! The two media kinds tracked per user.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A tracked media kind. Fixed for the lifetime of an entity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Primary kind: feature films.
    Movie,
    /// Secondary kind: series.
    Tv,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 2] = [Category::Movie, Category::Tv];

    /// Wire name, also used as the remote collection name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// Human-readable plural, used in prompts.
    pub fn plural_label(self) -> &'static str {
        match self {
            Self::Movie => "movies",
            Self::Tv => "TV shows",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    /// Accepts the wire names plus the common aliases a language model
    /// tends to emit (`"film"`, `"show"`, `"series"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" | "film" | "films" => Ok(Self::Movie),
            "tv" | "show" | "shows" | "series" | "tv show" | "tv shows" => Ok(Self::Tv),
            other => Err(CoreError::UnknownCategory(other.to_string())),
        }
    }
}
