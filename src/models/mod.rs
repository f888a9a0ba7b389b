use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

pub mod catalog;
pub mod watchlist;

pub use catalog::{CatalogItem, SearchPage, Suggestion};
pub use watchlist::{WatchlistFilter, WatchlistItem, WatchlistKey, WatchlistStats};

/// Kind of catalog content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    pub const ALL: [MediaType; 2] = [MediaType::Movie, MediaType::Tv];

    /// Path segment used by the search endpoints (`/search/movies`, `/search/tv`)
    pub fn search_segment(&self) -> &'static str {
        match self {
            MediaType::Movie => "movies",
            MediaType::Tv => "tv",
        }
    }

    /// Path segment and wire value used by the watchlist endpoints
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movies",
            MediaType::Tv => "TV Shows",
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "movie" | "movies" => Ok(MediaType::Movie),
            "tv" | "series" | "tv_show" => Ok(MediaType::Tv),
            other => Err(format!("unknown media type '{}'", other)),
        }
    }
}
