use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::MediaType;
use crate::error::{AppError, AppResult};

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

/// Composite identity of a watchlist entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WatchlistKey {
    pub id: String,
    pub media_type: MediaType,
}

impl WatchlistKey {
    pub fn new(id: impl Into<String>, media_type: MediaType) -> Self {
        Self {
            id: id.into(),
            media_type,
        }
    }
}

impl Display for WatchlistKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.media_type, self.id)
    }
}

/// An entry in the user's watchlist, in the catalog API's wire format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchlistItem {
    pub id: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub title: String,
    #[serde(default)]
    pub poster_path: String,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
    #[serde(default)]
    pub watched: bool,
    /// 0 means unrated
    #[serde(default)]
    pub rating: f64,
}

impl WatchlistItem {
    /// Builds a fresh, unwatched and unrated item
    pub fn new(key: WatchlistKey, title: impl Into<String>, poster_path: impl Into<String>) -> Self {
        Self {
            id: key.id,
            media_type: key.media_type,
            title: title.into(),
            poster_path: poster_path.into(),
            added_at: Utc::now(),
            watched: false,
            rating: 0.0,
        }
    }

    pub fn key(&self) -> WatchlistKey {
        WatchlistKey::new(self.id.clone(), self.media_type)
    }

    pub fn matches(&self, key: &WatchlistKey) -> bool {
        self.media_type == key.media_type && self.id == key.id
    }

    /// Rejects items the catalog service would refuse
    ///
    /// An out-of-range rating is coerced rather than rejected.
    pub fn validate(&mut self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::Validation("item ID cannot be empty".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("item title cannot be empty".to_string()));
        }
        self.rating = coerce_rating(self.rating);
        Ok(())
    }
}

/// Maps ratings outside 0..=10 (and NaN) to 0 ("unrated")
pub fn coerce_rating(rating: f64) -> f64 {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        rating
    } else {
        tracing::debug!(rating, "Rating out of range, coercing to unrated");
        MIN_RATING
    }
}

/// Watchlist view filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchlistFilter {
    #[default]
    All,
    Watched,
    Unwatched,
}

impl WatchlistFilter {
    pub fn accepts(&self, item: &WatchlistItem) -> bool {
        match self {
            WatchlistFilter::All => true,
            WatchlistFilter::Watched => item.watched,
            WatchlistFilter::Unwatched => !item.watched,
        }
    }

    /// Empty-state message shown when nothing passes the filter
    pub fn empty_message(&self) -> &'static str {
        match self {
            WatchlistFilter::All => "Your watchlist is empty",
            WatchlistFilter::Watched => "No watched items yet",
            WatchlistFilter::Unwatched => "No items to watch",
        }
    }
}

impl std::str::FromStr for WatchlistFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(WatchlistFilter::All),
            "watched" => Ok(WatchlistFilter::Watched),
            "unwatched" => Ok(WatchlistFilter::Unwatched),
            other => Err(format!("unknown filter '{}'", other)),
        }
    }
}

/// Aggregate figures over a watchlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WatchlistStats {
    pub total_items: usize,
    pub movies: usize,
    pub tv_shows: usize,
    pub watched_items: usize,
    pub unwatched_items: usize,
    pub average_rating: f64,
    #[serde(default)]
    pub highest_rated: f64,
}

impl WatchlistStats {
    /// Computes stats the way the catalog service does: only watched, rated items
    /// contribute to the average.
    pub fn from_items(items: &[WatchlistItem]) -> Self {
        let mut stats = WatchlistStats {
            total_items: items.len(),
            ..Default::default()
        };
        let mut rating_sum = 0.0;
        let mut rated = 0usize;

        for item in items {
            if item.watched {
                stats.watched_items += 1;
                if item.rating > 0.0 {
                    rating_sum += item.rating;
                    rated += 1;
                    stats.highest_rated = stats.highest_rated.max(item.rating);
                }
            } else {
                stats.unwatched_items += 1;
            }

            match item.media_type {
                MediaType::Movie => stats.movies += 1,
                MediaType::Tv => stats.tv_shows += 1,
            }
        }

        if rated > 0 {
            stats.average_rating = rating_sum / rated as f64;
        }

        stats
    }
}
