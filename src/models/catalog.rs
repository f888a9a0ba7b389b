use serde::{Deserialize, Serialize};

use super::MediaType;

/// One search hit as returned by the catalog API
///
/// Movies carry `title`/`release_date`; TV shows carry `name`/`first_air_date`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CatalogItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
}

impl CatalogItem {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.name.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or("Unknown Title")
    }

    /// Four-digit year from whichever date field is present, or empty
    pub fn year(&self) -> String {
        self.release_date
            .as_deref()
            .or(self.first_air_date.as_deref())
            .and_then(|d| d.get(..4))
            .map(str::to_string)
            .unwrap_or_default()
    }
}

/// Paged search response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SearchPage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<CatalogItem>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

fn first_page() -> u32 {
    1
}

/// Dropdown entry produced while typing; never persisted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub title: String,
    pub year: String,
    pub media_type: MediaType,
    pub id: u64,
}

impl Suggestion {
    pub fn from_item(item: &CatalogItem, media_type: MediaType) -> Self {
        Self {
            title: item.display_title().to_string(),
            year: item.year(),
            media_type,
            id: item.id,
        }
    }
}
