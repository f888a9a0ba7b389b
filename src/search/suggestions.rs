use crate::models::{CatalogItem, MediaType, Suggestion};

/// Top `per_type` movies followed by top `per_type` TV shows
pub fn merge_suggestions(
    movies: &[CatalogItem],
    tv_shows: &[CatalogItem],
    per_type: usize,
) -> Vec<Suggestion> {
    movies
        .iter()
        .take(per_type)
        .map(|item| Suggestion::from_item(item, MediaType::Movie))
        .chain(
            tv_shows
                .iter()
                .take(per_type)
                .map(|item| Suggestion::from_item(item, MediaType::Tv)),
        )
        .collect()
}
