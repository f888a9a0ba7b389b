use crate::models::CatalogItem;

pub const FALLBACK_NOTICE: &str =
    "Search is temporarily unavailable. Showing sample titles instead of live results.";

/// Small built-in catalog rendered when the search service cannot be reached
pub fn fallback_catalog() -> Vec<CatalogItem> {
    vec![
        CatalogItem {
            id: 550,
            title: Some("Fight Club".to_string()),
            overview: Some(
                "A ticking-time-bomb insomniac and a slippery soap salesman channel primal \
                 male aggression into a shocking new form of therapy."
                    .to_string(),
            ),
            release_date: Some("1999-10-15".to_string()),
            vote_average: 8.4,
            popularity: 61.416,
            ..Default::default()
        },
        CatalogItem {
            id: 13,
            title: Some("Forrest Gump".to_string()),
            overview: Some(
                "A man with a low IQ has accomplished great things in his life and been \
                 present during significant historic events."
                    .to_string(),
            ),
            release_date: Some("1994-07-06".to_string()),
            vote_average: 8.5,
            popularity: 75.123,
            ..Default::default()
        },
        CatalogItem {
            id: 27205,
            title: Some("Inception".to_string()),
            overview: Some(
                "Cobb, a skilled thief who commits corporate espionage by infiltrating the \
                 subconscious of his targets."
                    .to_string(),
            ),
            release_date: Some("2010-07-16".to_string()),
            vote_average: 8.4,
            popularity: 151.489,
            ..Default::default()
        },
    ]
}

/// Fallback titles matching `query`, or the whole fallback catalog if none match
pub fn fallback_results(query: &str) -> Vec<CatalogItem> {
    let needle = query.to_lowercase();
    let catalog = fallback_catalog();
    let matches: Vec<CatalogItem> = catalog
        .iter()
        .filter(|item| item.display_title().to_lowercase().contains(&needle))
        .cloned()
        .collect();

    if matches.is_empty() {
        catalog
    } else {
        matches
    }
}
