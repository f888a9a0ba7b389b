use crate::models::{MediaType, WatchlistKey};

pub const API_PREFIX: &str = "/api/v1";

/// The catalog API surface this client consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /search/{movies|tv}?q=&page=`
    Search {
        media_type: MediaType,
        query: String,
        page: u32,
    },
    /// `GET`/`POST /watchlist`
    Watchlist,
    /// `DELETE /watchlist/{type}/{id}`
    WatchlistItem(WatchlistKey),
    /// `PUT /watchlist/{type}/{id}/watched`
    Watched(WatchlistKey),
    /// `PUT /watchlist/{type}/{id}/unwatched`
    Unwatched(WatchlistKey),
    /// `GET /watchlist/stats`
    WatchlistStats,
}

impl Endpoint {
    pub fn path(&self) -> String {
        match self {
            Endpoint::Search { media_type, .. } => {
                format!("{}/search/{}", API_PREFIX, media_type.search_segment())
            }
            Endpoint::Watchlist => format!("{}/watchlist", API_PREFIX),
            Endpoint::WatchlistItem(key) => {
                format!("{}/watchlist/{}/{}", API_PREFIX, key.media_type, key.id)
            }
            Endpoint::Watched(key) => {
                format!("{}/watchlist/{}/{}/watched", API_PREFIX, key.media_type, key.id)
            }
            Endpoint::Unwatched(key) => {
                format!("{}/watchlist/{}/{}/unwatched", API_PREFIX, key.media_type, key.id)
            }
            Endpoint::WatchlistStats => format!("{}/watchlist/stats", API_PREFIX),
        }
    }

    pub fn query(&self) -> Vec<(String, String)> {
        match self {
            Endpoint::Search { query, page, .. } => vec![
                ("q".to_string(), query.clone()),
                ("page".to_string(), page.to_string()),
            ],
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_path_and_query() {
        let endpoint = Endpoint::Search {
            media_type: MediaType::Movie,
            query: "blade runner".to_string(),
            page: 3,
        };
        assert_eq!(endpoint.path(), "/api/v1/search/movies");
        assert_eq!(
            endpoint.query(),
            vec![
                ("q".to_string(), "blade runner".to_string()),
                ("page".to_string(), "3".to_string())
            ]
        );
    }

    #[test]
    fn test_watchlist_paths() {
        let key = WatchlistKey::new("1396", MediaType::Tv);
        assert_eq!(Endpoint::Watchlist.path(), "/api/v1/watchlist");
        assert_eq!(
            Endpoint::WatchlistItem(key.clone()).path(),
            "/api/v1/watchlist/tv/1396"
        );
        assert_eq!(
            Endpoint::Watched(key.clone()).path(),
            "/api/v1/watchlist/tv/1396/watched"
        );
        assert_eq!(
            Endpoint::Unwatched(key).path(),
            "/api/v1/watchlist/tv/1396/unwatched"
        );
        assert_eq!(Endpoint::WatchlistStats.path(), "/api/v1/watchlist/stats");
        assert!(Endpoint::WatchlistStats.query().is_empty());
    }
}
