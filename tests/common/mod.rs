#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use discovery_client::{
    gateway::{ApiRequest, RequestGateway, Transport},
    models::{MediaType, Suggestion, WatchlistItem, WatchlistKey},
    search::SearchResultsReady,
    ui::{LoadingIndicator, NotificationLevel, Notifier, ResultSink, ToggleControl},
    AppError, AppResult,
};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

/// In-memory catalog API
///
/// Search answers one result per query, titled after the query. Latency can be set per
/// query; watchlist calls share a single latency. Failures are injected per HTTP method.
#[derive(Default)]
pub struct FakeService {
    requests: Mutex<Vec<ApiRequest>>,
    items: Mutex<Vec<WatchlistItem>>,
    search_latency: Mutex<HashMap<String, Duration>>,
    watchlist_latency: Mutex<Duration>,
    failures: Mutex<HashMap<Method, usize>>,
    search_down: Mutex<bool>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_items(items: Vec<WatchlistItem>) -> Arc<Self> {
        let service = Self::default();
        *service.items.lock().unwrap() = items;
        Arc::new(service)
    }

    pub fn set_search_latency(&self, query: &str, latency: Duration) {
        self.search_latency
            .lock()
            .unwrap()
            .insert(query.to_string(), latency);
    }

    pub fn set_watchlist_latency(&self, latency: Duration) {
        *self.watchlist_latency.lock().unwrap() = latency;
    }

    /// The next `count` requests with `method` answer 500
    pub fn fail_next(&self, method: Method, count: usize) {
        self.failures.lock().unwrap().insert(method, count);
    }

    pub fn take_search_down(&self) {
        *self.search_down.lock().unwrap() = true;
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_with(&self, method: Method) -> Vec<ApiRequest> {
        self.requests()
            .into_iter()
            .filter(|req| req.method == method)
            .collect()
    }

    /// Queries sent to the search endpoints, in arrival order
    pub fn search_queries(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|req| req.path.contains("/search/"))
            .filter_map(|req| req.query_param("q").map(str::to_string))
            .collect()
    }

    pub fn items(&self) -> Vec<WatchlistItem> {
        self.items.lock().unwrap().clone()
    }

    fn take_failure(&self, method: &Method) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(method) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }

    fn handle(&self, request: &ApiRequest) -> AppResult<Value> {
        if self.take_failure(&request.method) {
            return Err(server_error());
        }

        let segments: Vec<&str> = request
            .path
            .trim_start_matches("/api/v1/")
            .split('/')
            .collect();

        match (request.method.as_str(), segments.as_slice()) {
            ("GET", ["search", _]) => {
                if *self.search_down.lock().unwrap() {
                    return Err(server_error());
                }
                let query = request.query_param("q").unwrap_or_default();
                let page: u32 = request
                    .query_param("page")
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(1);
                Ok(json!({
                    "page": page,
                    "results": [{"id": 1, "title": query, "name": query}],
                    "total_pages": 20,
                    "total_results": 400
                }))
            }
            ("GET", ["watchlist"]) => Ok(serde_json::to_value(self.items())?),
            ("POST", ["watchlist"]) => {
                let item: WatchlistItem =
                    serde_json::from_value(request.body.clone().unwrap_or(Value::Null))?;
                self.items.lock().unwrap().push(item);
                Ok(json!({"message": "Item added to watchlist"}))
            }
            ("DELETE", ["watchlist", media_type, id]) => {
                let key = parse_key(media_type, id);
                self.items
                    .lock()
                    .unwrap()
                    .retain(|item| !item.matches(&key));
                Ok(json!({"message": "Item removed from watchlist"}))
            }
            ("PUT", ["watchlist", media_type, id, action]) => {
                let key = parse_key(media_type, id);
                let rating = request
                    .body
                    .as_ref()
                    .and_then(|b| b.get("rating"))
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0);
                let mut items = self.items.lock().unwrap();
                let Some(item) = items.iter_mut().find(|item| item.matches(&key)) else {
                    return Err(AppError::HttpStatus {
                        status: StatusCode::NOT_FOUND,
                        body: "item not found".to_string(),
                    });
                };
                match *action {
                    "watched" => {
                        item.watched = true;
                        item.rating = rating;
                    }
                    "unwatched" => {
                        item.watched = false;
                        item.rating = 0.0;
                    }
                    _ => return Err(server_error()),
                }
                Ok(json!({"message": "ok"}))
            }
            _ => Err(AppError::HttpStatus {
                status: StatusCode::NOT_FOUND,
                body: String::new(),
            }),
        }
    }

    fn latency_for(&self, request: &ApiRequest) -> Duration {
        if request.path.contains("/search/") {
            request
                .query_param("q")
                .and_then(|q| self.search_latency.lock().unwrap().get(q).copied())
                .unwrap_or_default()
        } else {
            *self.watchlist_latency.lock().unwrap()
        }
    }
}

#[async_trait]
impl Transport for FakeService {
    async fn send(&self, request: ApiRequest) -> AppResult<Value> {
        self.requests.lock().unwrap().push(request.clone());
        let latency = self.latency_for(&request);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        self.handle(&request)
    }
}

fn parse_key(media_type: &str, id: &str) -> WatchlistKey {
    WatchlistKey::new(id, media_type.parse::<MediaType>().unwrap())
}

fn server_error() -> AppError {
    AppError::HttpStatus {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: "internal error".to_string(),
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(NotificationLevel, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(NotificationLevel, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.messages().iter().any(|(_, m)| m == message)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingIndicator {
    transitions: Mutex<Vec<bool>>,
}

impl RecordingIndicator {
    pub fn transitions(&self) -> Vec<bool> {
        self.transitions.lock().unwrap().clone()
    }
}

impl LoadingIndicator for RecordingIndicator {
    fn set_visible(&self, visible: bool) {
        self.transitions.lock().unwrap().push(visible);
    }
}

#[derive(Default)]
pub struct RecordingSink {
    results: Mutex<Vec<SearchResultsReady>>,
    suggestions: Mutex<Vec<Vec<Suggestion>>>,
    clears: Mutex<usize>,
}

impl RecordingSink {
    pub fn results(&self) -> Vec<SearchResultsReady> {
        self.results.lock().unwrap().clone()
    }

    pub fn rendered_queries(&self) -> Vec<String> {
        self.results().into_iter().map(|r| r.query).collect()
    }

    pub fn suggestions(&self) -> Vec<Vec<Suggestion>> {
        self.suggestions.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        *self.clears.lock().unwrap()
    }
}

impl ResultSink for RecordingSink {
    fn on_results(&self, ready: SearchResultsReady) {
        self.results.lock().unwrap().push(ready);
    }

    fn clear_results(&self) {
        *self.clears.lock().unwrap() += 1;
    }

    fn on_suggestions(&self, suggestions: Vec<Suggestion>) {
        self.suggestions.lock().unwrap().push(suggestions);
    }

    fn clear_suggestions(&self) {}
}

/// Toggle control that records every state change
#[derive(Default)]
pub struct RecordingControl {
    enabled: Mutex<Vec<bool>>,
    in_watchlist: Mutex<Vec<bool>>,
}

impl RecordingControl {
    pub fn enabled_history(&self) -> Vec<bool> {
        self.enabled.lock().unwrap().clone()
    }

    pub fn last_in_watchlist(&self) -> Option<bool> {
        self.in_watchlist.lock().unwrap().last().copied()
    }
}

impl ToggleControl for RecordingControl {
    fn set_enabled(&self, enabled: bool) {
        self.enabled.lock().unwrap().push(enabled);
    }

    fn set_in_watchlist(&self, in_watchlist: bool) {
        self.in_watchlist.lock().unwrap().push(in_watchlist);
    }
}

pub struct Harness {
    pub service: Arc<FakeService>,
    pub notifier: Arc<RecordingNotifier>,
    pub indicator: Arc<RecordingIndicator>,
    pub gateway: Arc<RequestGateway>,
}

impl Harness {
    pub fn new(service: Arc<FakeService>) -> Self {
        let notifier = Arc::new(RecordingNotifier::default());
        let indicator = Arc::new(RecordingIndicator::default());
        let gateway = Arc::new(RequestGateway::new(
            service.clone(),
            notifier.clone(),
            indicator.clone(),
        ));
        Self {
            service,
            notifier,
            indicator,
            gateway,
        }
    }
}

pub fn movie(id: &str, title: &str) -> WatchlistItem {
    WatchlistItem::new(WatchlistKey::new(id, MediaType::Movie), title, "/poster.jpg")
}
