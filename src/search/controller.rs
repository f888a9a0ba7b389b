use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{
    arbiter::SequenceGate,
    debounce::Debouncer,
    fallback::{fallback_results, FALLBACK_NOTICE},
    suggestions::merge_suggestions,
};
use crate::{
    config::Config,
    error::{AppError, AppResult},
    gateway::{Endpoint, RequestGateway, RequestOptions},
    models::{CatalogItem, MediaType, SearchPage, Suggestion},
    pagination::{clamp_total_pages, compute_page_model, PageModel},
    ui::ResultSink,
};

/// Tuning knobs for [`SearchController`]
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub search_debounce: Duration,
    pub suggestion_debounce: Duration,
    pub min_query_len: usize,
    pub suggestions_per_type: usize,
    pub max_total_pages: u32,
    pub window_radius: u32,
}

impl SearchSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            search_debounce: Duration::from_millis(config.search_debounce_ms),
            suggestion_debounce: Duration::from_millis(config.suggestion_debounce_ms),
            min_query_len: config.min_query_len,
            suggestions_per_type: config.suggestions_per_type,
            max_total_pages: config.max_total_pages,
            window_radius: config.page_window_radius,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// The query whose results are currently eligible to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    pub query: String,
    /// Sequence token minted when the request was issued
    pub requested_at: u64,
    pub media_type: MediaType,
    pub page: u32,
    /// Page count of the last rendered response for this query, clamped to the provider cap
    pub total_pages: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Pending {
        query: String,
        token: u64,
    },
    Settled {
        token: u64,
    },
    Cancelled {
        token: u64,
    },
    Failed {
        token: u64,
    },
}

/// What the results area should show
#[derive(Debug, Clone, PartialEq)]
pub enum SearchView {
    Results(Vec<CatalogItem>),
    /// The service answered with zero matches
    Empty,
    /// The service could not be reached; `results` are sample titles, not matches
    Fallback {
        notice: String,
        results: Vec<CatalogItem>,
    },
}

impl SearchView {
    pub fn is_service_error(&self) -> bool {
        matches!(self, SearchView::Fallback { .. })
    }

    pub fn items(&self) -> &[CatalogItem] {
        match self {
            SearchView::Results(items) => items,
            SearchView::Fallback { results, .. } => results,
            SearchView::Empty => &[],
        }
    }
}

/// Result-ready event handed to the [`ResultSink`]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResultsReady {
    pub query: String,
    pub media_type: MediaType,
    pub view: SearchView,
    pub page_model: PageModel,
    pub total_results: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Live results (or a genuine empty result) were rendered
    Rendered,
    /// The request failed and fallback content was rendered
    Degraded,
    /// A newer request was issued before this one resolved
    Discarded,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionOutcome {
    Shown(usize),
    Discarded,
    Cancelled,
}

/// What happened to one debounced trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debounced<T> {
    /// Query too short; surfaces were cleared without a request
    Cleared,
    /// A later keystroke replaced this one before its timer fired
    Superseded,
    Fired(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputOutcome {
    pub search: Debounced<SearchOutcome>,
    pub suggestions: Debounced<SuggestionOutcome>,
}

#[derive(Default)]
struct ControllerState {
    media_type: Option<MediaType>,
    active: Option<SearchSession>,
    search_cancel: Option<CancellationToken>,
    suggestion_cancel: Option<CancellationToken>,
    phase: SearchPhase,
}

/// Debounced, race-arbitrated search and suggestion engine for one input field
///
/// "Last request wins": every issued request gets a sequence token and a response is only
/// rendered if its token is still the latest. Sink callbacks run under the controller's
/// render lock, so a [`ResultSink`] must not call back into the controller synchronously.
pub struct SearchController {
    gateway: Arc<RequestGateway>,
    sink: Arc<dyn ResultSink>,
    settings: SearchSettings,
    search_debounce: Debouncer,
    suggestion_debounce: Debouncer,
    input_gate: SequenceGate,
    search_gate: SequenceGate,
    suggestion_gate: SequenceGate,
    state: Mutex<ControllerState>,
    render: Mutex<()>,
}

impl SearchController {
    pub fn new(
        gateway: Arc<RequestGateway>,
        sink: Arc<dyn ResultSink>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            search_debounce: Debouncer::new(settings.search_debounce),
            suggestion_debounce: Debouncer::new(settings.suggestion_debounce),
            gateway,
            sink,
            settings,
            input_gate: SequenceGate::default(),
            search_gate: SequenceGate::default(),
            suggestion_gate: SequenceGate::default(),
            state: Mutex::new(ControllerState::default()),
            render: Mutex::new(()),
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.state().media_type.unwrap_or(MediaType::Movie)
    }

    pub fn active_session(&self) -> Option<SearchSession> {
        self.state().active.clone()
    }

    pub fn phase(&self) -> SearchPhase {
        self.state().phase.clone()
    }

    /// Fire-and-forget keystroke handler
    ///
    /// Short queries clear the surfaces before returning; anything else is debounced on a
    /// spawned task. The keystroke claims its input generation before this returns, so a
    /// later keystroke or `clear` supersedes the task even if it has not been polled yet.
    pub fn on_input(self: &Arc<Self>, text: &str) -> Option<JoinHandle<InputOutcome>> {
        let query = text.trim().to_string();
        if self.is_too_short(&query) {
            self.clear();
            return None;
        }

        let generation = self.input_gate.issue();
        let controller = Arc::clone(self);
        Some(tokio::spawn(async move {
            controller.debounce_input(&query, generation).await
        }))
    }

    /// Runs the search and suggestion debouncers for one keystroke
    pub async fn handle_input(&self, text: &str) -> InputOutcome {
        let query = text.trim();
        if self.is_too_short(query) {
            self.clear();
            return InputOutcome {
                search: Debounced::Cleared,
                suggestions: Debounced::Cleared,
            };
        }

        let generation = self.input_gate.issue();
        self.debounce_input(query, generation).await
    }

    async fn debounce_input(&self, query: &str, generation: u64) -> InputOutcome {
        let (search, suggestions) = tokio::join!(
            self.debounced_search(query, generation),
            self.debounced_suggestions(query, generation)
        );
        InputOutcome {
            search,
            suggestions,
        }
    }

    async fn debounced_search(&self, query: &str, generation: u64) -> Debounced<SearchOutcome> {
        if !self.search_debounce.settle().await || !self.input_gate.is_current(generation) {
            return Debounced::Superseded;
        }
        Debounced::Fired(self.search(query).await)
    }

    async fn debounced_suggestions(
        &self,
        query: &str,
        generation: u64,
    ) -> Debounced<SuggestionOutcome> {
        if !self.suggestion_debounce.settle().await || !self.input_gate.is_current(generation) {
            return Debounced::Superseded;
        }
        Debounced::Fired(self.fetch_suggestions(query).await)
    }

    /// Enter key: search immediately, skipping the debounce
    pub async fn submit(&self, text: &str) -> Debounced<SearchOutcome> {
        self.input_gate.issue();
        self.search_debounce.cancel();
        let query = text.trim();
        if self.is_too_short(query) {
            self.clear();
            return Debounced::Cleared;
        }
        Debounced::Fired(self.search(query).await)
    }

    /// New query on the current media type, starting at page 1
    pub async fn search(&self, query: &str) -> SearchOutcome {
        self.search_page(query, 1).await
    }

    /// New query on the current media type, opened directly at `page`
    pub async fn search_page(&self, query: &str, page: u32) -> SearchOutcome {
        let media_type = self.media_type();
        let page = page.clamp(1, self.settings.max_total_pages.max(1));
        self.run_search(query.to_string(), media_type, page).await
    }

    /// Another page of the active query; `None` if nothing has been searched yet
    ///
    /// The page is clamped to the last known page count of the active result.
    pub async fn go_to_page(&self, page: u32) -> Option<SearchOutcome> {
        let session = self.active_session()?;
        let last_page = session
            .total_pages
            .unwrap_or(self.settings.max_total_pages)
            .min(self.settings.max_total_pages)
            .max(1);
        Some(
            self.run_search(session.query, session.media_type, page.clamp(1, last_page))
                .await,
        )
    }

    /// Switches media type and re-runs the active query from page 1
    pub async fn set_media_type(&self, media_type: MediaType) -> Option<SearchOutcome> {
        let session = {
            let mut state = self.state();
            state.media_type = Some(media_type);
            state.active.clone()
        }?;
        Some(self.run_search(session.query, media_type, 1).await)
    }

    /// Searches the picked suggestion in its own media type
    pub async fn select_suggestion(&self, suggestion: &Suggestion) -> SearchOutcome {
        self.suggestion_debounce.cancel();
        {
            let _render = self.render_lock();
            self.suggestion_gate.issue();
            if let Some(token) = self.state().suggestion_cancel.take() {
                token.cancel();
            }
            self.sink.clear_suggestions();
        }
        self.run_search(suggestion.title.clone(), suggestion.media_type, 1)
            .await
    }

    async fn run_search(&self, query: String, media_type: MediaType, page: u32) -> SearchOutcome {
        let cancel = self.gateway.cancellation_token();
        let token = {
            let mut state = self.state();
            let token = self.search_gate.issue();
            if let Some(previous) = state.search_cancel.replace(cancel.clone()) {
                previous.cancel();
            }
            let total_pages = state
                .active
                .as_ref()
                .filter(|s| s.query == query && s.media_type == media_type)
                .and_then(|s| s.total_pages);
            state.media_type = Some(media_type);
            state.active = Some(SearchSession {
                query: query.clone(),
                requested_at: token,
                media_type,
                page,
                total_pages,
            });
            state.phase = SearchPhase::Pending {
                query: query.clone(),
                token,
            };
            token
        };

        tracing::info!(query = %query, media_type = %media_type, page, token, "Issuing search");

        let endpoint = Endpoint::Search {
            media_type,
            query: query.clone(),
            page,
        };
        let result: AppResult<SearchPage> = self
            .gateway
            .call(endpoint, RequestOptions::get(), &cancel)
            .await;

        let _render = self.render_lock();
        if !self.search_gate.is_current(token) {
            tracing::debug!(
                token,
                latest = self.search_gate.latest(),
                query = %query,
                "Discarding stale search response"
            );
            return SearchOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                let total_pages = clamp_total_pages(page.total_pages, self.settings.max_total_pages);
                {
                    let mut state = self.state();
                    state.phase = SearchPhase::Settled { token };
                    if let Some(active) = state.active.as_mut() {
                        active.total_pages = Some(total_pages);
                    }
                }
                tracing::info!(
                    query = %query,
                    results = page.results.len(),
                    total_results = page.total_results,
                    "Search completed"
                );
                self.sink
                    .on_results(self.results_ready(query, media_type, page));
                SearchOutcome::Rendered
            }
            Err(AppError::Cancelled) => {
                self.set_phase(SearchPhase::Cancelled { token });
                SearchOutcome::Cancelled
            }
            Err(e) => {
                self.set_phase(SearchPhase::Failed { token });
                tracing::warn!(query = %query, error = %e, "Search failed, showing fallback titles");
                self.sink.on_results(SearchResultsReady {
                    view: SearchView::Fallback {
                        notice: FALLBACK_NOTICE.to_string(),
                        results: fallback_results(&query),
                    },
                    page_model: compute_page_model(1, 1, self.settings.window_radius),
                    total_results: 0,
                    query,
                    media_type,
                });
                SearchOutcome::Degraded
            }
        }
    }

    fn results_ready(&self, query: String, media_type: MediaType, page: SearchPage) -> SearchResultsReady {
        let total_pages = clamp_total_pages(page.total_pages, self.settings.max_total_pages);
        let page_model = compute_page_model(page.page, total_pages, self.settings.window_radius);
        let view = if page.results.is_empty() {
            SearchView::Empty
        } else {
            SearchView::Results(page.results)
        };

        SearchResultsReady {
            query,
            media_type,
            view,
            page_model,
            total_results: page.total_results,
        }
    }

    /// Fetches movie and TV matches in parallel and shows the merged top entries
    ///
    /// Suggestions are decorative: requests are silent and a failed media type simply
    /// contributes nothing.
    pub async fn fetch_suggestions(&self, query: &str) -> SuggestionOutcome {
        let cancel = self.gateway.cancellation_token();
        let token = {
            let mut state = self.state();
            let token = self.suggestion_gate.issue();
            if let Some(previous) = state.suggestion_cancel.replace(cancel.clone()) {
                previous.cancel();
            }
            token
        };

        let request = |media_type: MediaType| Endpoint::Search {
            media_type,
            query: query.to_string(),
            page: 1,
        };
        let (movies, tv_shows) = tokio::join!(
            self.gateway.silent_call::<SearchPage>(
                request(MediaType::Movie),
                RequestOptions::get(),
                &cancel
            ),
            self.gateway.silent_call::<SearchPage>(
                request(MediaType::Tv),
                RequestOptions::get(),
                &cancel
            ),
        );

        let _render = self.render_lock();
        if !self.suggestion_gate.is_current(token) {
            tracing::debug!(token, query = %query, "Discarding stale suggestions");
            return SuggestionOutcome::Discarded;
        }
        if is_cancelled(&movies) || is_cancelled(&tv_shows) {
            return SuggestionOutcome::Cancelled;
        }

        let movies = results_or_empty(movies, MediaType::Movie);
        let tv_shows = results_or_empty(tv_shows, MediaType::Tv);
        let suggestions = merge_suggestions(&movies, &tv_shows, self.settings.suggestions_per_type);
        let shown = suggestions.len();
        self.sink.on_suggestions(suggestions);
        SuggestionOutcome::Shown(shown)
    }

    /// Drops pending timers, invalidates in-flight requests and empties both surfaces
    pub fn clear(&self) {
        self.input_gate.issue();
        self.search_debounce.cancel();
        self.suggestion_debounce.cancel();

        let _render = self.render_lock();
        self.search_gate.issue();
        self.suggestion_gate.issue();
        {
            let mut state = self.state();
            if let Some(token) = state.search_cancel.take() {
                token.cancel();
            }
            if let Some(token) = state.suggestion_cancel.take() {
                token.cancel();
            }
            state.active = None;
            state.phase = SearchPhase::Idle;
        }
        self.sink.clear_suggestions();
        self.sink.clear_results();
    }

    fn is_too_short(&self, query: &str) -> bool {
        query.chars().count() < self.settings.min_query_len
    }

    fn set_phase(&self, phase: SearchPhase) {
        self.state().phase = phase;
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn render_lock(&self) -> MutexGuard<'_, ()> {
        self.render.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_cancelled<T>(result: &AppResult<T>) -> bool {
    matches!(result, Err(AppError::Cancelled))
}

fn results_or_empty(result: AppResult<SearchPage>, media_type: MediaType) -> Vec<CatalogItem> {
    match result {
        Ok(page) => page.results,
        Err(e) => {
            tracing::debug!(media_type = %media_type, error = %e, "Suggestion fetch failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        gateway::transport::MockTransport,
        ui::{LoadingIndicator, NotificationLevel, Notifier},
    };
    use reqwest::StatusCode;
    use serde_json::json;

    struct Quiet;

    impl Notifier for Quiet {
        fn notify(&self, _level: NotificationLevel, _message: &str) {}
    }

    impl LoadingIndicator for Quiet {
        fn set_visible(&self, _visible: bool) {}
    }

    #[derive(Default)]
    struct RecordingSink {
        results: Mutex<Vec<SearchResultsReady>>,
        suggestions: Mutex<Vec<Vec<Suggestion>>>,
        clears: Mutex<usize>,
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

    fn create_controller(transport: MockTransport) -> (SearchController, Arc<RecordingSink>) {
        let gateway = Arc::new(RequestGateway::new(
            Arc::new(transport),
            Arc::new(Quiet),
            Arc::new(Quiet),
        ));
        let sink = Arc::new(RecordingSink::default());
        let controller = SearchController::new(gateway, sink.clone(), SearchSettings::default());
        (controller, sink)
    }

    fn page_json(page: u32, total_pages: u32, titles: &[&str]) -> serde_json::Value {
        json!({
            "page": page,
            "results": titles
                .iter()
                .enumerate()
                .map(|(i, t)| json!({"id": i as u64 + 1, "title": t}))
                .collect::<Vec<_>>(),
            "total_pages": total_pages,
            "total_results": titles.len()
        })
    }

    #[tokio::test]
    async fn test_short_query_clears_without_request() {
        let mut transport = MockTransport::new();
        transport.expect_send().times(0);

        let (controller, sink) = create_controller(transport);
        let outcome = controller.handle_input(" a ").await;

        assert_eq!(outcome.search, Debounced::Cleared);
        assert_eq!(outcome.suggestions, Debounced::Cleared);
        assert_eq!(*sink.clears.lock().unwrap(), 1);
        assert_eq!(controller.phase(), SearchPhase::Idle);
    }

    #[tokio::test]
    async fn test_search_renders_results_with_page_model() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.query_param("q") == Some("alien") && req.query_param("page") == Some("1"))
            .times(1)
            .returning(|_| Ok(page_json(1, 900, &["Alien", "Aliens"])));

        let (controller, sink) = create_controller(transport);
        assert_eq!(controller.search("alien").await, SearchOutcome::Rendered);

        let results = sink.results.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].view.items().len(), 2);
        assert_eq!(results[0].page_model.total_pages, 500);
        assert!(matches!(controller.phase(), SearchPhase::Settled { .. }));
    }

    #[tokio::test]
    async fn test_zero_results_is_empty_not_fallback() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|_| Ok(page_json(1, 0, &[])));

        let (controller, sink) = create_controller(transport);
        controller.search("qwzx").await;

        let results = sink.results.lock().unwrap();
        assert_eq!(results[0].view, SearchView::Empty);
        assert!(!results[0].view.is_service_error());
    }

    #[tokio::test]
    async fn test_failure_renders_marked_fallback() {
        let mut transport = MockTransport::new();
        transport.expect_send().returning(|_| {
            Err(AppError::HttpStatus {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: String::new(),
            })
        });

        let (controller, sink) = create_controller(transport);
        assert_eq!(controller.search("inception").await, SearchOutcome::Degraded);

        let results = sink.results.lock().unwrap();
        assert!(results[0].view.is_service_error());
        assert_eq!(results[0].view.items()[0].display_title(), "Inception");
        assert!(results[0].page_model.buttons.is_empty());
        assert!(matches!(controller.phase(), SearchPhase::Failed { .. }));
    }

    #[tokio::test]
    async fn test_go_to_page_keeps_query_and_new_query_resets_page() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .returning(|req| {
                let page: u32 = req.query_param("page").unwrap().parse().unwrap();
                Ok(page_json(page, 10, &["Result"]))
            });

        let (controller, _sink) = create_controller(transport);
        assert_eq!(controller.go_to_page(2).await, None);

        controller.search("star").await;
        controller.go_to_page(4).await;
        let session = controller.active_session().unwrap();
        assert_eq!(session.query, "star");
        assert_eq!(session.page, 4);

        controller.search("star trek").await;
        assert_eq!(controller.active_session().unwrap().page, 1);
    }

    #[tokio::test]
    async fn test_set_media_type_reruns_active_query() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.path == "/api/v1/search/movies")
            .times(1)
            .returning(|_| Ok(page_json(1, 1, &["Dune"])));
        transport
            .expect_send()
            .withf(|req| req.path == "/api/v1/search/tv")
            .times(1)
            .returning(|_| Ok(page_json(1, 1, &["Dune: Prophecy"])));

        let (controller, sink) = create_controller(transport);
        controller.search("dune").await;
        controller.set_media_type(MediaType::Tv).await;

        let results = sink.results.lock().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].media_type, MediaType::Tv);
        assert_eq!(controller.media_type(), MediaType::Tv);
    }

    #[tokio::test]
    async fn test_suggestions_survive_one_failed_media_type() {
        let mut transport = MockTransport::new();
        transport
            .expect_send()
            .withf(|req| req.path == "/api/v1/search/movies")
            .returning(|_| Ok(page_json(1, 1, &["A", "B", "C", "D"])));
        transport
            .expect_send()
            .withf(|req| req.path == "/api/v1/search/tv")
            .returning(|_| {
                Err(AppError::HttpStatus {
                    status: StatusCode::BAD_GATEWAY,
                    body: String::new(),
                })
            });

        let (controller, sink) = create_controller(transport);
        assert_eq!(
            controller.fetch_suggestions("ab").await,
            SuggestionOutcome::Shown(3)
        );
        let shown = sink.suggestions.lock().unwrap();
        assert_eq!(shown[0].len(), 3);
        assert!(shown[0].iter().all(|s| s.media_type == MediaType::Movie));
    }
}
