use std::{sync::Arc, time::Duration};

use crate::{
    config::Config,
    error::AppResult,
    gateway::{HttpTransport, RequestGateway, Transport},
    models::{MediaType, Suggestion, WatchlistKey},
    search::{SearchController, SearchSettings},
    ui::{
        LoadingIndicator, Notifier, ResultSink, ToggleControl, TracingLoadingIndicator,
        TracingNotifier,
    },
    watchlist::WatchlistStore,
};

/// Rendering implementations injected into an [`AppContext`]
#[derive(Clone)]
pub struct Collaborators {
    pub notifier: Arc<dyn Notifier>,
    pub loading: Arc<dyn LoadingIndicator>,
    pub sink: Arc<dyn ResultSink>,
}

impl Collaborators {
    /// Toasts and the loading overlay go to the log; results go to `sink`
    pub fn tracing(sink: Arc<dyn ResultSink>) -> Self {
        Self {
            notifier: Arc::new(TracingNotifier),
            loading: Arc::new(TracingLoadingIndicator),
            sink,
        }
    }
}

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub gateway: Arc<RequestGateway>,
    pub watchlist: Arc<WatchlistStore>,
    pub search: Arc<SearchController>,
}

impl AppContext {
    /// Builds a context talking HTTP to `config.api_base_url`
    pub fn new(config: &Config, collaborators: Collaborators) -> AppResult<Self> {
        let transport = HttpTransport::new(
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::with_transport(
            Arc::new(transport),
            config,
            collaborators,
        ))
    }

    pub fn with_transport(
        transport: Arc<dyn Transport>,
        config: &Config,
        collaborators: Collaborators,
    ) -> Self {
        let gateway = Arc::new(RequestGateway::new(
            transport,
            collaborators.notifier.clone(),
            collaborators.loading,
        ));
        let watchlist = Arc::new(WatchlistStore::new(
            gateway.clone(),
            collaborators.notifier,
        ));
        let search = Arc::new(SearchController::new(
            gateway.clone(),
            collaborators.sink,
            SearchSettings::from_config(config),
        ));

        Self {
            gateway,
            watchlist,
            search,
        }
    }
}

/// Typed user actions coming from the view layer
#[derive(Clone)]
pub enum UiEvent {
    /// Keystroke in the search box; carries the full current text
    Input(String),
    /// Enter pressed in the search box
    Submit(String),
    GoToPage(u32),
    SetMediaType(MediaType),
    SelectSuggestion(Suggestion),
    ToggleWatchlist {
        key: WatchlistKey,
        title: String,
        poster_path: String,
        control: Option<Arc<dyn ToggleControl>>,
    },
    RemoveFromWatchlist(WatchlistKey),
    ToggleWatched {
        key: WatchlistKey,
        /// Current state of the item, before the flip
        watched: bool,
        rating: f64,
    },
    RefreshButtons,
}

impl UiEvent {
    pub fn name(&self) -> &'static str {
        match self {
            UiEvent::Input(_) => "input",
            UiEvent::Submit(_) => "submit",
            UiEvent::GoToPage(_) => "go_to_page",
            UiEvent::SetMediaType(_) => "set_media_type",
            UiEvent::SelectSuggestion(_) => "select_suggestion",
            UiEvent::ToggleWatchlist { .. } => "toggle_watchlist",
            UiEvent::RemoveFromWatchlist(_) => "remove_from_watchlist",
            UiEvent::ToggleWatched { .. } => "toggle_watched",
            UiEvent::RefreshButtons => "refresh_buttons",
        }
    }
}

/// Routes [`UiEvent`]s to the component that owns them
pub struct Dispatcher {
    context: AppContext,
}

impl Dispatcher {
    pub fn new(context: AppContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Handles one event
    ///
    /// `Input` only schedules the debounced work and returns immediately. Search events
    /// never fail: their failures are rendered as fallback content. Watchlist events return
    /// the error after the user has been notified; a repeat click while the same key is
    /// still being updated is dropped.
    pub async fn dispatch(&self, event: UiEvent) -> AppResult<()> {
        tracing::debug!(event = event.name(), "Dispatching UI event");

        match event {
            UiEvent::Input(text) => {
                // Detached; the controller arbitrates whatever the task ends up doing
                let _ = self.context.search.on_input(&text);
            }
            UiEvent::Submit(text) => {
                self.context.search.submit(&text).await;
            }
            UiEvent::GoToPage(page) => {
                if self.context.search.go_to_page(page).await.is_none() {
                    tracing::debug!(page, "No active search to paginate");
                }
            }
            UiEvent::SetMediaType(media_type) => {
                self.context.search.set_media_type(media_type).await;
            }
            UiEvent::SelectSuggestion(suggestion) => {
                self.context.search.select_suggestion(&suggestion).await;
            }
            UiEvent::ToggleWatchlist {
                key,
                title,
                poster_path,
                control,
            } => {
                self.context
                    .watchlist
                    .toggle(key, &title, &poster_path, control)
                    .await?;
            }
            UiEvent::RemoveFromWatchlist(key) => {
                ignore_in_flight(self.context.watchlist.remove(&key).await)?;
            }
            UiEvent::ToggleWatched {
                key,
                watched,
                rating,
            } => {
                ignore_in_flight(
                    self.context
                        .watchlist
                        .toggle_watched(&key, watched, rating)
                        .await,
                )?;
            }
            UiEvent::RefreshButtons => {
                let report = self.context.watchlist.refresh_button_states().await;
                tracing::debug!(
                    updated = report.updated,
                    failed = report.failed,
                    "Refreshed toggle controls"
                );
            }
        }

        Ok(())
    }
}

fn ignore_in_flight(result: AppResult<()>) -> AppResult<()> {
    match result {
        Err(e) if e.is_already_in_flight() => Ok(()),
        other => other,
    }
}
