//! Outbound access to the catalog API
//!
//! [`RequestGateway`] is the only path to the network. `call` shows the loading indicator and
//! raises a toast on failure; `silent_call` does neither and is meant for decorative content
//! where the caller renders its own empty state. Both accept a [`CancellationToken`]; a call
//! whose token fires before the response arrives resolves to `AppError::Cancelled`.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::{
    error::{AppError, AppResult},
    ui::{LoadingIndicator, NotificationLevel, Notifier},
};

pub mod endpoint;
pub mod loading;
pub mod request_id;
pub mod transport;

pub use endpoint::Endpoint;
pub use loading::{LoadingGuard, LoadingTracker};
pub use transport::{ApiRequest, HttpTransport, Transport};

pub const REQUEST_FAILED_MESSAGE: &str = "Request failed. Please try again.";

/// Method and body for a gateway call
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            body: None,
        }
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
        }
    }

    pub fn put(body: Value) -> Self {
        Self {
            method: Method::PUT,
            body: Some(body),
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            body: None,
        }
    }
}

pub struct RequestGateway {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    loading: LoadingTracker,
}

impl RequestGateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        notifier: Arc<dyn Notifier>,
        indicator: Arc<dyn LoadingIndicator>,
    ) -> Self {
        Self {
            transport,
            notifier,
            loading: LoadingTracker::new(indicator),
        }
    }

    /// Mints a token for a cancellable call
    pub fn cancellation_token(&self) -> CancellationToken {
        CancellationToken::new()
    }

    /// Number of non-silent calls currently holding the loading indicator
    pub fn calls_in_flight(&self) -> usize {
        self.loading.in_flight()
    }

    /// Calls the API with the loading indicator shown; failures other than cancellation
    /// are surfaced as a toast and returned.
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> AppResult<T> {
        let _loading = self.loading.acquire();

        let result = self.execute(endpoint, options, cancel).await;
        if let Err(e) = &result {
            if !e.is_cancelled() {
                tracing::error!(error = %e, "API request failed");
                self.notifier
                    .notify(NotificationLevel::Error, REQUEST_FAILED_MESSAGE);
            }
        }
        result
    }

    /// Same as [`call`](Self::call) without the loading indicator or any notification
    pub async fn silent_call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> AppResult<T> {
        let result = self.execute(endpoint, options, cancel).await;
        if let Err(e) = &result {
            if !e.is_cancelled() {
                tracing::debug!(error = %e, "Silent API request failed");
            }
        }
        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> AppResult<T> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let request = ApiRequest::new(&endpoint, options.method, options.body);

        let value = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            response = self.transport.send(request) => response?,
        };

        serde_json::from_value(value).map_err(|e| {
            AppError::Decode(format!(
                "Unexpected response shape from {}: {}",
                endpoint.path(),
                e
            ))
        })
    }
}
