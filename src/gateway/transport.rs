use reqwest::{Client as HttpClient, Method};
use serde_json::Value;
use std::time::Duration;
use tracing::Instrument;

use super::{
    endpoint::Endpoint,
    request_id::{RequestId, REQUEST_ID_HEADER},
};
use crate::error::{AppError, AppResult};

/// A fully-resolved outbound request, independent of the HTTP library
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(endpoint: &Endpoint, method: Method, body: Option<Value>) -> Self {
        Self {
            method,
            path: endpoint.path(),
            query: endpoint.query(),
            body,
        }
    }

    /// Value of a query parameter, if present
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw JSON exchange with the catalog API
///
/// Implementations map transport failures to `AppError::Network` and non-2xx responses to
/// `AppError::HttpStatus`. They never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> AppResult<Value>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    http_client: HttpClient,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, request: &ApiRequest) -> String {
        format!("{}{}", self.base_url, request.path)
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> AppResult<Value> {
        let request_id = RequestId::new();
        let span = tracing::debug_span!(
            "api_request",
            method = %request.method,
            path = %request.path,
            request_id = %request_id,
        );

        async move {
            let url = self.url_for(&request);
            let mut builder = self
                .http_client
                .request(request.method.clone(), &url)
                .header(REQUEST_ID_HEADER, request_id.as_str())
                .query(&request.query);
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(status = %status, "Catalog API returned an error status");
                return Err(AppError::HttpStatus { status, body });
            }

            let text = response.text().await?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }

            serde_json::from_str(&text).map_err(|e| {
                tracing::error!(error = %e, response = %text, "Failed to parse catalog API response");
                AppError::Decode(format!("Failed to parse catalog API response: {}", e))
            })
        }
        .instrument(span)
        .await
    }
}
