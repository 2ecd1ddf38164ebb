//! HTTP client for the yard operations REST API.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;

use muster_core::auth::AccessTokenProvider;
use muster_core::sync::Page;

use crate::error::{ApiError, Result};
use crate::types::{ApiErrorBody, PagedResponse};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Longest body slice that ends up in the logs.
const MAX_LOG_BODY_CHARS: usize = 512;

/// HTTP client for the yard operations API.
///
/// Cheap to clone; the connection pool is shared between clones.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn AccessTokenProvider>,
}

impl ApiClient {
    /// Create a client for the API at `base_url` (trailing slash tolerated).
    pub fn new(base_url: &str, tokens: Arc<dyn AccessTokenProvider>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    /// Fetch one page of a listed collection.
    ///
    /// GET /api/v1/{resource}?page={page}&size={size}[&sort={sort}]
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        resource: &str,
        page: u32,
        size: u32,
        sort: Option<&str>,
    ) -> Result<Page<T>> {
        let url = format!("{}/api/v1/{}", self.base_url, resource);
        let mut query: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("size", size.to_string()),
        ];
        if let Some(sort) = sort {
            query.push(("sort", sort.to_string()));
        }
        debug!("Fetching {} page {} (size {})", resource, page, size);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .query(&query)
            .send()
            .await?;

        let envelope: PagedResponse<T> = Self::parse_response(response).await?;
        Ok(envelope.into())
    }

    /// Fetch a flat aggregate payload (stats, KPIs).
    ///
    /// GET /api/v1/{path}
    pub async fn fetch_value<S: DeserializeOwned>(&self, path: &str) -> Result<S> {
        let url = format!("{}/api/v1/{}", self.base_url, path);
        debug!("Fetching aggregate {}", path);

        let response = self
            .client
            .get(&url)
            .headers(self.headers()?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = self.tokens.access_token() {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ApiError::auth("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.message)
                .unwrap_or_else(|| {
                    let raw = body.trim();
                    if raw.is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("request failed")
                            .to_string()
                    } else {
                        raw.to_string()
                    }
                });
            return Err(ApiError::api(status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            ApiError::Json(e)
        })
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        let preview: String = body.chars().take(MAX_LOG_BODY_CHARS).collect();
        if status.is_success() {
            debug!("API response {}: {}", status.as_u16(), preview);
        } else {
            warn!("API response {}: {}", status.as_u16(), preview);
        }
    }
}
