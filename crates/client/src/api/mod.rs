//! HTTP boundary to the Mid Shop REST API.
//!
//! # Architecture
//!
//! - Every request is built by [`ApiClient::request`], which attaches the
//!   persisted bearer token when there is one
//! - Every response goes through [`ApiClient::execute`], which unwraps the
//!   `{ success, message?, data }` envelope and maps failures to [`ApiError`]
//! - A 401 tears the session down (persisted token, persisted identity,
//!   in-memory identity), navigates to the login path and is still returned
//!   to the caller as [`ApiError::Unauthorized`]
//! - Read-only catalog responses are cached in memory via `moka`
//!
//! Endpoint groups live in submodules as further `impl ApiClient` blocks.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mid_shop_client::{ApiClient, ClientConfig, LogNavigator, SessionVault};
//!
//! let config = ClientConfig::from_env()?;
//! let vault = Arc::new(SessionVault::in_memory());
//! let api = ApiClient::new(&config, vault, Arc::new(LogNavigator));
//!
//! let page = api.products(&ProductQuery::default()).await?;
//! ```

mod auth;
mod cache;
mod cart;
mod products;
mod users;

use std::sync::Arc;

use mid_shop_core::ApiResponse;
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::ClientConfig;
use crate::navigator::Navigator;
use crate::vault::SessionVault;

use cache::CacheValue;

/// Message used when the server rejects a request without saying why.
const GENERIC_FAILURE: &str = "Something went wrong, please try again";

/// Errors that can occur when talking to the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection refused, TLS, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body is not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint path could not be joined onto the base URL.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered 401. The session has already been torn down.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// The API refused the request (validation or business rule).
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The call succeeded but returned no data where some was required.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ApiError {
    /// HTTP status code attached to the failure, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED.as_u16()),
            Self::Rejected { status, .. } => Some(*status),
            Self::RateLimited(_) => Some(StatusCode::TOO_MANY_REQUESTS.as_u16()),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::Url(_) | Self::NotFound(_) => None,
        }
    }

    /// Whether this failure ended the session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Message suitable for showing to the user.
    ///
    /// Server-supplied messages are passed through; transport and decoding
    /// failures get a generic message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { message } | Self::Rejected { message, .. } => message.clone(),
            Self::RateLimited(secs) => format!("Too many requests, retry in {secs}s"),
            Self::NotFound(what) => format!("Not found: {what}"),
            Self::Http(_) | Self::Parse(_) | Self::Url(_) => GENERIC_FAILURE.to_string(),
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the Mid Shop REST API.
///
/// Cheap to clone; all clones share one connection pool, one catalog cache and
/// one [`SessionVault`].
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    login_path: String,
    vault: Arc<SessionVault>,
    navigator: Arc<dyn Navigator>,
    cache: Option<Cache<String, CacheValue>>,
}

impl ApiClient {
    /// Create a new API client.
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        vault: Arc<SessionVault>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let cache = (!config.catalog_cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(1000)
                .time_to_live(config.catalog_cache_ttl)
                .build()
        });

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: config.api_base_url.clone(),
                login_path: config.login_path.clone(),
                vault,
                navigator,
                cache,
            }),
        }
    }

    /// The session vault this client reads its credential from.
    #[must_use]
    pub fn vault(&self) -> &Arc<SessionVault> {
        &self.inner.vault
    }

    /// Resolve an endpoint path (without leading slash) against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Start a request, attaching the bearer credential if one is persisted.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match self.inner.vault.token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and unwrap the response envelope.
    ///
    /// Returns `Ok(None)` for successful responses without data (or without
    /// a body at all).
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Option<T>, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // The teardown must not depend on the body arriving intact
        if status == StatusCode::UNAUTHORIZED {
            let message = response
                .text()
                .await
                .ok()
                .and_then(|body| envelope_message(&body))
                .unwrap_or_else(|| "Your session has expired, please log in again".to_string());
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized { message });
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: envelope_message(&response_text)
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            });
        }

        if response_text.trim().is_empty() {
            return Ok(None);
        }

        let envelope: ApiResponse<T> = match serde_json::from_str(&response_text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse API response"
                );
                return Err(ApiError::Parse(e));
            }
        };

        if !envelope.success {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            });
        }

        Ok(envelope.data)
    }

    /// Like [`Self::execute`], but a missing payload is an error.
    async fn execute_required<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T, ApiError> {
        self.execute(request)
            .await?
            .ok_or_else(|| ApiError::NotFound(what.to_string()))
    }

    /// Global reaction to a 401: tear the session down and go to login.
    ///
    /// Storage is always cleared, but navigation only happens when a live
    /// session was actually ended. This is narrower than an unconditional
    /// redirect: an anonymous 401 (a failed login, say) leaves the caller
    /// where it is with the error, and concurrent 401s navigate once.
    fn handle_unauthorized(&self) {
        if !self.inner.vault.teardown() {
            debug!("API answered 401 with no session to tear down");
            return;
        }

        warn!("API rejected the session credential, signed out");
        self.inner.navigator.navigate(&self.inner.login_path);
    }
}

/// The `message` field of an error envelope, if the body is one.
fn envelope_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiResponse<serde::de::IgnoredAny>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|m| !m.trim().is_empty())
}
