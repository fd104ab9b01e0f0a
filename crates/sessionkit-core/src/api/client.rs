//! Request wrapper for the session's API.
//!
//! This module provides the `HttpClient` struct. Every call resolves the
//! target against the configured API base, decorates it with the bearer
//! credential when the stored session is valid, and turns non-success
//! statuses into [`HttpError`](super::HttpError).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::{header, Client, Method, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::auth::claims;
use crate::auth::TokenStore;
use crate::config::Config;

use super::{ApiError, HttpError};

const JSON_MIME: &str = "application/json";

/// API client bound to one token store.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base: String,
    store: Arc<dyn TokenStore>,
}

impl HttpClient {
    /// Create a new client with the configured timeout
    pub fn new(config: &Config, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self::with_client(client, config, store))
    }

    /// Wrap an existing reqwest client, sharing its connection pool
    pub fn with_client(client: Client, config: &Config, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            base: Self::base_from(config),
            store,
        }
    }

    fn base_from(config: &Config) -> String {
        if is_absolute(&config.domain) {
            return config.domain.trim_end_matches('/').to_string();
        }
        match config.origin {
            Some(ref origin) => join(origin, &config.domain).trim_end_matches('/').to_string(),
            None => config.domain.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    /// Whether the next request would carry an Authorization header
    pub fn logged_in(&self) -> bool {
        claims::logged_in(self.store.as_ref(), Utc::now())
    }

    /// Absolute URLs pass through; anything else is joined onto the API base.
    pub fn resolve_url(&self, path: &str) -> Result<Url, ApiError> {
        let joined = if is_absolute(path) {
            path.to_string()
        } else {
            join(&self.base, path)
        };
        Url::parse(&joined).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", joined, e)))
    }

    fn headers(&self, authorize: bool) -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static(JSON_MIME));
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static(JSON_MIME));

        if !authorize {
            return headers;
        }
        if let Some(token) = claims::valid_token(self.store.as_ref(), Utc::now()) {
            match header::HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored token is not a valid header value, sending request without it"),
            }
        }
        headers
    }

    /// Issue a request and parse a 2xx JSON body into `T`.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(method, path, body, true).await
    }

    /// Same as [`request`](Self::request) but never attaches the credential.
    pub(crate) async fn request_anonymous<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(method, path, body, false).await
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>, authorize: bool) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.resolve_url(path)?;
        let headers = self.headers(authorize);
        debug!(
            method = %method,
            url = %url,
            authorized = headers.contains_key(header::AUTHORIZATION),
            "Sending request"
        );

        let mut builder = self.client.request(method, url.clone()).headers(headers);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Request failed");
            return Err(HttpError::from_status(status).into());
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e)))
    }

    // ===== Verb helpers =====

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::DELETE, path, None).await
    }
}

fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Join with exactly one slash between the parts
fn join(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
