//! HTTP client for the campus portal backend.
//!
//! Provides a minimal client with an injected Bearer token, generic
//! GET/POST/PUT/DELETE helpers, and domain methods (boards, courses, weeks).
//! Non-success responses are turned into [`AppError`] values wrapped in
//! `anyhow::Error`, so callers can `downcast_ref::<AppError>()` to tell a 403
//! from a 404.

pub mod api;

use anyhow::{Context, Result};
use campus_core::{AppError, Config};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// No credentials (public boards only).
    Anonymous,
    /// `Authorization: Bearer {token}`
    Bearer(String),
}

impl Auth {
    pub fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => Auth::Bearer(t.to_string()),
            _ => Auth::Anonymous,
        }
    }

    /// Value for the `Authorization` header, if any.
    pub fn header_value(&self) -> Option<String> {
        match self {
            Auth::Anonymous => None,
            Auth::Bearer(token) => Some(format!("Bearer {}", token)),
        }
    }
}

/// HTTP client for the portal API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    api_prefix: String,
    auth: Auth,
}

impl ApiClient {
    pub fn new(base_url: String, auth: Auth) -> Result<Self> {
        Self::with_options(
            base_url,
            DEFAULT_API_PREFIX.to_string(),
            auth,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_options(
        base_url: String,
        api_prefix: String,
        auth: Auth,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_prefix: api_prefix.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Create client from loaded configuration. The access token, if any, is
    /// taken from the config; nothing is read from ambient state later.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_options(
            config.api_url().to_string(),
            config.api_prefix(),
            Auth::from_token(config.access_token()),
            Duration::from_secs(config.http_timeout_secs()),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL for a path under the API prefix, e.g. `api_url("/courses")`.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, self.api_prefix, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.header_value() {
            Some(value) => request.header("Authorization", value),
            None => request,
        }
    }

    /// Sends the request and converts non-success statuses into `AppError`.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = self
            .apply_auth(request)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(status = status.as_u16(), body = %error_text, "API request failed");
            return Err(AppError::from_status(status.as_u16(), error_text).into());
        }

        Ok(response)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body: T = response
            .json()
            .await
            .context("Failed to parse response as JSON")?;
        Ok(body)
    }

    /// GET request with optional query parameters. Deserializes JSON response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.client.get(self.api_url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = self.send(request).await?;
        Self::parse(response).await
    }

    /// POST JSON body and deserialize response.
    pub async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.post(self.api_url(path)).json(body);
        let response = self.send(request).await?;
        Self::parse(response).await
    }

    /// POST without a body and deserialize response.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.client.post(self.api_url(path));
        let response = self.send(request).await?;
        Self::parse(response).await
    }

    /// PUT JSON body and deserialize response.
    pub async fn put_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.client.put(self.api_url(path)).json(body);
        let response = self.send(request).await?;
        Self::parse(response).await
    }

    /// DELETE request. Returns Ok(()) on success.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let request = self.client.delete(self.api_url(path));
        self.send(request).await?;
        Ok(())
    }

    /// Raw client for custom requests. Caller must apply auth via build_url and headers.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Returns the `AppError` carried by an API error, if it came from a response status.
pub fn app_error(err: &anyhow::Error) -> Option<&AppError> {
    err.downcast_ref::<AppError>()
}

// Re-export domain types for convenience.
pub use campus_core::models::{
    BoardKind, Course, CourseFilter, LectureWeek, LikeResponse, NewPost, Page, PageQuery, Post,
    PostUpdate,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_from_token() {
        assert!(matches!(Auth::from_token(None), Auth::Anonymous));
        assert!(matches!(Auth::from_token(Some("  ")), Auth::Anonymous));
        assert_eq!(
            Auth::from_token(Some("abc")).header_value().as_deref(),
            Some("Bearer abc")
        );
    }

    #[test]
    fn test_urls_are_normalized() {
        let client = ApiClient::with_options(
            "http://portal.example.edu/".to_string(),
            "/api/v2/".to_string(),
            Auth::Anonymous,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.api_url("/courses"),
            "http://portal.example.edu/api/v2/courses"
        );
        assert_eq!(client.build_url("/health"), "http://portal.example.edu/health");
    }
}
