//! HTTP adapter for the TechFlow REST API.
//!
//! Every outbound request picks up the bearer credential from the session
//! store at call time, so a login or logout is visible to the very next
//! request without rebuilding any client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::session::SessionStore;

use super::error::{ApiError, ApiResult};

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// HTTP adapter bound to one API base URL and one session store.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl HttpClient {
    pub fn new(base_url: &str, session: Arc<SessionStore>) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for `path`, attaching the current bearer credential
    /// if the session holds one. The credential is read live, never cached.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(token) = self.session.credential() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Check status, turning a non-2xx response into `ApiError::Server`
    /// with the status and server-provided message intact.
    async fn check_response(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Read and decode a successful response body.
    async fn parse_body<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> ApiResult<T> {
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{} from {}", e, path)))
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder, path: &str) -> ApiResult<T> {
        let response = builder.send().await?;
        debug!(path, status = %response.status(), "API response");
        let response = Self::check_response(response).await?;
        Self::parse_body(path, response).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(self.request(Method::GET, path), path).await
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let builder = self.request(Method::GET, path).query(query);
        self.execute(builder, path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let builder = self.request(Method::POST, path).json(body);
        self.execute(builder, path).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let builder = self.request(Method::PUT, path).json(body);
        self.execute(builder, path).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let builder = self.request(Method::PATCH, path).json(body);
        self.execute(builder, path).await
    }

    /// DELETE returns no body on success, so only the status is checked.
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self.request(Method::DELETE, path).send().await?;
        debug!(path, status = %response.status(), "API response");
        Self::check_response(response).await?;
        Ok(())
    }
}
