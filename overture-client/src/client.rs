//! Repository host client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use url::Url;

use crate::api::{ContentsApi, DeploymentsApi, RunsApi, SecretsApi, VariablesApi};
use crate::error::{ApiError, ErrorResponse, Result};

/// Default API root; overridable for enterprise hosts and tests.
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Async client for a GitHub-compatible repository host.
///
/// # Example
///
/// ```no_run
/// use overture_client::RepoHost;
/// use overture_core::RepoSlug;
///
/// # async fn example() -> overture_client::Result<()> {
/// let host = RepoHost::builder().token("secret").build()?;
/// let repo = RepoSlug::from("acme/storefront");
/// let key = host.secrets().public_key(&repo).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RepoHost {
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: Url,
    pub(crate) timeout: Duration,
}

impl RepoHost {
    /// Create a new client builder.
    pub fn builder() -> HostBuilder {
        HostBuilder::new()
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the repository contents API.
    pub fn contents(&self) -> ContentsApi {
        ContentsApi::new(self.clone())
    }

    /// Access the repository variables API.
    pub fn variables(&self) -> VariablesApi {
        VariablesApi::new(self.clone())
    }

    /// Access the repository secrets API.
    pub fn secrets(&self) -> SecretsApi {
        SecretsApi::new(self.clone())
    }

    /// Access the CI runs API.
    pub fn runs(&self) -> RunsApi {
        RunsApi::new(self.clone())
    }

    /// Access the deployments API.
    pub fn deployments(&self) -> DeploymentsApi {
        DeploymentsApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner.base_url.join(path).map_err(ApiError::from)
    }

    /// Make a GET request.
    pub(crate) async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        let response = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .inner
            .http
            .get(url)
            .query(query)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a PUT request, decoding the response body.
    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .inner
            .http
            .put(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_response(response).await
    }

    /// Make a PUT request where the host returns no meaningful body.
    pub(crate) async fn put_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .inner
            .http
            .put(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_unit_response(response).await
    }

    /// Make a PATCH request where the host returns no meaningful body.
    pub(crate) async fn patch_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .inner
            .http
            .patch(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_unit_response(response).await
    }

    /// Make a POST request where the host returns no meaningful body.
    pub(crate) async fn post_unit<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let response = self
            .inner
            .http
            .post(url)
            .json(body)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_unit_response(response).await
    }

    /// Make a bodyless POST request (rerun/cancel style control endpoints).
    pub(crate) async fn post_empty(&self, path: &str) -> Result<()> {
        let url = self.url(path)?;
        let response = self
            .inner
            .http
            .post(url)
            .timeout(self.inner.timeout)
            .send()
            .await?;
        self.handle_unit_response(response).await
    }

    /// Make a GET request and return the raw response for streaming. The
    /// caller owns the body; no read timeout is applied beyond connect.
    pub(crate) async fn get_stream(&self, path: &str) -> Result<reqwest::Response> {
        let url = self.url(path)?;
        let response = self.inner.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(self.extract_error(response).await);
        }
        Ok(response)
    }

    /// Handle a response, extracting the body or error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    async fn handle_unit_response(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Classify a failed response into the error taxonomy.
    async fn extract_error(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = match response.json::<ErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => format!("HTTP {status}"),
        };
        tracing::debug!(status, %message, "host returned an error response");
        ApiError::from_status(status, message)
    }
}

/// Builder for creating a [`RepoHost`].
#[derive(Debug)]
pub struct HostBuilder {
    base_url: String,
    token: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl HostBuilder {
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the API base URL (enterprise hosts, mock servers in tests).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<RepoHost> {
        // Parse and normalize base URL so join() keeps the full path.
        let mut base_url = Url::parse(&self.base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::Config("invalid token".to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("overture/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(RepoHost {
            inner: Arc::new(ClientInner {
                http,
                base_url,
                timeout: self.timeout,
            }),
        })
    }
}

impl Default for HostBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_public_host() {
        let host = RepoHost::builder().build().unwrap();
        assert_eq!(host.base_url().as_str(), "https://api.github.com/");
    }

    #[test]
    fn builder_normalizes_trailing_slash() {
        let host = RepoHost::builder()
            .base_url("http://localhost:9999/api")
            .build()
            .unwrap();
        assert_eq!(host.base_url().as_str(), "http://localhost:9999/api/");
    }

    #[test]
    fn url_building_joins_under_base_path() {
        let host = RepoHost::builder()
            .base_url("http://localhost:9999")
            .build()
            .unwrap();

        let url = host.url("repos/acme/api/contents/wf.yml").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9999/repos/acme/api/contents/wf.yml"
        );

        let url = host.url("/repos/acme/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9999/repos/acme/api");
    }
}
