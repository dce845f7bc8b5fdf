//! Async HTTP client wrapping reqwest.
//!
//! One request per call, no retry. A timeout applies only when the
//! configuration sets one.

use crate::config::FetchConfig;
use crate::types::{FetchError, FetchResult};

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Requested URL.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turn a non-2xx response into `FetchError::Remote`.
    pub fn error_for_status(self) -> FetchResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::Remote {
                status: self.status,
                url: self.url,
            })
        }
    }
}

/// HTTP client shared by the fetchers.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Build a client with the configured user agent and optional timeout.
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        let mut builder = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(config.user_agent.as_str());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build()?;
        Ok(Self { client })
    }

    /// Perform a single GET request.
    ///
    /// Any HTTP status is returned as `Ok`; only failures to obtain a
    /// response become `FetchError::Transport`.
    pub async fn get(&self, url: &str) -> FetchResult<HttpResponse> {
        self.get_with_query(url, &[]).await
    }

    /// GET with URL-encoded query parameters.
    pub async fn get_with_query(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> FetchResult<HttpResponse> {
        tracing::debug!("GET {url}");

        let mut request = self.client.get(url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let r = request.send().await?;
        let status = r.status().as_u16();
        let body = r.text().await?;

        Ok(HttpResponse {
            url: url.to_string(),
            status,
            body,
        })
    }
}

/// Join a base URL and a path segment with exactly one slash.
pub(crate) fn join_url(base: &str, segment: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), segment)
}
