//! HTTP client for municipal election-result pages.

use std::time::Duration;

use url::Url;

use crate::{user_agent::get_user_agent, Error};

/// Settings applied when the underlying connection pool is built.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Per-request timeout. `None` keeps the transport default (no timeout).
    pub timeout: Option<Duration>,
    /// Send a browser-like `User-Agent` header instead of none at all.
    pub browser_user_agent: bool,
}

/// Page client shared by every fetch in a batch.
///
/// Wraps a single `reqwest::Client`, so clones share one connection pool.
/// The client does not interpret page content and never retries.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    /// Creates a client with default settings.
    pub fn new() -> Result<Self, Error> {
        Self::with_config(&ClientConfig::default())
    }

    /// Creates a client with the given timeout and header settings.
    pub fn with_config(config: &ClientConfig) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.browser_user_agent {
            builder = builder.user_agent(get_user_agent());
        }
        let http = builder.build().map_err(Error::ClientBuild)?;
        Ok(Self { http })
    }

    /// Fetches `url` with a single GET and returns the body as text.
    ///
    /// The body is decoded with the charset declared by the response,
    /// falling back to UTF-8.
    pub async fn fetch_page(&self, url: &str) -> Result<String, Error> {
        let parsed = Url::parse(url).map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let resp = self
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|source| {
                tracing::debug!("Failed to get {}: {}", url, source);
                Error::RequestFailed {
                    url: url.to_string(),
                    source,
                }
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| {
            tracing::debug!("Failed to read response body from {}: {}", url, source);
            Error::BodyRead {
                url: url.to_string(),
                source,
            }
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::debug!("{} returned status {}", url, status);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        tracing::debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
