//! Error types for the page client.

/// Errors that can occur when fetching a results page.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),
    /// The URL could not be parsed.
    #[error("Invalid URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The request failed before a response arrived (connect error, timeout).
    #[error("Request to {url} failed")]
    RequestFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The response body could not be read or decoded.
    #[error("Failed to read response body from {url}")]
    BodyRead {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}
