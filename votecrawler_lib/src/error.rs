//! Error types for the library layer.

use std::fmt;

use crate::catalog::CatalogError;
use crate::entry::EntryError;

/// Fatal errors: bad configuration or input discovered before a batch starts.
///
/// Per-page failures are not represented here; they are recorded in each
/// [`PageOutcome`](crate::batch::PageOutcome) instead.
#[derive(Debug)]
pub enum VoteCrawlerError {
    /// A line of the URL list does not carry the expected name/Sprengel tokens.
    MalformedUrl {
        line: usize,
        url: String,
        source: EntryError,
    },
    /// The party catalog could not be loaded or failed validation.
    Catalog(CatalogError),
    /// The shared HTTP client could not be built.
    Http(votecrawler_http::Error),
}

impl fmt::Display for VoteCrawlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedUrl { line, url, source } => {
                write!(f, "Malformed URL on line {}: {} ({})", line, url, source)
            }
            Self::Catalog(e) => write!(f, "Catalog error: {}", e),
            Self::Http(e) => write!(f, "HTTP client error: {}", e),
        }
    }
}

impl std::error::Error for VoteCrawlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedUrl { source, .. } => Some(source),
            Self::Catalog(e) => Some(e),
            Self::Http(e) => Some(e),
        }
    }
}

impl From<CatalogError> for VoteCrawlerError {
    fn from(e: CatalogError) -> Self {
        Self::Catalog(e)
    }
}

impl From<votecrawler_http::Error> for VoteCrawlerError {
    fn from(e: votecrawler_http::Error) -> Self {
        Self::Http(e)
    }
}
