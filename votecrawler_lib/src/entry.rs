//! URL list entries and the municipality/Sprengel key embedded in them.

use std::fmt;

use thiserror::Error;
use url::Url;

use crate::error::VoteCrawlerError;

/// Query token carrying the Sprengel (voting subdivision) number.
pub const SPRENGEL_TOKEN: &str = "detailonr=";

/// Why a single URL could not be turned into an entry.
#[derive(Error, Debug)]
pub enum EntryError {
    #[error("not an absolute URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("no municipality name segment")]
    MissingName,
    #[error("no `detailonr=` value")]
    MissingSprengel,
}

/// One line of the URL list with its identifier pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    pub url: String,
    pub name: String,
    pub sprengel: String,
}

impl UrlEntry {
    /// Parses a URL and derives its `(name, sprengel)` pair.
    ///
    /// The name is the second `.`-separated segment, cut at the first
    /// `/`, `?`, `#` or `:`. The Sprengel is the `detailonr=` value, up to
    /// the next `&` or the end of the URL.
    pub fn parse(url: &str) -> Result<Self, EntryError> {
        let url = url.trim();
        Url::parse(url)?;

        let name = url
            .split('.')
            .nth(1)
            .and_then(|segment| {
                segment
                    .split(|c: char| matches!(c, '/' | '?' | '#' | ':'))
                    .next()
            })
            .filter(|name| !name.is_empty())
            .ok_or(EntryError::MissingName)?;

        let sprengel = url
            .split_once(SPRENGEL_TOKEN)
            .and_then(|(_, rest)| rest.split('&').next())
            .filter(|value| !value.is_empty())
            .ok_or(EntryError::MissingSprengel)?;

        Ok(Self {
            url: url.to_string(),
            name: name.to_string(),
            sprengel: sprengel.to_string(),
        })
    }

    /// Row key, `<name>-<sprengel>`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.name, self.sprengel)
    }
}

impl AsRef<str> for UrlEntry {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for UrlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Parses a URL list, one URL per line.
///
/// Surrounding whitespace is trimmed and blank lines are skipped. The first
/// malformed line aborts parsing with its 1-based line number, so bad input
/// is reported before any request goes out.
pub fn parse_url_list(content: &str) -> Result<Vec<UrlEntry>, VoteCrawlerError> {
    let mut entries = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry = UrlEntry::parse(line).map_err(|source| VoteCrawlerError::MalformedUrl {
            line: idx + 1,
            url: line.to_string(),
            source,
        })?;
        entries.push(entry);
    }
    Ok(entries)
}
