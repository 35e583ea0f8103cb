//! Splits batch outcomes into output rows and broken URLs.

use std::fmt;

use serde::Serialize;

use crate::batch::{PageError, PageOutcome};
use crate::catalog::PartyCatalog;
use crate::entry::UrlEntry;
use crate::extract::{ExtractError, NOT_FOUND};

/// Header of the key column in the results table.
pub const KEY_HEADER: &str = "Gemeinde-Sprengel";

/// One results-table row: `<name>-<sprengel>` plus values in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub key: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokenReason {
    /// The page could not be fetched.
    FetchFailed(String),
    /// The page was fetched but did not contain the results table.
    SchemaMismatch,
    /// The unit of work died before reporting.
    TaskFailed(String),
}

impl BrokenReason {
    fn from_error(error: &PageError) -> Self {
        match error {
            PageError::Fetch(e) => Self::FetchFailed(e.to_string()),
            PageError::Extract(ExtractError::SchemaMismatch { .. }) => Self::SchemaMismatch,
            PageError::TaskFailed(msg) => Self::TaskFailed(msg.clone()),
        }
    }
}

impl fmt::Display for BrokenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailed(msg) => write!(f, "fetch failed: {}", msg),
            Self::SchemaMismatch => f.write_str("no results table"),
            Self::TaskFailed(msg) => write!(f, "task failed: {}", msg),
        }
    }
}

/// A URL that produced no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenUrl {
    pub url: String,
    pub reason: BrokenReason,
}

/// Broken URL counts per reason.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrokenSummary {
    pub fetch_failed: usize,
    pub schema_mismatch: usize,
    pub task_failed: usize,
}

impl BrokenSummary {
    pub fn total(&self) -> usize {
        self.fetch_failed + self.schema_mismatch + self.task_failed
    }
}

/// Rows and broken URLs, both in input order.
#[derive(Debug, Default)]
pub struct AggregateReport {
    pub rows: Vec<OutputRow>,
    pub broken: Vec<BrokenUrl>,
}

impl AggregateReport {
    /// `Gemeinde-Sprengel` followed by the catalog's party ids.
    pub fn header(catalog: &PartyCatalog) -> Vec<String> {
        std::iter::once(KEY_HEADER)
            .chain(catalog.ids())
            .map(str::to_string)
            .collect()
    }

    pub fn broken_urls(&self) -> impl Iterator<Item = &str> {
        self.broken.iter().map(|b| b.url.as_str())
    }

    pub fn broken_summary(&self) -> BrokenSummary {
        let mut summary = BrokenSummary::default();
        for broken in &self.broken {
            match broken.reason {
                BrokenReason::FetchFailed(_) => summary.fetch_failed += 1,
                BrokenReason::SchemaMismatch => summary.schema_mismatch += 1,
                BrokenReason::TaskFailed(_) => summary.task_failed += 1,
            }
        }
        summary
    }
}

/// Pairs each entry with the outcome at the same index.
///
/// Fetch failures and empty extractions become broken URLs; everything else
/// becomes a row, including rows where every party is `"-"`.
pub fn aggregate(
    entries: &[UrlEntry],
    outcomes: Vec<PageOutcome>,
    catalog: &PartyCatalog,
) -> AggregateReport {
    debug_assert_eq!(entries.len(), outcomes.len());

    let mut report = AggregateReport::default();
    for (entry, outcome) in entries.iter().zip(outcomes) {
        let tallies = match &outcome.result {
            Ok(tallies) if !tallies.is_empty() => tallies,
            Ok(_) => {
                report.broken.push(BrokenUrl {
                    url: entry.url.clone(),
                    reason: BrokenReason::SchemaMismatch,
                });
                continue;
            }
            Err(e) => {
                report.broken.push(BrokenUrl {
                    url: entry.url.clone(),
                    reason: BrokenReason::from_error(e),
                });
                continue;
            }
        };

        let values = catalog
            .ids()
            .map(|id| tallies.get(id).unwrap_or(NOT_FOUND).to_string())
            .collect();
        report.rows.push(OutputRow {
            key: entry.key(),
            values,
        });
    }
    report
}
