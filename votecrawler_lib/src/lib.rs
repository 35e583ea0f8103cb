//! Library layer for the vote crawler: URL list parsing, party catalog,
//! tally extraction, concurrent batch fetching, and result aggregation.
//!
//! Page retrieval itself lives in the `votecrawler_http` crate.

pub mod aggregate;
pub mod batch;
pub mod catalog;
pub mod entry;
pub mod error;
pub mod extract;

pub use votecrawler_http;
pub use votecrawler_http::{Client, ClientConfig};

pub use aggregate::{aggregate, AggregateReport, BrokenReason, BrokenSummary, BrokenUrl, OutputRow};
pub use batch::{BatchCoordinator, PageError, PageOutcome};
pub use catalog::{CatalogError, Party, PartyCatalog};
pub use entry::{parse_url_list, EntryError, UrlEntry};
pub use error::VoteCrawlerError;
pub use extract::{ExtractError, MatchStage, PartyTallies, PartyTally, TableExtractor, TableSelector, NOT_FOUND};
