//! Vote tally extraction from a result page's HTML.
//!
//! Result pages render the tally as a table where each party label cell is
//! immediately followed by its vote count. The table is flattened into its
//! `<td>` cells (row-major) and every catalog party is resolved with a
//! three-stage fallback: exact label, alternate spelling, then substring.

use std::sync::{Arc, OnceLock};

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::catalog::{Party, PartyCatalog};

/// Value recorded for a party that could not be found on a page.
pub const NOT_FOUND: &str = "-";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("page has {tables_found} table(s), results table needs at least {required}")]
    SchemaMismatch { tables_found: usize, required: usize },
}

/// Which fallback stage resolved a party's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStage {
    Exact,
    Alternate,
    Substring,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyTally {
    pub party: String,
    pub value: String,
    pub stage: MatchStage,
}

/// Extracted values, one per catalog party in catalog order.
///
/// Empty only when the page did not contain the results table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyTallies {
    tallies: Vec<PartyTally>,
}

impl PartyTallies {
    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    /// Value for `party`, or `None` if the party is not in the catalog.
    pub fn get(&self, party: &str) -> Option<&str> {
        self.tallies
            .iter()
            .find(|t| t.party == party)
            .map(|t| t.value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartyTally> {
        self.tallies.iter()
    }

    /// Values in catalog order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.tallies.iter().map(|t| t.value.as_str())
    }

    /// Number of parties resolved by any stage.
    pub fn found_count(&self) -> usize {
        self.tallies
            .iter()
            .filter(|t| t.stage != MatchStage::NotFound)
            .count()
    }
}

/// Positional choice of the results table among all `<table>` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSelector {
    index: usize,
}

impl TableSelector {
    /// Selects the table at `index` (0-based, document order).
    pub const fn nth(index: usize) -> Self {
        Self { index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Minimum number of tables a page needs for the selection to succeed.
    pub fn required_tables(&self) -> usize {
        self.index + 1
    }

    pub fn select<'a>(&self, tables: &[ElementRef<'a>]) -> Option<ElementRef<'a>> {
        tables.get(self.index).copied()
    }
}

impl Default for TableSelector {
    /// The second table on the page holds the results.
    fn default() -> Self {
        Self::nth(1)
    }
}

/// Turns page HTML into [`PartyTallies`] for a fixed catalog.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    catalog: Arc<PartyCatalog>,
    table: TableSelector,
}

impl TableExtractor {
    pub fn new(catalog: Arc<PartyCatalog>) -> Self {
        Self {
            catalog,
            table: TableSelector::default(),
        }
    }

    pub fn with_table_selector(mut self, table: TableSelector) -> Self {
        self.table = table;
        self
    }

    pub fn catalog(&self) -> &PartyCatalog {
        &self.catalog
    }

    pub fn table_selector(&self) -> TableSelector {
        self.table
    }

    /// Extracts tallies, returning an empty result when the page lacks the
    /// results table.
    pub fn extract(&self, html: &str) -> PartyTallies {
        self.try_extract(html).unwrap_or_default()
    }

    /// Extracts tallies, reporting why a page could not be used.
    pub fn try_extract(&self, html: &str) -> Result<PartyTallies, ExtractError> {
        let cells = self.table_cells(html)?;
        Ok(self.resolve_cells(&cells))
    }

    /// Resolves every catalog party against already-normalized cells.
    pub fn resolve_cells(&self, cells: &[String]) -> PartyTallies {
        let tallies = self
            .catalog
            .parties()
            .iter()
            .map(|party| {
                let (value, stage) = resolve_party(party, cells);
                tracing::debug!("{} resolved to {:?} via {:?}", party.id, value, stage);
                PartyTally {
                    party: party.id.clone(),
                    value: value.to_string(),
                    stage,
                }
            })
            .collect();
        PartyTallies { tallies }
    }

    fn table_cells(&self, html: &str) -> Result<Vec<String>, ExtractError> {
        let doc = Html::parse_document(html);
        let tables: Vec<ElementRef<'_>> = doc.select(table_tag()).collect();
        let table = self
            .table
            .select(&tables)
            .ok_or(ExtractError::SchemaMismatch {
                tables_found: tables.len(),
                required: self.table.required_tables(),
            })?;

        Ok(table
            .select(cell_tag())
            .map(|td| normalize_cell(&td.text().collect::<String>()))
            .collect())
    }
}

fn table_tag() -> &'static Selector {
    static TABLE: OnceLock<Selector> = OnceLock::new();
    TABLE.get_or_init(|| Selector::parse("table").expect("static selector"))
}

fn cell_tag() -> &'static Selector {
    static CELL: OnceLock<Selector> = OnceLock::new();
    CELL.get_or_init(|| Selector::parse("td").expect("static selector"))
}

/// Trims, upper-cases, and converts decimal commas to points.
pub fn normalize_cell(text: &str) -> String {
    text.trim().to_uppercase().replace(',', ".")
}

fn resolve_party<'a>(party: &Party, cells: &'a [String]) -> (&'a str, MatchStage) {
    let label = normalize_cell(&party.id);

    if let Some(value) = value_after(cells, cells.iter().position(|c| *c == label)) {
        return (value, MatchStage::Exact);
    }

    for alternate in &party.alternates {
        let alternate = normalize_cell(alternate);
        if let Some(value) = value_after(cells, cells.iter().position(|c| *c == alternate)) {
            return (value, MatchStage::Alternate);
        }
    }

    // e.g. "ÖVP LISTE KURZ"
    if let Some(value) = value_after(cells, cells.iter().position(|c| c.contains(&label))) {
        return (value, MatchStage::Substring);
    }

    (NOT_FOUND, MatchStage::NotFound)
}

/// Cell following the label at `label_pos`; `None` if the label is the last cell.
fn value_after(cells: &[String], label_pos: Option<usize>) -> Option<&str> {
    label_pos
        .and_then(|i| cells.get(i + 1))
        .map(String::as_str)
}
