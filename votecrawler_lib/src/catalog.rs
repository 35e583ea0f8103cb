//! Party catalog: the ordered set of parties whose tallies are extracted.
//!
//! The built-in catalog is embedded at compile time from
//! `seed_data/parties.yml`; a replacement with the same schema can be
//! loaded at runtime.

use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Error types for catalog operations.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse party catalog YAML: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Party catalog is empty")]
    Empty,
    #[error("Party catalog contains an entry with an empty id")]
    EmptyId,
    #[error("Duplicate party id in catalog: {0}")]
    DuplicateParty(String),
}

#[derive(Deserialize, Debug)]
struct CatalogFile {
    parties: Vec<Party>,
}

/// A single catalog party.
///
/// `id` is the official abbreviation and doubles as the CSV column header.
/// `alternates` are spellings used by some pages instead of the id
/// (e.g. "DIE GRÜNEN" for "GRÜNE"), tried in order.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub id: String,
    #[serde(default)]
    pub alternates: Vec<String>,
}

impl Party {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alternates: Vec::new(),
        }
    }

    pub fn with_alternate(mut self, alternate: impl Into<String>) -> Self {
        self.alternates.push(alternate.into());
        self
    }
}

/// Ordered, validated list of parties. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyCatalog {
    parties: Vec<Party>,
}

impl PartyCatalog {
    /// Builds a catalog, rejecting empty catalogs, empty ids and duplicates.
    pub fn new(parties: Vec<Party>) -> Result<Self, CatalogError> {
        if parties.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for party in &parties {
            if party.id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(party.id.as_str()) {
                return Err(CatalogError::DuplicateParty(party.id.clone()));
            }
        }
        Ok(Self { parties })
    }

    /// Parses a catalog from YAML content.
    pub fn from_yaml(yaml_content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yml::from_str(yaml_content)?;
        Self::new(file.parties)
    }

    /// Loads the catalog embedded at compile time.
    pub fn builtin() -> Result<Self, CatalogError> {
        let yaml_content = include_str!("../../seed_data/parties.yml");
        Self::from_yaml(yaml_content)
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    /// Party ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.parties.iter().map(|p| p.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.parties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parties.is_empty()
    }
}
