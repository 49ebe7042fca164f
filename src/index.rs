//! Indexed views of a loaded catalogue
//!
//! [`CatalogIndexer`] pivots the flat entry list into the lookup tables the
//! exporters write: a sorted abbreviation list, an abbreviation dictionary, and
//! one-to-many dictionaries keyed by name, language, publisher, licence and
//! web link. The result is computed once per indexer and then shared.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::catalog::{Catalog, VersionEntry};

/// Entries sharing one key, in document order
pub type Grouped = BTreeMap<String, Vec<VersionEntry>>;

/// Everything known about a version apart from its abbreviation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbbreviationRecord {
    pub version_name: String,
    pub language_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_link: Option<String>,
}

impl From<&VersionEntry> for AbbreviationRecord {
    fn from(entry: &VersionEntry) -> Self {
        Self {
            version_name: entry.version_name.clone(),
            language_code: entry.language_code.clone(),
            publisher_name: entry.publisher_name.clone(),
            licence: entry.licence.clone(),
            web_link: entry.web_link.clone(),
        }
    }
}

/// The derived datasets of one catalogue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedCatalog {
    /// Every main abbreviation, sorted, duplicates kept
    pub abbreviation_list: Vec<String>,
    /// Main abbreviation to the rest of the entry; later entries replace earlier ones
    pub abbreviation_index: BTreeMap<String, AbbreviationRecord>,
    pub name_index: Grouped,
    pub language_index: Grouped,
    pub publisher_index: Grouped,
    pub licence_index: Grouped,
    pub web_link_index: Grouped,
    /// Surface abbreviation lookup, kept in memory only
    #[serde(skip)]
    pub abbreviation_lookup: AbbreviationTable,
}

/// Names of the exported views, in export order
pub const VIEW_NAMES: [&str; 7] = [
    "abbreviationList",
    "abbreviationIndex",
    "nameIndex",
    "languageIndex",
    "publisherIndex",
    "licenceIndex",
    "webLinkIndex",
];

impl IndexedCatalog {
    /// One of the grouped views by its exported name
    pub fn grouped(&self, view: &str) -> Option<&Grouped> {
        match view {
            "nameIndex" => Some(&self.name_index),
            "languageIndex" => Some(&self.language_index),
            "publisherIndex" => Some(&self.publisher_index),
            "licenceIndex" => Some(&self.licence_index),
            "webLinkIndex" => Some(&self.web_link_index),
            _ => None,
        }
    }

    /// Rebuild the in-memory lookup table, e.g. after deserializing
    pub fn restore_lookup(&mut self) {
        let mut lookup = AbbreviationTable::new();
        for abbreviation in &self.abbreviation_list {
            lookup.insert(&abbreviation.to_uppercase(), abbreviation);
        }
        self.abbreviation_lookup = lookup;
    }
}

// =============================================================================
// Abbreviation lookup
// =============================================================================

/// What a surface abbreviation resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Canonical(String),
    /// Two or more different canonical abbreviations claimed this surface form
    Ambiguous,
}

/// Maps surface abbreviations to canonical ones, marking proven ambiguity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationTable {
    entries: BTreeMap<String, Resolution>,
}

impl AbbreviationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `surface` stands for `canonical`.
    ///
    /// A surface form claimed by two different canonical values becomes
    /// [`Resolution::Ambiguous`] and stays that way.
    pub fn insert(&mut self, surface: &str, canonical: &str) {
        match self.entries.get_mut(surface) {
            None => {
                self.entries
                    .insert(surface.to_string(), Resolution::Canonical(canonical.to_string()));
            }
            Some(Resolution::Canonical(existing)) if existing == canonical => {}
            Some(slot) => {
                let previous = match slot {
                    Resolution::Canonical(existing) => existing.clone(),
                    Resolution::Ambiguous => "multiple values".to_string(),
                };
                warn!(
                    surface,
                    canonical,
                    previous = %previous,
                    "Abbreviation already assigned to a different version"
                );
                *slot = Resolution::Ambiguous;
            }
        }
    }

    pub fn get(&self, surface: &str) -> Option<&Resolution> {
        self.entries.get(surface)
    }

    /// Canonical abbreviation for `surface`, unless unknown or ambiguous
    pub fn resolve(&self, surface: &str) -> Option<&str> {
        match self.entries.get(surface)? {
            Resolution::Canonical(canonical) => Some(canonical),
            Resolution::Ambiguous => None,
        }
    }

    pub fn is_ambiguous(&self, surface: &str) -> bool {
        matches!(self.entries.get(surface), Some(Resolution::Ambiguous))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Indexer
// =============================================================================

/// Builds, and remembers, the derived datasets of one catalogue
#[derive(Debug)]
pub struct CatalogIndexer<'a> {
    catalog: &'a Catalog,
    built: OnceLock<IndexedCatalog>,
}

impl<'a> CatalogIndexer<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            built: OnceLock::new(),
        }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    /// The derived datasets; computed on the first call only
    pub fn build(&self) -> &IndexedCatalog {
        if let Some(built) = self.built.get() {
            debug!("Reusing indexed catalogue");
            return built;
        }
        self.built.get_or_init(|| index_entries(&self.catalog.entries))
    }

    /// Whether `build` has already run
    pub fn is_built(&self) -> bool {
        self.built.get().is_some()
    }
}

/// Pivot entries into every view
pub fn index_entries(entries: &[VersionEntry]) -> IndexedCatalog {
    let mut indexed = IndexedCatalog::default();

    for entry in entries {
        let abbreviation = &entry.main_abbreviation;
        indexed.abbreviation_list.push(abbreviation.clone());
        indexed
            .abbreviation_index
            .insert(abbreviation.clone(), AbbreviationRecord::from(entry));
        indexed
            .abbreviation_lookup
            .insert(&abbreviation.to_uppercase(), abbreviation);

        add_to_group(&mut indexed.name_index, Some(&entry.version_name), entry);
        add_to_group(&mut indexed.language_index, Some(&entry.language_code), entry);
        add_to_group(&mut indexed.publisher_index, entry.publisher_name.as_ref(), entry);
        add_to_group(&mut indexed.licence_index, entry.licence.as_ref(), entry);
        add_to_group(&mut indexed.web_link_index, entry.web_link.as_ref(), entry);
    }

    indexed.abbreviation_list.sort();
    indexed
}

/// Append to the key's bucket; blank keys don't qualify
fn add_to_group(group: &mut Grouped, key: Option<&String>, entry: &VersionEntry) {
    if let Some(key) = key.filter(|k| !k.is_empty()) {
        group.entry(key.clone()).or_default().push(entry.clone());
    }
}
