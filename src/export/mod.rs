//! Writers for the derived datasets
//!
//! Every writer consumes an [`ExportInput`] (the indexed views plus the
//! header metadata they were built from) and reports the files it wrote.
//! Writers never look at the source document.

pub mod c;
pub mod json;
pub mod rust;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::cache::DatasetCache;
use crate::catalog::{Catalog, CatalogHeader, VersionEntry};
use crate::checksum::Checksum;
use crate::config::OutputFormat;
use crate::error::{CatalogError, Result};
use crate::index::{IndexedCatalog, VIEW_NAMES};

/// A derived file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    /// A `.h`/`.c` pair of fixed-width tables
    C,
    /// A `.rs` module of const tables
    Rust,
    /// The JSON dataset cache keyed by source checksum
    Cache,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [Self::Json, Self::C, Self::Rust, Self::Cache];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::C => "c",
            Self::Rust => "rust",
            Self::Cache => "cache",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "c" => Ok(Self::C),
            "rust" | "rs" => Ok(Self::Rust),
            "cache" => Ok(Self::Cache),
            other => Err(format!("unknown export format {other:?} (expected json, c, rust or cache)")),
        }
    }
}

/// What the writers need from a loaded catalogue
#[derive(Debug, Clone, Copy)]
pub struct ExportInput<'a> {
    pub header: &'a CatalogHeader,
    pub indexed: &'a IndexedCatalog,
    pub source_checksum: Option<&'a Checksum>,
}

impl<'a> ExportInput<'a> {
    pub fn new(catalog: &'a Catalog, indexed: &'a IndexedCatalog) -> Self {
        Self {
            header: &catalog.header,
            indexed,
            source_checksum: catalog.source_checksum.as_ref(),
        }
    }
}

/// Writes derived files into one directory under one base name
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
    base_name: String,
    output_format: OutputFormat,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>, base_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            base_name: base_name.into(),
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_output_format(mut self, output_format: OutputFormat) -> Self {
        self.output_format = output_format;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn path(&self, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", self.base_name, suffix))
    }

    /// Write one format, returning the paths written
    pub fn write(&self, format: ExportFormat, input: &ExportInput<'_>) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)?;

        let written = match format {
            ExportFormat::Json => {
                let path = self.path(".json");
                std::fs::write(&path, json::render(input.indexed, self.output_format)?)?;
                vec![path]
            }
            ExportFormat::C => {
                let header_path = self.path("_Tables.h");
                let source_path = self.path("_Tables.c");
                let header_name = header_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let tables = c::render(input, &self.base_name, &header_name);
                std::fs::write(&header_path, tables.header)?;
                std::fs::write(&source_path, tables.source)?;
                vec![header_path, source_path]
            }
            ExportFormat::Rust => {
                let path = self.path("_Tables.rs");
                std::fs::write(&path, rust::render(input))?;
                vec![path]
            }
            ExportFormat::Cache => {
                let checksum = input.source_checksum.ok_or_else(|| {
                    CatalogError::Cache("the source checksum is unknown".to_string())
                })?;
                let path = self.path(".cache.json");
                DatasetCache::new(checksum.clone(), input.indexed.clone()).write(&path)?;
                vec![path]
            }
        };

        for path in &written {
            info!(format = %format, path = %path.display(), "Exported");
        }
        Ok(written)
    }

    /// Write several formats in order
    pub fn write_all(&self, formats: &[ExportFormat], input: &ExportInput<'_>) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for format in formats {
            written.extend(self.write(*format, input)?);
        }
        Ok(written)
    }
}

// =============================================================================
// Tables
// =============================================================================

/// One view flattened into rows of columns, for the table writers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// Exported view name, e.g. `languageIndex`
    pub name: &'static str,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub optional: bool,
}

impl Table {
    /// Longest value in a column, in bytes
    pub fn max_len(&self, column: usize) -> usize {
        self.rows
            .iter()
            .filter_map(|row| row.get(column).and_then(|v| v.as_deref()))
            .map(str::len)
            .max()
            .unwrap_or(0)
    }
}

const ENTRY_COLUMNS: [Column; 6] = [
    Column { name: "mainAbbreviation", optional: false },
    Column { name: "versionName", optional: false },
    Column { name: "languageCode", optional: false },
    Column { name: "publisherName", optional: true },
    Column { name: "licence", optional: true },
    Column { name: "webLink", optional: true },
];

fn entry_row(entry: &VersionEntry) -> Vec<Option<String>> {
    vec![
        Some(entry.main_abbreviation.clone()),
        Some(entry.version_name.clone()),
        Some(entry.language_code.clone()),
        entry.publisher_name.clone(),
        entry.licence.clone(),
        entry.web_link.clone(),
    ]
}

/// Every view as a table, in export order
///
/// One-to-many views become one row per (key, member) pair.
pub fn tables(indexed: &IndexedCatalog) -> Vec<Table> {
    let mut tables = vec![
        Table {
            name: VIEW_NAMES[0],
            columns: vec![ENTRY_COLUMNS[0]],
            rows: indexed
                .abbreviation_list
                .iter()
                .map(|abbreviation| vec![Some(abbreviation.clone())])
                .collect(),
        },
        Table {
            name: VIEW_NAMES[1],
            columns: ENTRY_COLUMNS.to_vec(),
            rows: indexed
                .abbreviation_index
                .iter()
                .map(|(abbreviation, record)| {
                    vec![
                        Some(abbreviation.clone()),
                        Some(record.version_name.clone()),
                        Some(record.language_code.clone()),
                        record.publisher_name.clone(),
                        record.licence.clone(),
                        record.web_link.clone(),
                    ]
                })
                .collect(),
        },
    ];

    for name in VIEW_NAMES.into_iter().skip(2) {
        let Some(grouped) = indexed.grouped(name) else {
            continue;
        };
        let mut columns = vec![Column { name: "key", optional: false }];
        columns.extend(ENTRY_COLUMNS);
        let rows = grouped
            .iter()
            .flat_map(|(key, members)| {
                members.iter().map(move |entry| {
                    let mut row = vec![Some(key.clone())];
                    row.extend(entry_row(entry));
                    row
                })
            })
            .collect();
        tables.push(Table { name, columns, rows });
    }
    tables
}

/// One-line description of where the tables came from
pub fn banner(header: &CatalogHeader) -> String {
    let mut banner = header
        .title
        .clone()
        .unwrap_or_else(|| "Bible version codes".to_string());
    if let Some(version) = &header.version {
        banner.push_str(&format!(" v{version}"));
    }
    if let Some(date) = &header.date {
        banner.push_str(&format!(" ({date})"));
    }
    banner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::index_entries;

    fn sample() -> (CatalogHeader, IndexedCatalog, Checksum) {
        let header = CatalogHeader {
            title: Some("Bible version codes".to_string()),
            version: Some("0.51".to_string()),
            date: Some("2022-05-18".to_string()),
        };
        let indexed = index_entries(&[
            VersionEntry::new("KJV", "King James Version", "en").with_licence("Public Domain"),
            VersionEntry::new("WEB", "World English Bible", "en").with_web_link("https://worldenglish.bible"),
        ]);
        (header, indexed, Checksum::of_text("source"))
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("rs".parse::<ExportFormat>().unwrap(), ExportFormat::Rust);
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_write_all_formats() {
        let (header, indexed, checksum) = sample();
        let input = ExportInput {
            header: &header,
            indexed: &indexed,
            source_checksum: Some(&checksum),
        };
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path(), "BibleVersionCodes");

        let written = exporter.write_all(&ExportFormat::ALL, &input).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "BibleVersionCodes.json",
                "BibleVersionCodes_Tables.h",
                "BibleVersionCodes_Tables.c",
                "BibleVersionCodes_Tables.rs",
                "BibleVersionCodes.cache.json",
            ]
        );
        for path in &written {
            assert!(path.exists());
        }
    }

    #[test]
    fn test_cache_needs_checksum() {
        let (header, indexed, _) = sample();
        let input = ExportInput {
            header: &header,
            indexed: &indexed,
            source_checksum: None,
        };
        let dir = tempfile::tempdir().unwrap();
        let err = Exporter::new(dir.path(), "BVC")
            .write(ExportFormat::Cache, &input)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Cache(_)));
    }

    #[test]
    fn test_tables_flatten_groups() {
        let (header, indexed, _) = sample();
        let tables = tables(&indexed);
        assert_eq!(tables.len(), VIEW_NAMES.len());

        let language = tables.iter().find(|t| t.name == "languageIndex").unwrap();
        assert_eq!(language.columns.len(), 7);
        assert_eq!(language.rows.len(), 2);
        assert_eq!(language.rows[1][0].as_deref(), Some("en"));
        assert_eq!(language.rows[1][1].as_deref(), Some("WEB"));
        assert_eq!(language.max_len(2), "World English Bible".len());

        let licence = tables.iter().find(|t| t.name == "licenceIndex").unwrap();
        assert_eq!(licence.rows.len(), 1);

        assert_eq!(banner(&header), "Bible version codes v0.51 (2022-05-18)");
        assert_eq!(banner(&CatalogHeader::default()), "Bible version codes");
    }
}
