//! Bible Version Codes
//!
//! Loads the hand-curated `BibleVersionCodes.xml` catalogue of Bible versions,
//! validates it against a declarative schema, and derives lookup tables from it.
//!
//! ## Features
//!
//! - **Schema-driven validation**: compulsory/optional elements and attributes,
//!   plus catalogue-wide uniqueness, all reported as diagnostics
//! - **Best-effort loading**: every record is checked in one pass; only a wrong
//!   root tag aborts
//! - **Indexed views**: sorted abbreviations, an abbreviation dictionary, and
//!   one-to-many indices by name, language, publisher, licence and web link
//! - **Writers**: JSON, C tables, Rust const tables, and a checksum-keyed cache
//!
//! ## Pipeline
//!
//! ```text
//! BibleVersionCodes.xml
//!   └─ xml::read_path ──► SourceDocument
//!        └─ CatalogLoader::load ──► Catalog + Diagnostics
//!             └─ CatalogIndexer::build ──► IndexedCatalog
//!                  └─ Exporter::write ──► derivedFormats/
//! ```

pub mod cache;
pub mod catalog;
pub mod checksum;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod index;
pub mod loader;
pub mod schema;
pub mod source;
pub mod xml;

pub use cache::DatasetCache;
pub use catalog::{Catalog, CatalogHeader, VersionEntry};
pub use checksum::Checksum;
pub use config::ConverterConfig;
pub use diagnostics::{Diagnostic, DiagnosticClass, DiagnosticCode, Diagnostics, Severity};
pub use error::{CatalogError, Result};
pub use export::{ExportFormat, ExportInput, Exporter};
pub use index::{AbbreviationRecord, AbbreviationTable, CatalogIndexer, IndexedCatalog, Resolution};
pub use loader::CatalogLoader;
pub use schema::{CatalogLayout, SchemaDescriptor};
pub use source::{SourceDocument, SourceElement};
