//! Catalogue loader
//!
//! Turns a [`SourceDocument`] into a [`Catalog`], checking every record against a
//! [`SchemaDescriptor`]. Only a wrong root tag stops the load; every other
//! defect is recorded in [`Diagnostics`] and the loader carries on, so the
//! whole document is checked in one pass.
//!
//! A loader loads once. Later calls hand back the catalogue already loaded and,
//! when they name a different source, record an error saying it was ignored.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, error, info, warn};

use crate::catalog::{Catalog, CatalogHeader, VersionEntry};
use crate::diagnostics::{Diagnostic, DiagnosticCode, Diagnostics, Severity};
use crate::error::{CatalogError, Result};
use crate::schema::{fields, CatalogLayout, SchemaDescriptor};
use crate::source::{SourceDocument, SourceElement};
use crate::xml;

/// Loads and validates one catalogue
#[derive(Debug)]
pub struct CatalogLoader {
    schema: SchemaDescriptor,
    layout: CatalogLayout,
    catalog: Option<Catalog>,
    diagnostics: Diagnostics,
}

impl CatalogLoader {
    pub fn new(schema: SchemaDescriptor, layout: CatalogLayout) -> Self {
        Self {
            schema,
            layout,
            catalog: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Loader for `BibleVersionCodes.xml`
    pub fn bible_version_codes() -> Self {
        Self::new(
            SchemaDescriptor::bible_version_codes(),
            CatalogLayout::bible_version_codes(),
        )
    }

    pub fn is_loaded(&self) -> bool {
        self.catalog.is_some()
    }

    pub fn catalog(&self) -> Option<&Catalog> {
        self.catalog.as_ref()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Give up the loader, keeping its catalogue and diagnostics
    pub fn into_parts(self) -> Result<(Catalog, Diagnostics)> {
        let catalog = self.catalog.ok_or(CatalogError::NotLoaded)?;
        Ok((catalog, self.diagnostics))
    }

    /// Load a parsed document.
    ///
    /// Fails only when the root element is not the catalogue tag, in which case
    /// nothing is kept and the loader can be tried again.
    pub fn load(&mut self, source: &SourceDocument) -> Result<&Catalog> {
        if self.catalog.is_some() {
            self.note_repeat_load(&source.origin);
            return self.catalog.as_ref().ok_or(CatalogError::NotLoaded);
        }

        let (catalog, diagnostics) = Ingest::new(&self.schema, &self.layout).run(source)?;
        info!(
            origin = %catalog.origin,
            entries = catalog.len(),
            errors = diagnostics.error_count(),
            warnings = diagnostics.warning_count(),
            "Loaded catalogue"
        );
        self.diagnostics.merge(diagnostics);
        let catalog: &Catalog = self.catalog.insert(catalog);
        Ok(catalog)
    }

    /// Read, parse and load an XML file
    pub fn load_path(&mut self, path: &Path) -> Result<&Catalog> {
        if self.catalog.is_some() {
            self.note_repeat_load(&path.display().to_string());
            return self.catalog.as_ref().ok_or(CatalogError::NotLoaded);
        }
        let source = xml::read_path(path)?;
        self.load(&source)
    }

    /// Parse and load XML text labelled with `origin`
    pub fn load_str(&mut self, origin: &str, text: &str) -> Result<&Catalog> {
        if self.catalog.is_some() {
            self.note_repeat_load(origin);
            return self.catalog.as_ref().ok_or(CatalogError::NotLoaded);
        }
        let source = xml::parse_str(origin, text)?;
        self.load(&source)
    }

    fn note_repeat_load(&mut self, origin: &str) {
        let Some(loaded) = self.catalog.as_ref().map(|c| c.origin.clone()) else {
            return;
        };
        if loaded == origin {
            debug!(origin, "Catalogue already loaded");
            return;
        }
        let diagnostic = Diagnostic::new(
            DiagnosticCode::SourceIgnored,
            format!("Catalogue is already loaded from {loaded:?}; the different source {origin:?} was ignored"),
        );
        log_diagnostic(&diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::bible_version_codes()
    }
}

fn log_diagnostic(diagnostic: &Diagnostic) {
    let code = diagnostic.code.as_str();
    let record = diagnostic.record;
    let field = diagnostic.field.as_deref();
    match diagnostic.severity() {
        Severity::Error => error!(code, ?record, ?field, "{}", diagnostic.message),
        Severity::Warning => warn!(code, ?record, ?field, "{}", diagnostic.message),
        Severity::Info => info!(code, ?record, ?field, "{}", diagnostic.message),
    }
}

// =============================================================================
// Single load pass
// =============================================================================

/// Where a unique value was first seen
type SeenValues = BTreeMap<String, usize>;

struct Ingest<'a> {
    schema: &'a SchemaDescriptor,
    layout: &'a CatalogLayout,
    diagnostics: Diagnostics,
    seen_elements: BTreeMap<&'a str, SeenValues>,
    seen_attributes: BTreeMap<&'a str, SeenValues>,
}

impl<'a> Ingest<'a> {
    fn new(schema: &'a SchemaDescriptor, layout: &'a CatalogLayout) -> Self {
        Self {
            schema,
            layout,
            diagnostics: Diagnostics::new(),
            seen_elements: schema.unique_elements().map(|n| (n, SeenValues::new())).collect(),
            seen_attributes: schema.unique_attributes().map(|n| (n, SeenValues::new())).collect(),
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        log_diagnostic(&diagnostic);
        self.diagnostics.push(diagnostic);
    }

    fn run(mut self, source: &SourceDocument) -> Result<(Catalog, Diagnostics)> {
        let root = &source.root;
        if root.tag != self.layout.root_tag {
            error!(expected = %self.layout.root_tag, found = %root.tag, "Unexpected root element");
            return Err(CatalogError::Structure {
                expected: self.layout.root_tag.clone(),
                found: root.tag.clone(),
            });
        }

        let (header, records) = match root.children.split_first() {
            Some((first, rest)) if first.tag == self.layout.header_tag => {
                (self.read_header(first), rest)
            }
            _ => {
                self.report(Diagnostic::new(
                    DiagnosticCode::MissingHeader,
                    format!("Missing header element (looking for {:?} tag)", self.layout.header_tag),
                ));
                (CatalogHeader::default(), root.children.as_slice())
            }
        };

        let mut entries = Vec::with_capacity(records.len());
        for (index, element) in records.iter().enumerate() {
            if element.tag != self.layout.entry_tag {
                self.report(
                    Diagnostic::new(
                        DiagnosticCode::UnexpectedRecord,
                        format!("Unexpected element: {}", element.tag),
                    )
                    .at_record(index, None),
                );
                if element.has_tail() {
                    self.report(
                        Diagnostic::new(
                            DiagnosticCode::UnexpectedTail,
                            format!("Unexpected tail data after {} element", element.tag),
                        )
                        .at_record(index, None),
                    );
                }
                continue;
            }
            let record_id = self
                .schema
                .key_element()
                .and_then(|key| element.find(key))
                .and_then(SourceElement::trimmed_text);
            self.check_record_structure(element, index, record_id);
            self.check_record_fields(element, index, record_id);
            entries.push(build_entry(element));
        }

        let catalog = Catalog {
            root_tag: root.tag.clone(),
            origin: source.origin.clone(),
            source_checksum: source.checksum.clone(),
            header,
            entries,
        };
        Ok((catalog, self.diagnostics))
    }

    // -------------------------------------------------------------------------
    // Header
    // -------------------------------------------------------------------------

    fn read_header(&mut self, header: &SourceElement) -> CatalogHeader {
        self.check_bare(header, "header");

        if header.children.len() > 1 {
            self.report(Diagnostic::new(
                DiagnosticCode::UnexpectedHeaderContent,
                "Unexpected elements in header",
            ));
        }

        let Some(work) = header.find(&self.layout.work_tag) else {
            self.report(Diagnostic::new(
                DiagnosticCode::MissingWork,
                format!("Missing {} element in header", self.layout.work_tag),
            ));
            return CatalogHeader::default();
        };
        self.check_bare(work, "work in header");

        let text_of = |tag: &str| {
            work.find(tag)
                .and_then(SourceElement::trimmed_text)
                .map(str::to_string)
        };
        CatalogHeader {
            title: text_of("title"),
            version: text_of("version"),
            date: text_of("date"),
        }
    }

    /// Header blocks carry neither text nor attributes
    fn check_bare(&mut self, element: &SourceElement, context: &str) {
        if let Some(text) = element.trimmed_text() {
            self.report(Diagnostic::new(
                DiagnosticCode::UnexpectedText,
                format!("Unexpected {text:?} text in {context}"),
            ));
        }
        if element.has_tail() {
            self.report(Diagnostic::new(
                DiagnosticCode::UnexpectedTail,
                format!("Unexpected tail data after {context}"),
            ));
        }
        for (name, value) in &element.attributes {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::UnexpectedAttribute,
                    format!("Unexpected {name:?} attribute ({value:?}) on {context}"),
                )
                .with_field(name.clone()),
            );
        }
    }

    // -------------------------------------------------------------------------
    // Structural pass
    // -------------------------------------------------------------------------

    fn check_record_structure(&mut self, element: &SourceElement, index: usize, id: Option<&str>) {
        let tag = &element.tag;
        if let Some(text) = element.trimmed_text() {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::UnexpectedText,
                    format!("Unexpected {text:?} text in {tag} element"),
                )
                .at_record(index, id),
            );
        }
        if element.has_tail() {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::UnexpectedTail,
                    format!("Unexpected tail data after {tag} element"),
                )
                .at_record(index, id),
            );
        }
        if self.schema.forbids_elements() && !element.children.is_empty() {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::NestedContent,
                    format!("Unexpected child elements in {tag} element"),
                )
                .at_record(index, id),
            );
        }

        let schema = self.schema;
        for name in schema.compulsory_attributes() {
            match element.attribute(name) {
                None => self.report(
                    Diagnostic::new(
                        DiagnosticCode::MissingCompulsoryAttribute,
                        format!("Compulsory {name:?} attribute is missing from {tag} element"),
                    )
                    .at_record(index, id)
                    .with_field(name.clone()),
                ),
                Some(value) if value.trim().is_empty() => self.report(
                    Diagnostic::new(
                        DiagnosticCode::BlankCompulsoryAttribute,
                        format!("Compulsory {name:?} attribute is blank on {tag} element"),
                    )
                    .at_record(index, id)
                    .with_field(name.clone()),
                ),
                Some(_) => {}
            }
        }
        for name in schema.optional_attributes() {
            if matches!(element.attribute(name), Some(value) if value.trim().is_empty()) {
                self.report(
                    Diagnostic::new(
                        DiagnosticCode::BlankOptionalAttribute,
                        format!("Optional {name:?} attribute is blank on {tag} element"),
                    )
                    .at_record(index, id)
                    .with_field(name.clone()),
                );
            }
        }
        for (name, value) in &element.attributes {
            if !schema.is_declared_attribute(name) {
                self.report(
                    Diagnostic::new(
                        DiagnosticCode::UnexpectedAttribute,
                        format!("Additional {name:?} attribute ({value:?}) found on {tag} element"),
                    )
                    .at_record(index, id)
                    .with_field(name.clone()),
                );
            }
        }

        for name in schema.unique_attributes() {
            if let Some(value) = element.attribute(name).map(str::trim).filter(|v| !v.is_empty()) {
                self.track_unique(FieldKind::Attribute, name, value, index, id);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Field pass
    // -------------------------------------------------------------------------

    fn check_record_fields(&mut self, element: &SourceElement, index: usize, id: Option<&str>) {
        let schema = self.schema;
        for name in schema.compulsory_elements() {
            match element.find(name) {
                None => self.report(
                    Diagnostic::new(
                        DiagnosticCode::MissingCompulsoryElement,
                        format!("Compulsory {name:?} element is missing"),
                    )
                    .at_record(index, id)
                    .with_field(name.clone()),
                ),
                Some(field) => {
                    self.check_field_shape(field, element, index, id);
                    if !field.has_text() {
                        self.report(
                            Diagnostic::new(
                                DiagnosticCode::BlankCompulsoryElement,
                                format!("Compulsory {name:?} element is blank"),
                            )
                            .at_record(index, id)
                            .with_field(name.clone()),
                        );
                    }
                }
            }
        }

        for name in schema.optional_elements() {
            if let Some(field) = element.find(name) {
                self.check_field_shape(field, element, index, id);
                if !field.has_text() {
                    self.report(
                        Diagnostic::new(
                            DiagnosticCode::BlankOptionalElement,
                            format!("Optional {name:?} element is blank"),
                        )
                        .at_record(index, id)
                        .with_field(name.clone()),
                    );
                }
            }
        }

        for name in schema.compulsory_elements().iter().chain(schema.optional_elements()) {
            let count = element.find_all(name).count();
            if count > 1 {
                self.report(
                    Diagnostic::new(
                        DiagnosticCode::RepeatedElement,
                        format!("{name:?} element appears {count} times; only the first is used"),
                    )
                    .at_record(index, id)
                    .with_field(name.clone()),
                );
            }
        }

        for child in &element.children {
            if !schema.is_declared_element(&child.tag) {
                let text = child.trimmed_text().unwrap_or_default();
                self.report(
                    Diagnostic::new(
                        DiagnosticCode::UnexpectedElement,
                        format!("Additional {:?} element ({text:?}) found", child.tag),
                    )
                    .at_record(index, id)
                    .with_field(child.tag.clone()),
                );
            }
        }

        for name in schema.unique_elements() {
            if let Some(value) = element.find(name).and_then(SourceElement::trimmed_text) {
                self.track_unique(FieldKind::Element, name, value, index, id);
            }
        }
    }

    /// A field element holds plain text only
    fn check_field_shape(
        &mut self,
        field: &SourceElement,
        parent: &SourceElement,
        index: usize,
        id: Option<&str>,
    ) {
        let context = format!("{} in {}", field.tag, parent.tag);
        if field.has_tail() {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::UnexpectedTail,
                    format!("Unexpected tail data after {context}"),
                )
                .at_record(index, id)
                .with_field(field.tag.clone()),
            );
        }
        for (name, value) in &field.attributes {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::UnexpectedAttribute,
                    format!("Unexpected {name:?} attribute ({value:?}) on {context}"),
                )
                .at_record(index, id)
                .with_field(field.tag.clone()),
            );
        }
        if !field.children.is_empty() {
            self.report(
                Diagnostic::new(
                    DiagnosticCode::NestedContent,
                    format!("Unexpected child elements in {context}"),
                )
                .at_record(index, id)
                .with_field(field.tag.clone()),
            );
        }
    }

    fn track_unique(
        &mut self,
        kind: FieldKind,
        name: &'a str,
        value: &str,
        index: usize,
        id: Option<&str>,
    ) {
        let seen = match kind {
            FieldKind::Element => self.seen_elements.entry(name).or_default(),
            FieldKind::Attribute => self.seen_attributes.entry(name).or_default(),
        };
        let Some(first) = seen.get(value).copied() else {
            seen.insert(value.to_string(), index);
            return;
        };
        let diagnostic = Diagnostic::new(
            DiagnosticCode::DuplicateValue,
            format!("Found {value:?} data repeated in {name:?} {kind} (first seen in record {first})"),
        )
        .at_record(index, id)
        .with_field(name)
        .colliding_with(first);
        self.report(diagnostic);
    }
}

#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Element,
    Attribute,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Element => write!(f, "element"),
            FieldKind::Attribute => write!(f, "attribute"),
        }
    }
}

fn build_entry(element: &SourceElement) -> VersionEntry {
    let text_of = |tag: &str| {
        element
            .find(tag)
            .and_then(SourceElement::trimmed_text)
            .map(str::to_string)
    };
    VersionEntry {
        main_abbreviation: text_of(fields::MAIN_ABBREVIATION).unwrap_or_default(),
        version_name: text_of(fields::VERSION_NAME).unwrap_or_default(),
        language_code: text_of(fields::LANGUAGE_CODE).unwrap_or_default(),
        publisher_name: text_of(fields::PUBLISHER_NAME),
        licence: text_of(fields::LICENCE),
        web_link: text_of(fields::WEB_LINK),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticClass;

    fn entry(abbr: &str, name: &str, lang: &str) -> SourceElement {
        SourceElement::new("BibleVersionCodes")
            .with_field("mainAbbreviation", abbr)
            .with_field("versionName", name)
            .with_field("languageCode", lang)
    }

    fn header() -> SourceElement {
        SourceElement::new("header").with_child(
            SourceElement::new("work")
                .with_field("version", "0.01")
                .with_field("date", "2022-05-18")
                .with_field("title", "Bible version codes"),
        )
    }

    fn document(children: Vec<SourceElement>) -> SourceDocument {
        let mut root = SourceElement::new("BibleVersionCodes");
        root.children = children;
        SourceDocument::new("memory", root)
    }

    #[test]
    fn test_wrong_root_is_fatal() {
        let mut loader = CatalogLoader::default();
        let source = SourceDocument::new("memory", SourceElement::new("BibleBooksCodes"));
        let err = loader.load(&source).unwrap_err();
        assert!(err.is_structure());
        assert!(!loader.is_loaded());
        assert!(loader.diagnostics().is_empty());
    }

    #[test]
    fn test_header_fields_extracted() {
        let mut loader = CatalogLoader::default();
        let catalog = loader
            .load(&document(vec![header(), entry("KJV", "King James Version", "en")]))
            .unwrap();
        assert_eq!(catalog.header.title.as_deref(), Some("Bible version codes"));
        assert_eq!(catalog.header.version.as_deref(), Some("0.01"));
        assert_eq!(catalog.header.date.as_deref(), Some("2022-05-18"));
        assert_eq!(catalog.len(), 1);
        assert!(loader.diagnostics().is_empty());
    }

    #[test]
    fn test_missing_header_is_warning() {
        let mut loader = CatalogLoader::default();
        let catalog = loader
            .load(&document(vec![entry("KJV", "King James Version", "en")]))
            .unwrap();
        assert!(catalog.header.is_empty());
        assert_eq!(catalog.len(), 1);
        let diags = loader.diagnostics();
        assert_eq!(diags.with_code(DiagnosticCode::MissingHeader).count(), 1);
        assert!(!diags.has_errors());
    }

    #[test]
    fn test_header_without_work() {
        let mut loader = CatalogLoader::default();
        loader
            .load(&document(vec![SourceElement::new("header"), entry("KJV", "KJV", "en")]))
            .unwrap();
        assert_eq!(
            loader.diagnostics().with_code(DiagnosticCode::MissingWork).count(),
            1
        );
    }

    #[test]
    fn test_missing_compulsory_element_still_loaded() {
        let mut loader = CatalogLoader::default();
        let incomplete = SourceElement::new("BibleVersionCodes")
            .with_field("mainAbbreviation", "WEB")
            .with_field("versionName", "World English Bible");
        let catalog = loader
            .load(&document(vec![header(), entry("KJV", "King James Version", "en"), incomplete]))
            .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries[1].language_code, "");

        let errors: Vec<_> = loader.diagnostics().errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, DiagnosticCode::MissingCompulsoryElement);
        assert_eq!(errors[0].class(), DiagnosticClass::FieldError);
        assert_eq!(errors[0].record, Some(1));
        assert_eq!(errors[0].record_id.as_deref(), Some("WEB"));
        assert_eq!(errors[0].field.as_deref(), Some("languageCode"));
    }

    #[test]
    fn test_blank_fields_are_warnings() {
        let mut loader = CatalogLoader::default();
        let blank = entry("KJV", "  ", "en").with_field("licence", "");
        let catalog = loader.load(&document(vec![header(), blank])).unwrap();
        assert_eq!(catalog.entries[0].version_name, "");
        assert_eq!(catalog.entries[0].licence, None);

        let diags = loader.diagnostics();
        assert!(!diags.has_errors());
        assert_eq!(diags.with_code(DiagnosticCode::BlankCompulsoryElement).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::BlankOptionalElement).count(), 1);
    }

    #[test]
    fn test_duplicate_abbreviation_reported_once() {
        let mut loader = CatalogLoader::default();
        loader
            .load(&document(vec![
                header(),
                entry("KJV", "King James Version", "en"),
                entry("WEB", "World English Bible", "en"),
                entry("KJV", "King James (revised)", "en"),
            ]))
            .unwrap();
        let dupes: Vec<_> = loader
            .diagnostics()
            .of_class(DiagnosticClass::UniquenessViolation)
            .collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].first_record, Some(0));
        assert_eq!(dupes[0].record, Some(2));
        assert_eq!(dupes[0].field.as_deref(), Some("mainAbbreviation"));
    }

    #[test]
    fn test_shared_optional_unique_field() {
        let mut loader = CatalogLoader::default();
        loader
            .load(&document(vec![
                entry("KJV", "King James Version", "en").with_field("webLink", "https://example.org"),
                entry("WEB", "World English Bible", "en").with_field("webLink", "https://example.org"),
                entry("ASV", "American Standard Version", "en").with_field("licence", "Public Domain"),
                entry("BSB", "Berean Standard Bible", "en").with_field("licence", "Public Domain"),
            ]))
            .unwrap();
        let dupes: Vec<_> = loader.diagnostics().with_code(DiagnosticCode::DuplicateValue).collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].field.as_deref(), Some("webLink"));
    }

    #[test]
    fn test_unexpected_content_flagged() {
        let mut loader = CatalogLoader::default();
        let odd = entry("KJV", "King James Version", "en")
            .with_attribute("id", "1")
            .with_text("stray")
            .with_tail("more")
            .with_field("notes", "extra")
            .with_field("licence", "PD")
            .with_field("licence", "Public Domain");
        let catalog = loader
            .load(&document(vec![header(), odd, SourceElement::new("comment")]))
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries[0].licence.as_deref(), Some("PD"));

        let diags = loader.diagnostics();
        for code in [
            DiagnosticCode::UnexpectedAttribute,
            DiagnosticCode::UnexpectedText,
            DiagnosticCode::UnexpectedTail,
            DiagnosticCode::UnexpectedElement,
            DiagnosticCode::RepeatedElement,
            DiagnosticCode::UnexpectedRecord,
        ] {
            assert_eq!(diags.with_code(code).count(), 1, "{code:?}");
        }
    }

    #[test]
    fn test_nested_field_content() {
        let mut loader = CatalogLoader::default();
        let nested = entry("KJV", "King James Version", "en").with_child(
            SourceElement::new("publisherName")
                .with_text("Crown")
                .with_attribute("lang", "en")
                .with_child(SourceElement::new("b")),
        );
        loader.load(&document(vec![header(), nested])).unwrap();
        let diags = loader.diagnostics();
        assert_eq!(diags.with_code(DiagnosticCode::NestedContent).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::UnexpectedAttribute).count(), 1);
    }

    #[test]
    fn test_attribute_schema() {
        let schema = SchemaDescriptor::new(
            vec!["code"],
            vec!["status"],
            vec!["mainAbbreviation", "versionName", "languageCode"],
            vec![],
            vec!["code"],
        )
        .unwrap();
        let mut loader = CatalogLoader::new(schema, CatalogLayout::default());
        loader
            .load(&document(vec![
                header(),
                entry("KJV", "King James Version", "en").with_attribute("code", "k"),
                entry("WEB", "World English Bible", "en").with_attribute("status", " "),
                entry("ASV", "American Standard Version", "en").with_attribute("code", "k"),
                entry("BSB", "Berean Standard Bible", "en").with_attribute("code", ""),
            ]))
            .unwrap();
        let diags = loader.diagnostics();
        assert_eq!(diags.with_code(DiagnosticCode::MissingCompulsoryAttribute).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::BlankOptionalAttribute).count(), 1);
        assert_eq!(diags.with_code(DiagnosticCode::BlankCompulsoryAttribute).count(), 1);
        let dupes: Vec<_> = diags.with_code(DiagnosticCode::DuplicateValue).collect();
        assert_eq!(dupes.len(), 1);
        assert_eq!(dupes[0].record, Some(2));
        assert_eq!(dupes[0].first_record, Some(0));
    }

    #[test]
    fn test_second_load_is_noop() {
        let mut loader = CatalogLoader::default();
        let source = document(vec![header(), entry("KJV", "King James Version", "en")]);
        let first = loader.load(&source).unwrap().clone();

        let again = loader.load(&source).unwrap().clone();
        assert_eq!(first, again);
        assert!(loader.diagnostics().is_empty());

        let other = SourceDocument::new("elsewhere", SourceElement::new("BibleVersionCodes"));
        let still = loader.load(&other).unwrap().clone();
        assert_eq!(first, still);
        let ignored: Vec<_> = loader
            .diagnostics()
            .with_code(DiagnosticCode::SourceIgnored)
            .collect();
        assert_eq!(ignored.len(), 1);
        assert!(ignored[0].message.contains("elsewhere"));
    }

    #[test]
    fn test_load_str_after_load_skips_parsing() {
        let mut loader = CatalogLoader::default();
        loader
            .load_str("a.xml", "<BibleVersionCodes></BibleVersionCodes>")
            .unwrap();
        // Not even well-formed: the guard answers before any parsing happens.
        let catalog = loader.load_str("b.xml", "<oops").unwrap();
        assert_eq!(catalog.origin, "a.xml");
        assert!(loader.diagnostics().has_errors());
    }
}
