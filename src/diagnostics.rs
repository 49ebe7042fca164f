//! Diagnostics
//!
//! Collects everything the loader finds wrong with a catalogue without stopping
//! the load, so a hand-curated source can be fixed in one pass.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Header ===
    /// No header block before the entries
    MissingHeader,
    /// Header has no work block, or the block has the wrong tag
    MissingWork,
    /// Header holds more than the single work block
    UnexpectedHeaderContent,

    // === Record structure ===
    /// Child of the root that is not an entry
    UnexpectedRecord,
    /// Non-whitespace text directly inside an element
    UnexpectedText,
    /// Non-whitespace text after an element's end tag
    UnexpectedTail,
    /// Attribute not declared by the schema
    UnexpectedAttribute,
    /// Field element has child elements of its own
    NestedContent,

    // === Fields ===
    MissingCompulsoryAttribute,
    BlankCompulsoryAttribute,
    BlankOptionalAttribute,
    MissingCompulsoryElement,
    BlankCompulsoryElement,
    BlankOptionalElement,
    /// Element tag not declared by the schema
    UnexpectedElement,
    /// Declared element appears more than once in one record
    RepeatedElement,

    // === Catalogue-wide ===
    /// Value repeated in a field declared unique
    DuplicateValue,
    /// A second load asked for a different source
    SourceIgnored,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingHeader => "W001",
            Self::MissingWork => "W002",
            Self::UnexpectedHeaderContent => "I001",
            Self::UnexpectedRecord => "W101",
            Self::UnexpectedText => "E101",
            Self::UnexpectedTail => "E102",
            Self::UnexpectedAttribute => "W102",
            Self::NestedContent => "W103",
            Self::MissingCompulsoryAttribute => "E201",
            Self::BlankCompulsoryAttribute => "W201",
            Self::BlankOptionalAttribute => "W202",
            Self::MissingCompulsoryElement => "E202",
            Self::BlankCompulsoryElement => "W203",
            Self::BlankOptionalElement => "W204",
            Self::UnexpectedElement => "W205",
            Self::RepeatedElement => "W206",
            Self::DuplicateValue => "E301",
            Self::SourceIgnored => "E401",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnexpectedHeaderContent => Severity::Info,

            Self::UnexpectedText
            | Self::UnexpectedTail
            | Self::MissingCompulsoryAttribute
            | Self::MissingCompulsoryElement
            | Self::DuplicateValue
            | Self::SourceIgnored => Severity::Error,

            Self::MissingHeader
            | Self::MissingWork
            | Self::UnexpectedRecord
            | Self::UnexpectedAttribute
            | Self::NestedContent
            | Self::BlankCompulsoryAttribute
            | Self::BlankOptionalAttribute
            | Self::BlankCompulsoryElement
            | Self::BlankOptionalElement
            | Self::UnexpectedElement
            | Self::RepeatedElement => Severity::Warning,
        }
    }

    pub fn class(&self) -> DiagnosticClass {
        match self {
            Self::DuplicateValue => DiagnosticClass::UniquenessViolation,
            Self::UnexpectedText
            | Self::UnexpectedTail
            | Self::MissingCompulsoryAttribute
            | Self::MissingCompulsoryElement
            | Self::SourceIgnored => DiagnosticClass::FieldError,
            _ => DiagnosticClass::FieldWarning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The non-fatal problem families a load can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticClass {
    FieldError,
    FieldWarning,
    UniquenessViolation,
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub message: String,
    /// Ordinal of the offending record among the root's children (header excluded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<usize>,
    /// Identifying key of the record, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Earlier record involved in a collision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_record: Option<usize>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            record: None,
            record_id: None,
            field: None,
            first_record: None,
        }
    }

    pub fn at_record(mut self, record: usize, record_id: Option<&str>) -> Self {
        self.record = Some(record);
        self.record_id = record_id.map(str::to_string);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn colliding_with(mut self, first_record: usize) -> Self {
        self.first_record = Some(first_record);
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn class(&self) -> DiagnosticClass {
        self.code.class()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code, self.code.severity(), self.message)?;
        match (&self.record_id, self.record) {
            (Some(id), Some(record)) => write!(f, " (record {record}, ID {id:?})")?,
            (None, Some(record)) => write!(f, " (record {record})")?,
            _ => {}
        }
        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from a load
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: Diagnostic) {
        self.items.push(item);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Items carrying the given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |i| i.code == code)
    }

    /// Items in the given class
    pub fn of_class(&self, class: DiagnosticClass) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |i| i.class() == class)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if self.has_errors() {
            output.push_str(&format!(
                "\n{} error(s), {} warning(s)\n",
                self.error_count(),
                self.warning_count()
            ));
        } else if !self.is_empty() {
            output.push_str(&format!("\n{} warning(s)\n", self.warning_count()));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_severity() {
        assert_eq!(DiagnosticCode::MissingCompulsoryElement.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::BlankOptionalElement.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::UnexpectedHeaderContent.severity(), Severity::Info);
        assert_eq!(
            DiagnosticCode::DuplicateValue.class(),
            DiagnosticClass::UniquenessViolation
        );
    }

    #[test]
    fn test_diagnostics_collection() {
        let mut diags = Diagnostics::new();
        diags.push(
            Diagnostic::new(DiagnosticCode::MissingCompulsoryElement, "languageCode missing")
                .at_record(3, Some("KJV"))
                .with_field("languageCode"),
        );
        diags.push(Diagnostic::new(DiagnosticCode::MissingHeader, "no header"));

        assert_eq!(diags.error_count(), 1);
        assert_eq!(diags.warning_count(), 1);
        assert!(diags.has_errors());
        assert_eq!(diags.of_class(DiagnosticClass::FieldError).count(), 1);

        let report = diags.format_all();
        assert!(report.contains("[E202] error: languageCode missing (record 3, ID \"KJV\")"));
        assert!(report.contains("1 error(s), 1 warning(s)"));
    }
}
