//! Loaded catalogue: header metadata plus entries in document order

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::checksum::Checksum;

/// Informational metadata taken from the document's header block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogHeader {
    pub title: Option<String>,
    pub version: Option<String>,
    pub date: Option<String>,
}

impl CatalogHeader {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.version.is_none() && self.date.is_none()
    }
}

/// One Bible version record
///
/// Required fields that were missing or blank in the source are empty strings;
/// blank optional fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    /// Primary key, upper case by convention
    pub main_abbreviation: String,
    /// Name in the version's own language
    pub version_name: String,
    pub language_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub licence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_link: Option<String>,
}

impl VersionEntry {
    pub fn new(
        main_abbreviation: impl Into<String>,
        version_name: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        Self {
            main_abbreviation: main_abbreviation.into(),
            version_name: version_name.into(),
            language_code: language_code.into(),
            ..Default::default()
        }
    }

    pub fn with_publisher(mut self, publisher_name: impl Into<String>) -> Self {
        self.publisher_name = Some(publisher_name.into());
        self
    }

    pub fn with_licence(mut self, licence: impl Into<String>) -> Self {
        self.licence = Some(licence.into());
        self
    }

    pub fn with_web_link(mut self, web_link: impl Into<String>) -> Self {
        self.web_link = Some(web_link.into());
        self
    }
}

/// A loaded catalogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    /// Tag of the root container the entries came from
    pub root_tag: String,
    /// Label of the source document
    pub origin: String,
    pub source_checksum: Option<Checksum>,
    pub header: CatalogHeader,
    pub entries: Vec<VersionEntry>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry with the given abbreviation, in document order
    pub fn entry(&self, main_abbreviation: &str) -> Option<&VersionEntry> {
        self.entries
            .iter()
            .find(|entry| entry.main_abbreviation == main_abbreviation)
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} catalogue", self.root_tag)?;
        if let Some(title) = &self.header.title {
            write!(f, "\n  Title: {title}")?;
        }
        if let Some(version) = &self.header.version {
            write!(f, "\n  Version: {version}")?;
        }
        if let Some(date) = &self.header.date {
            write!(f, "\n  Date: {date}")?;
        }
        write!(f, "\n  Number of entries = {}", self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = VersionEntry::new("KJV", "King James Version", "en").with_licence("Public Domain");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["mainAbbreviation"], "KJV");
        assert_eq!(json["licence"], "Public Domain");
        assert!(json.get("webLink").is_none());
    }

    #[test]
    fn test_summary_display() {
        let catalog = Catalog {
            root_tag: "BibleVersionCodes".to_string(),
            origin: "test".to_string(),
            source_checksum: None,
            header: CatalogHeader {
                title: Some("Bible version codes".to_string()),
                version: None,
                date: Some("2022-05-18".to_string()),
            },
            entries: vec![VersionEntry::new("KJV", "King James Version", "en")],
        };
        let summary = catalog.to_string();
        assert!(summary.starts_with("BibleVersionCodes catalogue"));
        assert!(summary.contains("Title: Bible version codes"));
        assert!(!summary.contains("Version:"));
        assert!(summary.ends_with("Number of entries = 1"));
    }
}
