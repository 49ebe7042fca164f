//! Schema descriptor and document layout
//!
//! A [`SchemaDescriptor`] declares which attributes and child elements an entry
//! record must carry, which it may carry, and which of them must hold values
//! that are unique across the whole catalogue. [`CatalogLayout`] names the tags
//! that frame those records inside the source document.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{CatalogError, Result};

/// Tag of the root container (and of each entry) in `BibleVersionCodes.xml`
pub const BIBLE_VERSION_CODES_TAG: &str = "BibleVersionCodes";

/// Element names of a version entry
pub mod fields {
    pub const MAIN_ABBREVIATION: &str = "mainAbbreviation";
    pub const VERSION_NAME: &str = "versionName";
    pub const LANGUAGE_CODE: &str = "languageCode";
    pub const PUBLISHER_NAME: &str = "publisherName";
    pub const LICENCE: &str = "licence";
    pub const WEB_LINK: &str = "webLink";
}

/// Which fields an entry record is expected to carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    compulsory_attributes: BTreeSet<String>,
    optional_attributes: BTreeSet<String>,
    compulsory_elements: Vec<String>,
    optional_elements: Vec<String>,
    unique_fields: BTreeSet<String>,
}

impl SchemaDescriptor {
    /// Create a descriptor, checking that every unique field is declared somewhere
    /// and that no element is listed twice.
    pub fn new<S: Into<String>>(
        compulsory_attributes: impl IntoIterator<Item = S>,
        optional_attributes: impl IntoIterator<Item = S>,
        compulsory_elements: impl IntoIterator<Item = S>,
        optional_elements: impl IntoIterator<Item = S>,
        unique_fields: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let descriptor = Self {
            compulsory_attributes: compulsory_attributes.into_iter().map(Into::into).collect(),
            optional_attributes: optional_attributes.into_iter().map(Into::into).collect(),
            compulsory_elements: compulsory_elements.into_iter().map(Into::into).collect(),
            optional_elements: optional_elements.into_iter().map(Into::into).collect(),
            unique_fields: unique_fields.into_iter().map(Into::into).collect(),
        };
        descriptor.check()?;
        Ok(descriptor)
    }

    /// The schema of `BibleVersionCodes.xml`
    pub fn bible_version_codes() -> Self {
        Self {
            compulsory_attributes: BTreeSet::new(),
            optional_attributes: BTreeSet::new(),
            compulsory_elements: to_strings(&[
                fields::MAIN_ABBREVIATION,
                fields::VERSION_NAME,
                fields::LANGUAGE_CODE,
            ]),
            optional_elements: to_strings(&[fields::PUBLISHER_NAME, fields::LICENCE, fields::WEB_LINK]),
            unique_fields: to_strings(&[fields::MAIN_ABBREVIATION, fields::WEB_LINK])
                .into_iter()
                .collect(),
        }
    }

    fn check(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for name in self.compulsory_elements.iter().chain(&self.optional_elements) {
            if !seen.insert(name.as_str()) {
                return Err(CatalogError::InvalidSchema(format!(
                    "element {name:?} is declared more than once"
                )));
            }
        }
        if let Some(name) = self
            .compulsory_attributes
            .intersection(&self.optional_attributes)
            .next()
        {
            return Err(CatalogError::InvalidSchema(format!(
                "attribute {name:?} is both compulsory and optional"
            )));
        }
        for name in &self.unique_fields {
            if !self.is_declared_element(name) && !self.is_declared_attribute(name) {
                return Err(CatalogError::InvalidSchema(format!(
                    "unique field {name:?} is not a declared element or attribute"
                )));
            }
        }
        Ok(())
    }

    pub fn compulsory_attributes(&self) -> &BTreeSet<String> {
        &self.compulsory_attributes
    }

    pub fn optional_attributes(&self) -> &BTreeSet<String> {
        &self.optional_attributes
    }

    pub fn compulsory_elements(&self) -> &[String] {
        &self.compulsory_elements
    }

    pub fn optional_elements(&self) -> &[String] {
        &self.optional_elements
    }

    pub fn unique_fields(&self) -> &BTreeSet<String> {
        &self.unique_fields
    }

    /// The element that identifies a record in diagnostics: the first compulsory one
    pub fn key_element(&self) -> Option<&str> {
        self.compulsory_elements.first().map(String::as_str)
    }

    /// True when no attributes at all are allowed on an entry
    pub fn forbids_attributes(&self) -> bool {
        self.compulsory_attributes.is_empty() && self.optional_attributes.is_empty()
    }

    /// True when entries are expected to have no child elements
    pub fn forbids_elements(&self) -> bool {
        self.compulsory_elements.is_empty() && self.optional_elements.is_empty()
    }

    pub fn is_declared_element(&self, name: &str) -> bool {
        self.compulsory_elements.iter().any(|e| e == name)
            || self.optional_elements.iter().any(|e| e == name)
    }

    pub fn is_declared_attribute(&self, name: &str) -> bool {
        self.compulsory_attributes.contains(name) || self.optional_attributes.contains(name)
    }

    /// Unique fields that are element names, in declaration order
    pub fn unique_elements(&self) -> impl Iterator<Item = &str> {
        self.compulsory_elements
            .iter()
            .chain(&self.optional_elements)
            .filter(|name| self.unique_fields.contains(*name))
            .map(String::as_str)
    }

    /// Unique fields that are attribute names
    pub fn unique_attributes(&self) -> impl Iterator<Item = &str> {
        self.compulsory_attributes
            .iter()
            .chain(&self.optional_attributes)
            .filter(|name| self.unique_fields.contains(*name))
            .map(String::as_str)
    }
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self::bible_version_codes()
    }
}

/// Tags that frame the records inside the source document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLayout {
    /// Tag of the root container
    pub root_tag: String,
    /// Tag of the optional first child holding metadata
    pub header_tag: String,
    /// Tag of the block inside the header carrying title/version/date
    pub work_tag: String,
    /// Tag of each entry record
    pub entry_tag: String,
}

impl CatalogLayout {
    pub fn bible_version_codes() -> Self {
        Self {
            root_tag: BIBLE_VERSION_CODES_TAG.to_string(),
            header_tag: "header".to_string(),
            work_tag: "work".to_string(),
            entry_tag: BIBLE_VERSION_CODES_TAG.to_string(),
        }
    }
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self::bible_version_codes()
    }
}

fn to_strings(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
