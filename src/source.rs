//! In-memory source document tree
//!
//! The loader never touches XML directly. It walks this small tree, which keeps
//! the information the validation passes need: tags, attributes, inline text,
//! trailing text and child elements.

use crate::checksum::Checksum;

/// One element of the source document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceElement {
    pub tag: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    /// Text between the start tag and the first child element
    pub text: Option<String>,
    /// Text between the end tag and the next sibling element
    pub tail: Option<String>,
    pub children: Vec<SourceElement>,
}

impl SourceElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Builder: set the inline text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: set the trailing text
    pub fn with_tail(mut self, tail: impl Into<String>) -> Self {
        self.tail = Some(tail.into());
        self
    }

    /// Builder: add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: SourceElement) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: append a child element holding only text
    pub fn with_field(self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_child(SourceElement::new(tag).with_text(text))
    }

    /// First child element with the given tag
    pub fn find(&self, tag: &str) -> Option<&SourceElement> {
        self.children.iter().find(|child| child.tag == tag)
    }

    /// All child elements with the given tag
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a SourceElement> + 'a {
        self.children.iter().filter(move |child| child.tag == tag)
    }

    /// Value of the named attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Inline text with surrounding whitespace removed; `None` when blank
    pub fn trimmed_text(&self) -> Option<&str> {
        non_blank(self.text.as_deref())
    }

    /// True if the element carries non-whitespace inline text
    pub fn has_text(&self) -> bool {
        self.trimmed_text().is_some()
    }

    /// True if non-whitespace text follows the element
    pub fn has_tail(&self) -> bool {
        non_blank(self.tail.as_deref()).is_some()
    }
}

/// A parsed source document together with where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Label identifying the source (usually its file path)
    pub origin: String,
    pub root: SourceElement,
    /// Checksum of the raw text, when the document was parsed from text
    pub checksum: Option<Checksum>,
}

impl SourceDocument {
    pub fn new(origin: impl Into<String>, root: SourceElement) -> Self {
        Self {
            origin: origin.into(),
            root,
            checksum: None,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
