//! XML reader producing [`SourceDocument`] trees

use std::fs;
use std::path::Path;

use roxmltree::{Document, Node, ParsingOptions};
use tracing::info;

use crate::checksum::Checksum;
use crate::error::Result;
use crate::source::{SourceDocument, SourceElement};

/// Parse XML text into a source document labelled with `origin`
pub fn parse_str(origin: impl Into<String>, text: &str) -> Result<SourceDocument> {
    // Catalogue files may carry a DOCTYPE line naming their DTD
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(text, options)?;
    let root = convert(document.root_element());
    Ok(SourceDocument {
        origin: origin.into(),
        root,
        checksum: Some(Checksum::of_text(text)),
    })
}

/// Read and parse an XML file
pub fn read_path(path: &Path) -> Result<SourceDocument> {
    info!(path = %path.display(), "Loading source document");
    let text = fs::read_to_string(path)?;
    parse_str(path.display().to_string(), &text)
}

fn convert(node: Node<'_, '_>) -> SourceElement {
    SourceElement {
        tag: node.tag_name().name().to_string(),
        attributes: node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect(),
        text: leading_text(node),
        tail: trailing_text(node),
        children: node.children().filter(Node::is_element).map(convert).collect(),
    }
}

/// Text nodes before the first child element
fn leading_text(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .children()
        .take_while(|child| !child.is_element())
        .filter_map(|child| if child.is_text() { child.text() } else { None })
        .collect();
    (!text.is_empty()).then_some(text)
}

/// Text nodes between this element and its next element sibling
fn trailing_text(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .next_siblings()
        .skip(1)
        .take_while(|sibling| !sibling.is_element())
        .filter_map(|sibling| if sibling.is_text() { sibling.text() } else { None })
        .collect();
    (!text.is_empty()).then_some(text)
}
