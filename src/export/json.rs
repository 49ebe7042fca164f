//! JSON writer

use crate::config::OutputFormat;
use crate::error::Result;
use crate::index::IndexedCatalog;

/// Serialize every view into one JSON object
pub fn render(indexed: &IndexedCatalog, output_format: OutputFormat) -> Result<String> {
    let mut text = match output_format {
        OutputFormat::Pretty => serde_json::to_string_pretty(indexed)?,
        OutputFormat::Compact => serde_json::to_string(indexed)?,
    };
    text.push('\n');
    Ok(text)
}
