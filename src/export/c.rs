//! C table writer
//!
//! Emits a header declaring one `typedef struct` per view and a source file
//! defining the matching `const` arrays. String columns are fixed-width
//! `char` buffers sized to the longest value plus the terminator.

use super::{banner, tables, ExportInput, Table};

/// The two halves of the C output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CTables {
    pub header: String,
    pub source: String,
}

/// Render both files; `header_name` is what the source file `#include`s
pub fn render(input: &ExportInput<'_>, base_name: &str, header_name: &str) -> CTables {
    let prefix = identifier(base_name);
    let guard = format!("{}_H", identifier(header_name.trim_end_matches(".h")).to_uppercase());
    let banner = banner(input.header);
    let tables = tables(input.indexed);

    let mut header = String::new();
    header.push_str(&format!("// {header_name}\n"));
    header.push_str(&format!("// Generated from {banner}. Do not edit.\n\n"));
    header.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
    for table in &tables {
        emit_declaration(&mut header, &prefix, table);
    }
    header.push_str(&format!("#endif // {guard}\n"));

    let mut source = String::new();
    source.push_str(&format!("// Generated from {banner}. Do not edit.\n\n"));
    source.push_str(&format!("#include \"{header_name}\"\n"));
    for table in &tables {
        emit_definition(&mut source, &prefix, table);
    }

    CTables { header, source }
}

fn type_name(prefix: &str, table: &Table) -> String {
    format!("{prefix}_{}_entry", table.name)
}

fn array_name(prefix: &str, table: &Table) -> String {
    format!("{prefix}_{}", table.name)
}

fn emit_declaration(output: &mut String, prefix: &str, table: &Table) {
    output.push_str("typedef struct {\n");
    for (i, column) in table.columns.iter().enumerate() {
        let width = table.max_len(i) + 1;
        output.push_str(&format!("    char {}[{}];\n", column.name, width));
    }
    output.push_str(&format!("}} {};\n\n", type_name(prefix, table)));

    let array = array_name(prefix, table);
    output.push_str(&format!("#define {}_COUNT {}\n", array, table.rows.len()));
    output.push_str(&format!(
        "extern const {} {}[{}];\n\n",
        type_name(prefix, table),
        array,
        table.rows.len().max(1)
    ));
}

fn emit_definition(output: &mut String, prefix: &str, table: &Table) {
    output.push_str(&format!(
        "\nconst {} {}[{}] = {{\n",
        type_name(prefix, table),
        array_name(prefix, table),
        table.rows.len().max(1)
    ));
    if table.rows.is_empty() {
        // C has no empty arrays; the COUNT macro says zero
        output.push_str("    {0},\n");
    }
    for row in &table.rows {
        let values: Vec<String> = row
            .iter()
            .map(|value| quote(value.as_deref().unwrap_or("")))
            .collect();
        output.push_str(&format!("    {{{}}},\n", values.join(", ")));
    }
    output.push_str("};\n");
}

/// A C string literal
fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_ascii_control() => quoted.push_str(&format!("\\{:03o}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// `name` with every character that can't appear in a C identifier replaced
fn identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogHeader, VersionEntry};
    use crate::index::index_entries;

    fn render_sample(entries: &[VersionEntry]) -> CTables {
        let header = CatalogHeader {
            title: Some("Bible version codes".to_string()),
            version: Some("0.51".to_string()),
            date: None,
        };
        let indexed = index_entries(entries);
        let input = ExportInput {
            header: &header,
            indexed: &indexed,
            source_checksum: None,
        };
        render(&input, "BibleVersionCodes", "BibleVersionCodes_Tables.h")
    }

    #[test]
    fn test_buffers_sized_to_longest_value() {
        let tables = render_sample(&[
            VersionEntry::new("KJV", "King James Version", "en"),
            VersionEntry::new("WEB", "World English Bible", "en"),
        ]);
        assert!(tables.header.contains("char versionName[20];"));
        assert!(tables.header.contains("char mainAbbreviation[4];"));
        // No publisher anywhere still needs room for the terminator
        assert!(tables.header.contains("char publisherName[1];"));
        assert!(tables.header.contains("#define BibleVersionCodes_abbreviationList_COUNT 2"));
    }

    #[test]
    fn test_guard_banner_and_rows() {
        let tables = render_sample(&[
            VersionEntry::new("KJV", "King James Version", "en").with_licence("Public Domain"),
        ]);
        assert!(tables.header.contains("#ifndef BIBLEVERSIONCODES_TABLES_H"));
        assert!(tables.header.contains("Generated from Bible version codes v0.51."));
        assert!(tables.source.contains("#include \"BibleVersionCodes_Tables.h\""));
        assert!(tables
            .source
            .contains("    {\"KJV\", \"King James Version\", \"en\", \"\", \"Public Domain\", \"\"},"));
        assert!(tables
            .source
            .contains("    {\"Public Domain\", \"KJV\", \"King James Version\", \"en\", \"\", \"Public Domain\", \"\"},"));
    }

    #[test]
    fn test_empty_view_still_compiles() {
        let tables = render_sample(&[VersionEntry::new("KJV", "King James Version", "en")]);
        assert!(tables.header.contains("#define BibleVersionCodes_webLinkIndex_COUNT 0"));
        assert!(tables
            .source
            .contains("BibleVersionCodes_webLinkIndex_entry BibleVersionCodes_webLinkIndex[1] = {\n    {0},\n};"));
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("Luther \"1912\""), "\"Luther \\\"1912\\\"\"");
        assert_eq!(quote("a\\b"), "\"a\\\\b\"");
        assert_eq!(identifier("2nd-edition"), "_2nd_edition");
    }
}
