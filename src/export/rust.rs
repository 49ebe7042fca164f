//! Rust table writer
//!
//! Emits a module of `pub const` slices, one per view. Required columns are
//! `&str`, optional ones `Option<&str>`.

use super::{banner, tables, ExportInput, Table};

/// Render the module source
pub fn render(input: &ExportInput<'_>) -> String {
    let mut output = String::new();
    output.push_str(&format!("//! Generated from {}. Do not edit.\n", banner(input.header)));

    for table in tables(input.indexed) {
        output.push('\n');
        emit_table(&mut output, &table);
    }
    output
}

fn emit_table(output: &mut String, table: &Table) {
    let row_type = row_type(table);
    output.push_str(&format!("/// `{}` rows\n", table.name));
    output.push_str(&format!(
        "pub const {}: &[{}] = &[\n",
        const_name(table.name),
        row_type
    ));
    for row in &table.rows {
        let values: Vec<String> = table
            .columns
            .iter()
            .zip(row)
            .map(|(column, value)| literal(column.optional, value.as_deref()))
            .collect();
        if values.len() == 1 {
            output.push_str(&format!("    {},\n", values[0]));
        } else {
            output.push_str(&format!("    ({}),\n", values.join(", ")));
        }
    }
    output.push_str("];\n");
}

fn row_type(table: &Table) -> String {
    let types: Vec<&str> = table
        .columns
        .iter()
        .map(|column| if column.optional { "Option<&str>" } else { "&str" })
        .collect();
    if types.len() == 1 {
        types[0].to_string()
    } else {
        format!("({})", types.join(", "))
    }
}

fn literal(optional: bool, value: Option<&str>) -> String {
    match (optional, value) {
        (true, Some(value)) => format!("Some({value:?})"),
        (true, None) => "None".to_string(),
        (false, value) => format!("{:?}", value.unwrap_or("")),
    }
}

/// `webLinkIndex` -> `WEB_LINK_INDEX`
fn const_name(view: &str) -> String {
    let mut name = String::with_capacity(view.len() + 4);
    for (i, c) in view.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            name.push('_');
        }
        name.push(c.to_ascii_uppercase());
    }
    name
}
