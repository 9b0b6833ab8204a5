//! Markdown table conversion
//!
//! Turns an extracted pipe table into a floating booktabs `tabular`.

mod parser;

pub use parser::{split_row, ColumnAlign, TableRegion};

use super::context::M2LOptions;

/// Render a parsed table region as a `table` float.
pub fn render_table(table: &TableRegion, options: &M2LOptions) -> String {
    let i1 = options.indent(1);
    let i2 = options.indent(2);
    let specs: String = table.alignment.iter().map(|a| a.spec()).collect();

    let mut lines = Vec::with_capacity(table.body_rows.len() + 10);
    lines.push(format!("\\begin{{table}}[{}]", options.table_placement));
    lines.push(format!("{}\\centering", i1));
    if let Some(ref caption) = table.caption {
        lines.push(format!("{}\\caption{{{}}}", i1, caption));
    }
    lines.push(format!("{}\\begin{{tabular}}{{{}}}", i1, specs));
    lines.push(format!("{}\\toprule", i2));
    lines.push(format!("{}{} \\\\", i2, render_header(&table.header)));
    lines.push(format!("{}\\midrule", i2));
    for row in &table.body_rows {
        lines.push(format!("{}{} \\\\", i2, row.join(" & ")));
    }
    lines.push(format!("{}\\bottomrule", i2));
    lines.push(format!("{}\\end{{tabular}}", i1));
    if let Some(ref label) = table.label {
        lines.push(format!("{}\\label{{{}}}", i1, label));
    }
    lines.push("\\end{table}".to_string());
    lines.join("\n")
}

/// Header cells are bold unless empty
fn render_header(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| {
            if cell.is_empty() {
                String::new()
            } else {
                format!("\\textbf{{{}}}", cell)
            }
        })
        .collect::<Vec<_>>()
        .join(" & ")
}

/// Parse and render one table block in a single step.
pub fn convert_table(text: &str, marker: Option<&str>, options: &M2LOptions) -> Option<String> {
    TableRegion::parse(text, marker).map(|table| render_table(&table, options))
}
