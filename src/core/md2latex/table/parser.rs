//! Pipe table region parser

use lazy_static::lazy_static;
use regex::Regex;

use super::super::utils::Annotation;

lazy_static! {
    static ref ALIGN_CELL: Regex = Regex::new(r"^\s*:?-+:?\s*$").unwrap();
}

/// Column alignment derived from an alignment-row cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAlign {
    Left,
    Center,
    Right,
}

impl ColumnAlign {
    /// Parse one alignment cell (`:--`, `:-:`, `--:`, `---`)
    pub fn parse(cell: &str) -> Option<Self> {
        if !ALIGN_CELL.is_match(cell) {
            return None;
        }
        let cell = cell.trim();
        let align = match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) if cell.len() > 1 => ColumnAlign::Center,
            (_, true) => ColumnAlign::Right,
            _ => ColumnAlign::Left,
        };
        Some(align)
    }

    /// The `tabular` column specifier
    pub fn spec(self) -> char {
        match self {
            ColumnAlign::Left => 'l',
            ColumnAlign::Center => 'c',
            ColumnAlign::Right => 'r',
        }
    }
}

/// One extracted Markdown table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRegion {
    pub label: Option<String>,
    pub caption: Option<String>,
    pub header: Vec<String>,
    pub alignment: Vec<ColumnAlign>,
    pub body_rows: Vec<Vec<String>>,
}

impl TableRegion {
    /// Parse a block of pipe-delimited lines with an optional annotation
    /// marker body. Returns `None` when the second line is not an
    /// alignment row.
    pub fn parse(text: &str, marker: Option<&str>) -> Option<Self> {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty());
        let header = split_row(lines.next()?);
        let alignment = split_row(lines.next()?)
            .iter()
            .map(|cell| ColumnAlign::parse(cell))
            .collect::<Option<Vec<_>>>()?;
        if alignment.is_empty() {
            return None;
        }
        let body_rows = lines.map(split_row).collect();

        let annotation = marker.map(Annotation::parse).unwrap_or_default();
        Some(TableRegion {
            label: annotation.label,
            caption: annotation.caption,
            header,
            alignment,
            body_rows,
        })
    }
}

/// Split a table row on unescaped pipes, trimming each cell and dropping
/// the empty cells produced by the outer pipes.
pub fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = line.trim().chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                current.push_str("\\|");
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    cells.push(current);

    let mut cells: Vec<String> = cells.into_iter().map(|c| c.trim().to_string()).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}
