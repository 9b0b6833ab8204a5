//! Whole-document extraction of tables and display math
//!
//! Runs before the line pass. Each pass rewrites the document text and the
//! next pass sees the updated text: captioned tables, plain tables,
//! captioned equations, plain equations. Fenced code is never touched.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::context::M2LOptions;
use super::equation::convert_equation;
use super::table::convert_table;
use super::utils::Fence;
use super::ConversionWarning;

lazy_static! {
    /// `*==label_caption==*`, blank lines, then two or more pipe rows
    static ref CAPTIONED_TABLE: Regex = Regex::new(
        r"(?m)^[ \t]*\*==(?P<marker>[^\n]*?)==\*[ \t]*\n(?:[ \t]*\n)*(?P<table>(?:[ \t]*\|[^\n]*\|[ \t]*(?:\n|\z)){2,})"
    )
    .unwrap();

    /// Two or more consecutive pipe rows
    static ref PLAIN_TABLE: Regex =
        Regex::new(r"(?m)^(?P<table>(?:[ \t]*\|[^\n]*\|[ \t]*(?:\n|\z)){2,})").unwrap();

    /// `*==label==*`, blank lines, then a `$$` block
    static ref CAPTIONED_EQUATION: Regex = Regex::new(
        r"(?m)^[ \t]*\*==(?P<marker>[^\n]*?)==\*[ \t]*\n(?:[ \t]*\n)*[ \t]*\$\$(?:[ \t]*\n(?P<block>(?s:.*?))|(?P<inline>[^\n$]+?))\$\$[ \t]*$"
    )
    .unwrap();

    /// `$$` on its own line up to a closing `$$`, or `$$ ... $$` on one line
    static ref PLAIN_EQUATION: Regex = Regex::new(
        r"(?m)^[ \t]*\$\$(?:[ \t]*\n(?P<block>(?s:.*?))|(?P<inline>[^\n$]+?))\$\$[ \t]*$"
    )
    .unwrap();
}

/// Replace every table and display-math region of `input` with its LaTeX
/// rendering. Regions inside fenced code blocks are left alone.
pub fn extract_blocks(
    input: &str,
    options: &M2LOptions,
    warnings: &mut Vec<ConversionWarning>,
) -> String {
    let mut out = String::with_capacity(input.len());
    for (fenced, segment) in split_fenced(input) {
        if fenced {
            out.push_str(segment);
        } else {
            let text = extract_tables(segment, options, warnings);
            out.push_str(&extract_equations(&text, options));
        }
    }
    out
}

/// Table extraction: captioned first, then plain.
pub fn extract_tables(
    input: &str,
    options: &M2LOptions,
    warnings: &mut Vec<ConversionWarning>,
) -> String {
    let captioned = CAPTIONED_TABLE.replace_all(input, |caps: &Captures| {
        let table = &caps["table"];
        match convert_table(table, Some(&caps["marker"]), options) {
            Some(rendered) => keep_newline(rendered, table),
            // the plain pass reports it
            None => caps[0].to_string(),
        }
    });

    PLAIN_TABLE
        .replace_all(&captioned, |caps: &Captures| {
            let table = &caps["table"];
            match convert_table(table, None, options) {
                Some(rendered) => keep_newline(rendered, table),
                None => {
                    let first = table.lines().next().unwrap_or_default();
                    warnings.push(ConversionWarning::malformed_table(first));
                    table.to_string()
                }
            }
        })
        .into_owned()
}

/// Equation extraction: captioned first, then plain.
pub fn extract_equations(input: &str, options: &M2LOptions) -> String {
    let captioned = CAPTIONED_EQUATION.replace_all(input, |caps: &Captures| {
        convert_equation(equation_body(caps), Some(&caps["marker"]), options)
    });

    PLAIN_EQUATION
        .replace_all(&captioned, |caps: &Captures| {
            convert_equation(equation_body(caps), None, options)
        })
        .into_owned()
}

fn equation_body<'t>(caps: &Captures<'t>) -> &'t str {
    match caps.name("block") {
        Some(block) => block.as_str(),
        None => caps.name("inline").map_or("", |m| m.as_str().trim()),
    }
}

/// Re-append the newline the match consumed after the last row
fn keep_newline(mut rendered: String, matched: &str) -> String {
    if matched.ends_with('\n') {
        rendered.push('\n');
    }
    rendered
}

/// Split a document into alternating unfenced and fenced segments.
/// A fence left open runs to the end of the document.
pub fn split_fenced(input: &str) -> Vec<(bool, &str)> {
    let mut segments = Vec::new();
    let mut seg_start = 0usize;
    let mut pos = 0usize;
    let mut open: Option<String> = None;

    for line in input.split_inclusive('\n') {
        let line_start = pos;
        pos += line.len();
        let Some(fence) = Fence::parse(line) else {
            continue;
        };
        match open {
            None => {
                if line_start > seg_start {
                    segments.push((false, &input[seg_start..line_start]));
                }
                seg_start = line_start;
                open = Some(fence.marker.to_string());
            }
            Some(ref opener) if fence.closes(opener) => {
                segments.push((true, &input[seg_start..pos]));
                seg_start = pos;
                open = None;
            }
            Some(_) => {}
        }
    }

    if seg_start < input.len() {
        segments.push((open.is_some(), &input[seg_start..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(input: &str) -> (String, Vec<ConversionWarning>) {
        let mut warnings = Vec::new();
        let out = extract_blocks(input, &M2LOptions::default(), &mut warnings);
        (out, warnings)
    }

    #[test]
    fn test_plain_table() {
        let (out, warnings) = extract("Intro\n\n| a | b |\n|---|:-:|\n| 1 | 2 |\n\nAfter\n");
        assert!(warnings.is_empty());
        assert!(out.starts_with("Intro\n\n\\begin{table}[ht]\n"));
        assert!(out.contains("\\begin{tabular}{lc}"));
        assert!(out.ends_with("\\end{table}\n\nAfter\n"));
    }

    #[test]
    fn test_captioned_table() {
        let (out, _) = extract("*==tab1_Results==*\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(!out.contains("*=="));
        assert!(out.contains("\\caption{Results}"));
        assert!(out.contains("\\label{tab1}"));
    }

    #[test]
    fn test_table_at_end_without_newline() {
        let (out, _) = extract("| a |\n|---|\n| 1 |");
        assert!(out.ends_with("\\end{table}"));
    }

    #[test]
    fn test_malformed_table_is_left_alone() {
        let input = "| a | b |\n| c | d |\n";
        let (out, warnings) = extract(input);
        assert_eq!(out, input);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, super::super::WarningKind::MalformedTable);
    }

    #[test]
    fn test_plain_equation() {
        let (out, _) = extract("Before\n$$\nE = mc^2\n$$\nAfter\n");
        assert_eq!(
            out,
            "Before\n\\begin{equation}\n    E = mc^2\n\\end{equation}\nAfter\n"
        );
    }

    #[test]
    fn test_single_line_equation() {
        let (out, _) = extract("$$ a + b $$\n");
        assert!(out.contains("    a + b\n"));
    }

    #[test]
    fn test_captioned_equation() {
        let (out, _) = extract("*==eq1==*\n$$\nx = 1\n$$\n");
        assert!(out.contains("\\label{eq1}"));
        assert!(!out.contains("*=="));
    }

    #[test]
    fn test_consecutive_equations() {
        let (out, _) = extract("$$\na\n$$\n\n$$\nb\n$$\n");
        assert_eq!(out.matches("\\begin{equation}").count(), 2);
    }

    #[test]
    fn test_fenced_code_untouched() {
        let input = "```markdown\n| a |\n|---|\n$$\nx\n$$\n```\n";
        let (out, _) = extract(input);
        assert_eq!(out, input);
    }

    #[test]
    fn test_split_fenced_segments() {
        let segments = split_fenced("a\n```\ncode\n```\nb\n~~~\nopen\n");
        assert_eq!(
            segments,
            vec![
                (false, "a\n"),
                (true, "```\ncode\n```\n"),
                (false, "b\n"),
                (true, "~~~\nopen\n"),
            ]
        );
    }
}
