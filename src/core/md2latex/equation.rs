//! Display math conversion
//!
//! Wraps an extracted `$$ ... $$` body in an `equation` environment.

use lazy_static::lazy_static;
use regex::Regex;

use super::context::M2LOptions;
use super::utils::Annotation;

lazy_static! {
    static ref ALIGN_BEGIN: Regex = Regex::new(r"\\begin\{align\}").unwrap();
    static ref ALIGN_END: Regex = Regex::new(r"\\end\{align\}").unwrap();
}

/// One extracted display-math block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquationRegion {
    pub label: Option<String>,
    pub body: String,
    pub is_align_variant: bool,
}

impl EquationRegion {
    /// Build a region from the text between the `$$` delimiters.
    /// Leading and trailing blank lines are dropped.
    pub fn parse(body: &str, marker: Option<&str>) -> Self {
        let lines: Vec<&str> = body.lines().collect();
        let start = lines
            .iter()
            .position(|l| !l.trim().is_empty())
            .unwrap_or(lines.len());
        let end = lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(start, |i| i + 1);
        let body = lines[start..end.max(start)].join("\n");

        let is_align_variant = body.trim_start().starts_with("\\begin{align}");
        EquationRegion {
            label: marker.and_then(Annotation::label_only),
            body,
            is_align_variant,
        }
    }
}

/// Render an equation region, rewriting a leading `align` to `align*`.
pub fn render_equation(eq: &EquationRegion, options: &M2LOptions) -> String {
    let indent = options.indent(1);
    let body = if eq.is_align_variant {
        let body = ALIGN_BEGIN.replace(&eq.body, "\\begin{align*}");
        ALIGN_END.replace(&body, "\\end{align*}").into_owned()
    } else {
        eq.body.clone()
    };

    let mut out = String::from("\\begin{equation}\n");
    // blank lines are not allowed inside math environments
    for line in body.lines().filter(|l| !l.trim().is_empty()) {
        out.push_str(&indent);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    if let Some(ref label) = eq.label {
        out.push_str(&format!("{}\\label{{{}}}\n", indent, label));
    }
    out.push_str("\\end{equation}");
    out
}

/// Parse and render one display-math block in a single step.
pub fn convert_equation(body: &str, marker: Option<&str>, options: &M2LOptions) -> String {
    render_equation(&EquationRegion::parse(body, marker), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_equation() {
        let output = convert_equation("\nE = mc^2\n", None, &M2LOptions::default());
        assert_eq!(output, "\\begin{equation}\n    E = mc^2\n\\end{equation}");
    }

    #[test]
    fn test_labelled_equation() {
        let output = convert_equation("a + b\n", Some("eq1"), &M2LOptions::default());
        assert_eq!(
            output,
            "\\begin{equation}\n    a + b\n    \\label{eq1}\n\\end{equation}"
        );
    }

    #[test]
    fn test_marker_with_underscore_uses_label_part() {
        let eq = EquationRegion::parse("x", Some("eq2_ignored text"));
        assert_eq!(eq.label.as_deref(), Some("eq2"));
    }

    #[test]
    fn test_align_becomes_starred() {
        let body = "\n\\begin{align}\na &= b \\\\\nc &= d\n\\end{align}\n\n";
        let eq = EquationRegion::parse(body, None);
        assert!(eq.is_align_variant);
        let output = render_equation(&eq, &M2LOptions::default());
        assert!(output.contains("    \\begin{align*}\n"));
        assert!(output.contains("    \\end{align*}\n"));
        assert!(!output.contains("{align}"));
    }

    #[test]
    fn test_indent_width() {
        let options = M2LOptions {
            indent_width: 2,
            ..M2LOptions::default()
        };
        let output = convert_equation("x = 1", None, &options);
        assert!(output.contains("\n  x = 1\n"));
    }
}
