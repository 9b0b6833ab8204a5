//! Shared helpers for the Markdown converter

use super::context::M2LOptions;

/// A `*==label_caption==*` block annotation split into its parts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub label: Option<String>,
    pub caption: Option<String>,
}

impl Annotation {
    /// Split a marker body at its first underscore into label and caption.
    /// A body without an underscore is caption-only.
    pub fn parse(body: &str) -> Self {
        match body.split_once('_') {
            Some((label, caption)) => Annotation {
                label: non_empty(label),
                caption: non_empty(caption),
            },
            None => Annotation {
                label: None,
                caption: non_empty(body),
            },
        }
    }

    /// Label of a marker used where captions have no meaning: a marker
    /// without an underscore names the label in its entirety.
    pub fn label_only(body: &str) -> Option<String> {
        match body.split_once('_') {
            Some((label, _)) => non_empty(label),
            None => non_empty(body),
        }
    }
}

/// A floating image produced from Markdown or HTML image syntax
#[derive(Debug, Clone, Default)]
pub struct FigureSpec<'a> {
    pub path: &'a str,
    pub caption: Option<&'a str>,
    pub label: Option<&'a str>,
    /// Fraction of `\textwidth`; full width when absent
    pub width: Option<f64>,
}

/// Render a centered `figure` float with a single `\includegraphics`.
pub fn render_figure(fig: &FigureSpec<'_>, options: &M2LOptions) -> String {
    let indent = options.indent(1);
    let width = match fig.width {
        Some(ratio) if (ratio - 1.0).abs() > f64::EPSILON => format!("{}\\textwidth", ratio),
        _ => "\\textwidth".to_string(),
    };

    let mut lines = vec![
        format!("\\begin{{figure}}[{}]", options.figure_placement),
        format!("{}\\centering", indent),
        format!("{}\\includegraphics[width={}]{{{}}}", indent, width, fig.path),
    ];
    if let Some(caption) = fig.caption.filter(|c| !c.trim().is_empty()) {
        lines.push(format!("{}\\caption{{{}}}", indent, caption.trim()));
    }
    if let Some(label) = fig.label.filter(|l| !l.trim().is_empty()) {
        lines.push(format!("{}\\label{{{}}}", indent, label.trim()));
    }
    lines.push("\\end{figure}".to_string());
    lines.join("\n")
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Escape every `%` that is not already preceded by a backslash.
pub fn escape_percent(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut prev = None;
    for ch in input.chars() {
        if ch == '%' && prev != Some('\\') {
            out.push_str("\\%");
        } else {
            out.push(ch);
        }
        prev = Some(ch);
    }
    out
}

/// A code fence line: a run of at least three backticks or tildes
/// followed by an optional info string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence<'a> {
    pub marker: &'a str,
    pub info: &'a str,
}

impl<'a> Fence<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let trimmed = line.trim_start();
        let ch = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let run = trimmed.chars().take_while(|c| *c == ch).count();
        if run < 3 {
            return None;
        }
        let (marker, info) = trimmed.split_at(run);
        Some(Fence {
            marker,
            info: info.trim(),
        })
    }

    /// Whether this line closes a block opened by `opener`
    pub fn closes(&self, opener: &str) -> bool {
        self.info.is_empty()
            && self.marker.chars().next() == opener.chars().next()
            && self.marker.len() >= opener.len()
    }
}

/// Count the leading whitespace columns of a line (tabs count as four).
pub fn leading_columns(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}
