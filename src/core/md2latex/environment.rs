//! Environment state machine for the line pass
//!
//! Each line is classified against the top of the environment stack:
//! blank lines, code fences and math/table markers are structural, lines
//! inside code or math are copied verbatim, and everything else goes
//! through the inline pipeline with list items wrapped in
//! `itemize`/`enumerate`.

use lazy_static::lazy_static;
use regex::Regex;

use super::context::{CodeStyle, ConversionState, Environment};
use super::markup::{HeadingScheme, InlinePipeline};
use super::utils::{leading_columns, Fence};
use super::ConversionWarning;

lazy_static! {
    static ref EQUATION_BEGIN: Regex =
        Regex::new(r"^\s*\\begin\{((?:equation|align|gather|multline|eqnarray)\*?)\}").unwrap();
    static ref TABLE_BEGIN: Regex = Regex::new(r"^\s*\\begin\{table\*?\}").unwrap();
    static ref TABLE_END: Regex = Regex::new(r"^\s*\\end\{table\*?\}").unwrap();
    static ref LIST_ITEM: Regex =
        Regex::new(r"^([ \t]*)(?:([-*+])|(\d+)[.)])[ \t]+(.*)$").unwrap();
    static ref FENCE_LANGUAGE: Regex = Regex::new(r"^[A-Za-z0-9_+#.-]+$").unwrap();
}

/// Language used when a fence carries none
const FALLBACK_LANGUAGE: &str = "text";

/// Kind of list a marker opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

impl ListKind {
    fn frame(self, indent: usize) -> Environment {
        match self {
            ListKind::Unordered => Environment::Itemize { indent },
            ListKind::Ordered => Environment::Enumerate { indent },
        }
    }

    fn matches(self, env: &Environment) -> bool {
        matches!(
            (self, env),
            (ListKind::Unordered, Environment::Itemize { .. })
                | (ListKind::Ordered, Environment::Enumerate { .. })
        )
    }
}

/// A recognised list item line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem<'a> {
    pub kind: ListKind,
    pub indent: usize,
    pub body: &'a str,
}

impl<'a> ListItem<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let caps = LIST_ITEM.captures(line)?;
        let kind = if caps.get(2).is_some() {
            ListKind::Unordered
        } else {
            ListKind::Ordered
        };
        Some(ListItem {
            kind,
            indent: leading_columns(caps.get(1).map_or("", |m| m.as_str())),
            body: caps.get(4).map_or("", |m| m.as_str()),
        })
    }
}

/// Run the line pass over an already block-extracted document.
pub fn run(text: &str, state: &mut ConversionState) {
    let options = state.options.clone();
    let headings = HeadingScheme::from_document(text, &options);
    let pipeline = InlinePipeline::new(&options, headings);

    for line in text.lines() {
        process_line(line, state, &pipeline);
    }
    finish(state);
}

/// Advance the state machine by one line.
pub fn process_line(line: &str, state: &mut ConversionState, pipeline: &InlinePipeline<'_>) {
    // 1. blank lines never change state
    if line.trim().is_empty() {
        if matches!(state.current_env(), Environment::Raw { .. }) {
            state.emit(line);
        } else {
            state.emit("");
        }
        return;
    }

    // 2. code fences
    if let Some(fence) = Fence::parse(line) {
        match state.current_env().clone() {
            Environment::Raw { fence: opener } => {
                if fence.closes(&opener) {
                    state.pop_env();
                    let close = close_code_block(state.options.code_style);
                    state.emit(close);
                    return;
                }
            }
            _ => {
                close_lists(state);
                open_code_block(state, &fence);
                return;
            }
        }
    }

    // math blocks written directly as LaTeX or left by the extractor
    if !state.current_env().is_verbatim() {
        if let Some(caps) = EQUATION_BEGIN.captures(line) {
            close_lists(state);
            let closer = caps[1].to_string();
            let rest = &line[caps.get(0).map_or(0, |m| m.end())..];
            // `\begin{..} .. \end{..}` on one line opens nothing
            if !rest.contains(&format!("\\end{{{}}}", closer)) {
                state.push_env(Environment::Equation { closer });
            }
            state.emit(line);
            return;
        }
        if line.trim() == "$$" {
            close_lists(state);
            state.push_env(Environment::Equation {
                closer: "$$".to_string(),
            });
            state.emit("\\begin{equation}");
            return;
        }
    }

    // 3. verbatim environments
    match state.current_env().clone() {
        Environment::Raw { .. } => {
            state.emit(line);
            return;
        }
        Environment::Equation { closer } => {
            if closer == "$$" && line.trim() == "$$" {
                state.pop_env();
                state.emit("\\end{equation}");
            } else {
                if line
                    .trim_start()
                    .starts_with(&format!("\\end{{{}}}", closer))
                {
                    state.pop_env();
                }
                state.emit(line);
            }
            return;
        }
        _ => {}
    }

    // 4. inline substitution
    if TABLE_BEGIN.is_match(line) {
        close_lists(state);
        state.push_env(Environment::Table);
    }
    if matches!(state.current_env(), Environment::Table) {
        if let Some(out) = pipeline.apply(line, &mut state.warnings) {
            state.emit(&out);
        }
        if TABLE_END.is_match(line) {
            state.pop_env();
        }
        return;
    }

    match ListItem::parse(line) {
        Some(item) => {
            enter_list_item(state, &item);
            let body = pipeline
                .apply(item.body, &mut state.warnings)
                .unwrap_or_default();
            let indent = state.options.indent(state.list_depth());
            state.emit(&format!("{}\\item {}", indent, body));
        }
        None => {
            close_lists(state);
            if let Some(out) = pipeline.apply(line, &mut state.warnings) {
                if state.options.paragraph_prefix && !out.starts_with('\\') {
                    state.emit(&format!("\\par {}", out));
                } else {
                    state.emit(&out);
                }
            }
        }
    }
}

/// Close open lists and report environments that cannot be closed.
pub fn finish(state: &mut ConversionState) {
    close_lists(state);
    let unclosed: Vec<ConversionWarning> = state
        .open_environments()
        .iter()
        .map(ConversionWarning::unclosed_environment)
        .collect();
    state.warnings.extend(unclosed);
}

fn open_code_block(state: &mut ConversionState, fence: &Fence<'_>) {
    let language = fence.info.split_whitespace().next().unwrap_or_default();
    let language = if FENCE_LANGUAGE.is_match(language) {
        Some(language)
    } else {
        let warning = ConversionWarning::invalid_fence_language(
            &format!("{}{}", fence.marker, fence.info),
            FALLBACK_LANGUAGE,
        );
        state.warn(warning);
        None
    };

    let open = match (state.options.code_style, language) {
        (CodeStyle::Minted, lang) => {
            format!("\\begin{{minted}}{{{}}}", lang.unwrap_or(FALLBACK_LANGUAGE))
        }
        (CodeStyle::Listing, Some(lang)) => format!("\\begin{{lstlisting}}[language={}]", lang),
        (CodeStyle::Listing, None) => "\\begin{lstlisting}".to_string(),
    };
    state.push_env(Environment::Raw {
        fence: fence.marker.to_string(),
    });
    state.emit(&open);
}

fn close_code_block(style: CodeStyle) -> &'static str {
    match style {
        CodeStyle::Minted => "\\end{minted}",
        CodeStyle::Listing => "\\end{lstlisting}",
    }
}

/// Adjust the list frames for an item line, opening a list when needed.
fn enter_list_item(state: &mut ConversionState, item: &ListItem<'_>) {
    loop {
        let top = state.current_env().clone();
        match top.list_indent() {
            Some(indent) if indent > item.indent => close_top_list(state),
            Some(indent) if indent == item.indent => {
                if item.kind.matches(&top) {
                    return;
                }
                close_top_list(state);
                break;
            }
            _ => break,
        }
    }

    let frame = item.kind.frame(item.indent);
    let name = frame.latex_name();
    state.push_env(frame);
    let indent = state.options.indent(state.list_depth() - 1);
    state.emit(&format!("{}\\begin{{{}}}", indent, name));
}

fn close_top_list(state: &mut ConversionState) {
    let depth = state.list_depth();
    if let Some(frame) = state.pop_env() {
        let indent = state.options.indent(depth.saturating_sub(1));
        state.emit(&format!("{}\\end{{{}}}", indent, frame.latex_name()));
    }
}

/// Close every list frame on top of the stack
fn close_lists(state: &mut ConversionState) {
    while state.current_env().is_list() {
        close_top_list(state);
    }
}
