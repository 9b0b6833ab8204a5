//! Inline substitution pipeline
//!
//! Every non-structural line runs through [`INLINE_STEPS`] in order. The
//! order is part of the contract: each step documents what it expects to
//! see and what it leaves behind for the steps after it.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::context::{CodeStyle, M2LOptions};
use super::html;
use super::mask::{MaskTable, SpanKind};
use super::utils::{escape_percent, render_figure, Annotation, Fence, FigureSpec};
use super::ConversionWarning;

lazy_static! {
    static ref LABEL_MARKER: Regex = Regex::new(r"\*==(.+?)==\*").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*([^*\s](?:[^*]*[^*\s])?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").unwrap();
    static ref HEADING: Regex = Regex::new(r"^(#{1,6})[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").unwrap();
    static ref CITATION: Regex = Regex::new(r"\[@([^\]]+)\]").unwrap();
    static ref CROSS_REF: Regex = Regex::new(r"\[#([^\]]+)\]").unwrap();
    static ref IMAGE: Regex =
        Regex::new(r#"!\[([^\]]*)\]\(\s*([^\s)"]+)(?:\s+"([^"]*)")?\s*\)"#).unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]*)\]\(\s*([^\s)]+)\s*\)").unwrap();
    static ref AUTOLINK: Regex = Regex::new(r"<((?:https?|ftp)://[^\s<>]+)>").unwrap();
}

/// Sectioning commands by depth below the document title
const SECTION_COMMANDS: [&str; 5] = [
    "section",
    "subsection",
    "subsubsection",
    "paragraph",
    "subparagraph",
];

/// Delimiters tried in order for `\mintinline` / `\lstinline`
const INLINE_CODE_DELIMITERS: [char; 6] = ['|', '!', '+', '@', '=', '/'];

// =============================================================================
// Heading levels
// =============================================================================

/// What a heading line turns into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingAction {
    /// Title text owned by the template; the line is removed
    Drop,
    /// Emit the given sectioning command
    Command(&'static str),
}

/// Mapping from Markdown heading level to sectioning command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingScheme {
    title_present: bool,
    /// Level that maps to `\section` when there is no title
    base_level: usize,
}

impl HeadingScheme {
    /// Build the scheme for a document. Without a title the shallowest
    /// heading level that occurs outside code fences becomes `\section`.
    pub fn from_document(text: &str, options: &M2LOptions) -> Self {
        let mut open_fence: Option<String> = None;
        let mut base_level: Option<usize> = None;

        for line in text.lines() {
            if let Some(fence) = Fence::parse(line) {
                match open_fence {
                    None => open_fence = Some(fence.marker.to_string()),
                    Some(ref opener) if fence.closes(opener) => open_fence = None,
                    Some(_) => {}
                }
                continue;
            }
            if open_fence.is_some() {
                continue;
            }
            if let Some(caps) = HEADING.captures(line) {
                let level = caps[1].len();
                base_level = Some(base_level.map_or(level, |b| b.min(level)));
            }
        }

        HeadingScheme {
            title_present: options.title_present,
            base_level: base_level.unwrap_or(1),
        }
    }

    /// Scheme with a fixed base level
    pub fn new(title_present: bool, base_level: usize) -> Self {
        HeadingScheme {
            title_present,
            base_level: base_level.max(1),
        }
    }

    pub fn action(&self, level: usize) -> HeadingAction {
        let depth = if self.title_present {
            if level <= 1 {
                return HeadingAction::Drop;
            }
            level - 2
        } else {
            level.saturating_sub(self.base_level)
        };
        HeadingAction::Command(SECTION_COMMANDS[depth.min(SECTION_COMMANDS.len() - 1)])
    }
}

// =============================================================================
// Image shapes
// =============================================================================

/// Which optional parts a Markdown image carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageShape {
    /// `![label](path "caption")`
    LabelAndCaption,
    /// `![label](path)`
    LabelOnly,
    /// `![](path "caption")`
    CaptionOnly,
    /// `![](path)`
    Bare,
}

impl ImageShape {
    pub fn classify(label: &str, caption: Option<&str>) -> Self {
        let has_label = !label.trim().is_empty();
        let has_caption = caption.is_some_and(|c| !c.trim().is_empty());
        match (has_label, has_caption) {
            (true, true) => ImageShape::LabelAndCaption,
            (true, false) => ImageShape::LabelOnly,
            (false, true) => ImageShape::CaptionOnly,
            (false, false) => ImageShape::Bare,
        }
    }

    pub fn has_label(self) -> bool {
        matches!(self, ImageShape::LabelAndCaption | ImageShape::LabelOnly)
    }

    pub fn has_caption(self) -> bool {
        matches!(self, ImageShape::LabelAndCaption | ImageShape::CaptionOnly)
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// One line-transform step of the inline pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineStep {
    /// Swap inline math and inline code for tokens.
    /// After: no `$...$` or backtick span is visible.
    MaskSpans,
    /// `*==label==*` → `\label{label}`. Must run while asterisks are raw.
    LabelMarker,
    /// `**x**` → `\textbf{x}`
    Bold,
    /// `*x*` → `\textit{x}`. Bold spans are gone, so it cannot eat them.
    Italic,
    /// Put the original math and code text back.
    UnmaskSpans,
    /// `<u>` and `<font color>` pairs → `\underline` / `\textcolor`
    HtmlStyling,
    /// `` `x` `` → inline code directive. Rendered directives and math are
    /// protected again until [`InlineStep::Restore`].
    InlineCode,
    /// `#`..`######` → sectioning command, or drop the line
    Heading,
    /// `%` → `\%`, unless the line holds allow-listed HTML (`zoom:50%`)
    EscapePercent,
    /// `[@key]` → `\cite{key}`
    Citation,
    /// `[#label]` → `\ref{label}`
    CrossReference,
    /// `![label](path "caption")` → figure float
    Image,
    /// `[text](url)` → `\href{url}{text}`. After images, which share the shape.
    Hyperlink,
    /// Remaining HTML: `<img>` → figure float, other tags stripped
    HtmlTags,
    /// Restore every protected span.
    Restore,
}

/// The fixed order of the inline pipeline
pub const INLINE_STEPS: [InlineStep; 15] = [
    InlineStep::MaskSpans,
    InlineStep::LabelMarker,
    InlineStep::Bold,
    InlineStep::Italic,
    InlineStep::UnmaskSpans,
    InlineStep::HtmlStyling,
    InlineStep::InlineCode,
    InlineStep::Heading,
    InlineStep::EscapePercent,
    InlineStep::Citation,
    InlineStep::CrossReference,
    InlineStep::Image,
    InlineStep::Hyperlink,
    InlineStep::HtmlTags,
    InlineStep::Restore,
];

/// Per-line working state threaded through the steps
struct LineContext<'w> {
    text: String,
    masks: MaskTable,
    dropped: bool,
    warnings: &'w mut Vec<ConversionWarning>,
}

/// Applies [`INLINE_STEPS`] to single lines
#[derive(Debug, Clone)]
pub struct InlinePipeline<'a> {
    options: &'a M2LOptions,
    headings: HeadingScheme,
}

impl<'a> InlinePipeline<'a> {
    pub fn new(options: &'a M2LOptions, headings: HeadingScheme) -> Self {
        Self { options, headings }
    }

    /// Transform one line. `None` when the line is removed from the output.
    pub fn apply(&self, line: &str, warnings: &mut Vec<ConversionWarning>) -> Option<String> {
        let mut ctx = LineContext {
            text: line.to_string(),
            masks: MaskTable::new(),
            dropped: false,
            warnings,
        };
        for step in INLINE_STEPS {
            self.run_step(step, &mut ctx);
            if ctx.dropped {
                return None;
            }
        }
        Some(ctx.text)
    }

    fn run_step(&self, step: InlineStep, ctx: &mut LineContext<'_>) {
        let text = std::mem::take(&mut ctx.text);
        ctx.text = match step {
            InlineStep::MaskSpans => ctx.masks.mask(&text),
            InlineStep::LabelMarker => convert_label_markers(&text),
            InlineStep::Bold => BOLD.replace_all(&text, "\\textbf{$1}").into_owned(),
            InlineStep::Italic => ITALIC.replace_all(&text, "\\textit{$1}").into_owned(),
            InlineStep::UnmaskSpans => ctx.masks.unmask(&text),
            InlineStep::HtmlStyling => html::translate_styling(&text),
            InlineStep::InlineCode => {
                let style = self.options.code_style;
                ctx.masks.mask_with(&text, |span, src| match span.kind {
                    SpanKind::Code => render_inline_code(&src[span.inner.clone()], style),
                    SpanKind::Math => src[span.range.clone()].to_string(),
                })
            }
            InlineStep::Heading => match self.convert_heading(&text) {
                Some(converted) => converted,
                None => {
                    ctx.dropped = true;
                    String::new()
                }
            },
            InlineStep::EscapePercent => {
                if html::contains_recognized_tag(&text) {
                    text
                } else {
                    escape_percent(&text)
                }
            }
            InlineStep::Citation => convert_citations(&text),
            InlineStep::CrossReference => CROSS_REF.replace_all(&text, "\\ref{$1}").into_owned(),
            InlineStep::Image => self.convert_images(&text),
            InlineStep::Hyperlink => convert_links(&text),
            InlineStep::HtmlTags => html::translate(&text, self.options, ctx.warnings),
            InlineStep::Restore => ctx.masks.unmask(&text),
        };
    }

    /// `None` when the heading is title text that must be removed
    fn convert_heading(&self, text: &str) -> Option<String> {
        let Some(caps) = HEADING.captures(text) else {
            return Some(text.to_string());
        };
        match self.headings.action(caps[1].len()) {
            HeadingAction::Drop => None,
            HeadingAction::Command(cmd) => Some(format!("\\{}{{{}}}", cmd, &caps[2])),
        }
    }

    fn convert_images(&self, text: &str) -> String {
        IMAGE
            .replace_all(text, |caps: &Captures| {
                let label = caps.get(1).map_or("", |m| m.as_str());
                let caption = caps.get(3).map(|m| m.as_str());
                let shape = ImageShape::classify(label, caption);
                let fig = FigureSpec {
                    path: &caps[2],
                    caption: caption.filter(|_| shape.has_caption()),
                    label: Some(label).filter(|_| shape.has_label()),
                    width: None,
                };
                render_figure(&fig, self.options)
            })
            .into_owned()
    }
}

fn convert_label_markers(text: &str) -> String {
    LABEL_MARKER
        .replace_all(text, |caps: &Captures| match Annotation::label_only(&caps[1]) {
            Some(label) => format!("\\label{{{}}}", label),
            None => String::new(),
        })
        .into_owned()
}

/// `[@a; @b]` → `\cite{a,b}`
fn convert_citations(text: &str) -> String {
    CITATION
        .replace_all(text, |caps: &Captures| {
            let keys: Vec<&str> = caps[1]
                .split([';', ','])
                .map(|k| k.trim().trim_start_matches('@').trim())
                .filter(|k| !k.is_empty())
                .collect();
            format!("\\cite{{{}}}", keys.join(","))
        })
        .into_owned()
}

fn convert_links(text: &str) -> String {
    let text = LINK.replace_all(text, "\\href{$2}{$1}");
    AUTOLINK.replace_all(&text, "\\url{$1}").into_owned()
}

/// Render inline code in the configured style, choosing a delimiter that
/// does not occur in the code.
pub fn render_inline_code(code: &str, style: CodeStyle) -> String {
    let command = match style {
        CodeStyle::Minted => "\\mintinline{text}",
        CodeStyle::Listing => "\\lstinline",
    };
    match INLINE_CODE_DELIMITERS.iter().find(|d| !code.contains(**d)) {
        Some(d) => format!("{}{}{}{}", command, d, code, d),
        None => format!("{}{{{}}}", command, code),
    }
}
