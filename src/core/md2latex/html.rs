//! Inline HTML handling
//!
//! Underline and font-colour tags are translated early in the inline
//! pipeline. Everything else is handled last: `<img>` tags become figure
//! floats and any other tag is stripped with a warning.

use lazy_static::lazy_static;
use phf::phf_map;
use regex::{Captures, Regex};

use super::context::M2LOptions;
use super::utils::{render_figure, FigureSpec};
use super::ConversionWarning;

/// Allow-listed HTML tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlTag {
    Image,
    Underline,
    FontColor,
    LineBreak,
    Bold,
    Italic,
    Code,
    Anchor,
}

static RECOGNIZED_TAGS: phf::Map<&'static str, HtmlTag> = phf_map! {
    "img" => HtmlTag::Image,
    "u" => HtmlTag::Underline,
    "font" => HtmlTag::FontColor,
    "br" => HtmlTag::LineBreak,
    "b" => HtmlTag::Bold,
    "strong" => HtmlTag::Bold,
    "i" => HtmlTag::Italic,
    "em" => HtmlTag::Italic,
    "code" => HtmlTag::Code,
    "a" => HtmlTag::Anchor,
};

lazy_static! {
    static ref TAG: Regex = Regex::new(
        r#"<(/?)([A-Za-z][A-Za-z0-9-]*)((?:[\s/](?:[^<>"']|"[^"]*"|'[^']*')*)?)>"#
    )
    .unwrap();
    static ref ATTR: Regex = Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#
    )
    .unwrap();
    static ref ZOOM: Regex = Regex::new(r"zoom\s*:\s*(\d+(?:\.\d+)?)\s*%").unwrap();
    static ref UNDERLINE: Regex = Regex::new(r"(?i)<u>(.*?)</u>").unwrap();
    static ref FONT_COLOR: Regex = Regex::new(
        r#"(?i)<font\s+color\s*=\s*["']?(#?[A-Za-z0-9]+)["']?\s*>(.*?)</font>"#
    )
    .unwrap();
}

/// Look up an allow-listed tag by name
pub fn recognized_tag(name: &str) -> Option<HtmlTag> {
    RECOGNIZED_TAGS.get(name.to_ascii_lowercase().as_str()).copied()
}

/// Whether a `TAG` match is markup rather than prose such as `x<y and y>z`.
///
/// Closing tags always count. An opening tag counts when its body is empty,
/// carries a `name=value` attribute, or the line also holds its closer.
fn is_markup(caps: &Captures<'_>, line: &str) -> bool {
    if !caps[1].is_empty() {
        return true;
    }
    let body = caps[3].trim();
    if body.is_empty() || body == "/" || body.contains('=') {
        return true;
    }
    let closer = format!("</{}", caps[2].to_ascii_lowercase());
    line.to_ascii_lowercase().contains(&closer)
}

/// Whether the line contains any HTML tag
pub fn contains_tag(line: &str) -> bool {
    TAG.captures_iter(line).any(|caps| is_markup(&caps, line))
}

/// Whether the line contains an allow-listed HTML tag
pub fn contains_recognized_tag(line: &str) -> bool {
    TAG.captures_iter(line)
        .any(|caps| is_markup(&caps, line) && recognized_tag(&caps[2]).is_some())
}

/// Translate `<u>` and `<font color>` pairs into `\underline` and `\textcolor`.
pub fn translate_styling(line: &str) -> String {
    let line = UNDERLINE.replace_all(line, "\\underline{$1}");
    FONT_COLOR
        .replace_all(&line, |caps: &Captures| {
            let color = &caps[1];
            match color.strip_prefix('#') {
                Some(hex) => format!("\\textcolor[HTML]{{{}}}{{{}}}", hex.to_ascii_uppercase(), &caps[2]),
                None => format!("\\textcolor{{{}}}{{{}}}", color, &caps[2]),
            }
        })
        .into_owned()
}

/// Parse the attributes of a tag body into (name, value) pairs
pub fn parse_attributes(body: &str) -> Vec<(String, String)> {
    ATTR.captures_iter(body)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            (caps[1].to_ascii_lowercase(), value.to_string())
        })
        .collect()
}

/// Expand `<img>` tags into figures and strip every other tag.
pub fn translate(line: &str, options: &M2LOptions, warnings: &mut Vec<ConversionWarning>) -> String {
    if !contains_tag(line) {
        return line.to_string();
    }

    let mut stripped: Vec<String> = Vec::new();
    let out = TAG.replace_all(line, |caps: &Captures| {
        if !is_markup(caps, line) {
            return caps[0].to_string();
        }
        let name = caps[2].to_ascii_lowercase();
        let is_open = caps[1].is_empty();
        match recognized_tag(&name) {
            Some(HtmlTag::Image) if is_open => {
                render_image(&caps[3], options).unwrap_or_else(|| {
                    warnings.push(ConversionWarning::missing_image_source(&caps[0]));
                    String::new()
                })
            }
            _ => {
                if !stripped.contains(&name) {
                    stripped.push(name);
                }
                String::new()
            }
        }
    });

    for name in &stripped {
        warnings.push(ConversionWarning::unsupported_html_tag(name));
    }
    out.into_owned()
}

/// Render the attributes of an `<img>` tag. `None` when `src` is missing.
fn render_image(attr_body: &str, options: &M2LOptions) -> Option<String> {
    let attrs = parse_attributes(attr_body);
    let get = |key: &str| {
        attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    let src = get("src").filter(|s| !s.trim().is_empty())?;
    let width = get("style")
        .and_then(|style| ZOOM.captures(style))
        .and_then(|caps| caps[1].parse::<f64>().ok())
        .map(|pct| pct / 100.0);

    let fig = FigureSpec {
        path: src.trim(),
        caption: get("title"),
        label: get("alt"),
        width,
    };
    Some(render_figure(&fig, options))
}
