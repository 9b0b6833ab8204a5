//! Placeholder masking for inline math and inline code
//!
//! Protected spans are swapped for `\0<index>\0` tokens while the inline
//! rules run and restored afterwards. A line that already contains the
//! sentinel is never masked, so a token cannot collide with source text.

use std::ops::Range;

/// Sentinel delimiting a mask token
pub const MASK_SENTINEL: char = '\u{0}';

/// Kind of a protected inline span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// `` `code` `` including its backtick delimiters
    Code,
    /// `$math$` or `$$math$$` including its delimiters
    Math,
}

/// A protected span found in a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineSpan {
    pub kind: SpanKind,
    /// Byte range of the whole span, delimiters included
    pub range: Range<usize>,
    /// Byte range of the span content
    pub inner: Range<usize>,
}

/// Find inline code and inline math spans, left to right.
///
/// A backtick run of length n is closed by the next run of exactly n
/// backticks. `$` and `$$` open math unless escaped or inside code.
/// Unclosed delimiters are ordinary text.
pub fn find_spans(line: &str) -> Vec<InlineSpan> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
            }
            b'`' => {
                let run = count_run(bytes, i, b'`');
                let content_start = i + run;
                match find_backtick_close(bytes, content_start, run) {
                    Some(close) => {
                        spans.push(InlineSpan {
                            kind: SpanKind::Code,
                            range: i..close + run,
                            inner: content_start..close,
                        });
                        i = close + run;
                    }
                    None => i = content_start,
                }
            }
            b'$' => {
                let delim = if bytes.get(i + 1) == Some(&b'$') { 2 } else { 1 };
                let content_start = i + delim;
                match find_dollar_close(bytes, content_start, delim) {
                    Some(close) if close > content_start => {
                        spans.push(InlineSpan {
                            kind: SpanKind::Math,
                            range: i..close + delim,
                            inner: content_start..close,
                        });
                        i = close + delim;
                    }
                    _ => i = content_start,
                }
            }
            _ => i += 1,
        }
    }

    spans
}

fn count_run(bytes: &[u8], start: usize, b: u8) -> usize {
    bytes[start..].iter().take_while(|&&c| c == b).count()
}

fn find_backtick_close(bytes: &[u8], from: usize, run: usize) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        if bytes[j] == b'`' {
            let len = count_run(bytes, j, b'`');
            if len == run {
                return Some(j);
            }
            j += len;
        } else {
            j += 1;
        }
    }
    None
}

fn find_dollar_close(bytes: &[u8], from: usize, delim: usize) -> Option<usize> {
    let mut j = from;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'$' => {
                if delim == 1 || bytes.get(j + 1) == Some(&b'$') {
                    return Some(j);
                }
                j += 1;
            }
            _ => j += 1,
        }
    }
    None
}

/// Table of protected spans for one line
#[derive(Debug, Default)]
pub struct MaskTable {
    spans: Vec<String>,
}

impl MaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `text` and return the token standing in for it
    pub fn protect(&mut self, text: impl Into<String>) -> String {
        let idx = self.spans.len();
        self.spans.push(text.into());
        format!("{s}{idx}{s}", s = MASK_SENTINEL, idx = idx)
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Replace every span found in `line` by a token. `render` maps each
    /// span to the text that is stored for it.
    pub fn mask_with<F>(&mut self, line: &str, mut render: F) -> String
    where
        F: FnMut(&InlineSpan, &str) -> String,
    {
        if line.contains(MASK_SENTINEL) {
            return line.to_string();
        }
        let mut out = String::with_capacity(line.len());
        let mut last = 0usize;
        for span in find_spans(line) {
            out.push_str(&line[last..span.range.start]);
            let stored = render(&span, line);
            let token = self.protect(stored);
            out.push_str(&token);
            last = span.range.end;
        }
        out.push_str(&line[last..]);
        out
    }

    /// Replace every span by a token holding its original text
    pub fn mask(&mut self, line: &str) -> String {
        self.mask_with(line, |span, src| src[span.range.clone()].to_string())
    }

    /// Restore every token and clear the table
    pub fn unmask(&mut self, line: &str) -> String {
        if self.spans.is_empty() {
            return line.to_string();
        }
        let mut out = String::with_capacity(line.len());
        let mut rest = line;
        while let Some(start) = rest.find(MASK_SENTINEL) {
            let after = &rest[start + MASK_SENTINEL.len_utf8()..];
            let restored = after.find(MASK_SENTINEL).and_then(|end| {
                let idx: usize = after[..end].parse().ok()?;
                let text = self.spans.get(idx)?;
                Some((text, end))
            });
            match restored {
                Some((text, end)) => {
                    out.push_str(&rest[..start]);
                    out.push_str(text);
                    rest = &after[end + MASK_SENTINEL.len_utf8()..];
                }
                None => {
                    out.push_str(&rest[..start + MASK_SENTINEL.len_utf8()]);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        self.spans.clear();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_code_and_math() {
        let line = "use `a*b` and $x*y$ here";
        let spans = find_spans(line);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].kind, SpanKind::Code);
        assert_eq!(&line[spans[0].inner.clone()], "a*b");
        assert_eq!(spans[1].kind, SpanKind::Math);
        assert_eq!(&line[spans[1].range.clone()], "$x*y$");
    }

    #[test]
    fn test_dollar_inside_code_is_not_math() {
        let spans = find_spans("`echo $HOME` costs \\$5");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind, SpanKind::Code);
    }

    #[test]
    fn test_double_backtick_span() {
        let line = "``a ` b`` end";
        let spans = find_spans(line);
        assert_eq!(spans.len(), 1);
        assert_eq!(&line[spans[0].inner.clone()], "a ` b");
    }

    #[test]
    fn test_mask_hides_spans() {
        let mut table = MaskTable::new();
        let masked = table.mask("a `**b**` and $c*d$");
        assert!(!masked.contains('*'));
        assert!(!masked.contains('$'));
    }

    #[test]
    fn test_unmask_restores_line() {
        let lines = [
            "plain text",
            "`code` and $a*b$ and $$c$$",
            "unclosed `tick and $dollar",
            "unicode `λ` → $α$",
        ];
        for line in lines {
            let mut table = MaskTable::new();
            let masked = table.mask(line);
            assert_eq!(table.unmask(&masked), line);
        }
    }

    #[test]
    fn test_sentinel_line_is_left_alone() {
        let line = "odd \u{0}0\u{0} `x`";
        let mut table = MaskTable::new();
        assert_eq!(table.mask(line), line);
        assert!(table.is_empty());
        assert_eq!(table.unmask(line), line);
    }
}
