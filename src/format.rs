//! Message formatting: escaped text in, HTML fragment out.
//!
//! The pipeline runs in a fixed order over text that has already been passed
//! through [`escape_html`]:
//!
//! 1. escape
//! 2. `\n` to `<br>`
//! 3. `**bold**`
//! 4. `*italic*`
//! 5. `` `code` ``
//! 6. accented phrase highlighting
//!
//! Every span matcher is an explicit scanner with a hard cap on the inner
//! length, so the work done at any input position is bounded and the whole
//! pass stays linear in the input size. Spans that exceed their cap are left
//! as literal text.

use crate::escape::escape_html;
use crate::highlight::highlight_phrases;

/// Longest inner text of a `**bold**` span, in UTF-16 code units.
pub const BOLD_MAX_INNER: usize = 200;
/// Longest inner text of an `*italic*` span, in UTF-16 code units.
pub const ITALIC_MAX_INNER: usize = 100;
/// Longest inner text of a `` `code` `` span, in UTF-16 code units.
pub const CODE_MAX_INNER: usize = 50;

pub const LINE_BREAK: &str = "<br>";
pub const CODE_OPEN: &str =
    r#"<code style="background: #f0f0f0; padding: 2px 6px; border-radius: 4px;">"#;

/// A delimited inline span such as `**bold**`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SpanRule {
    pub delimiter: &'static str,
    pub max_inner: usize,
    /// A closing delimiter immediately followed by this char does not close.
    pub reject_after: Option<char>,
    pub open_tag: &'static str,
    pub close_tag: &'static str,
}

pub(crate) const BOLD: SpanRule = SpanRule {
    delimiter: "**",
    max_inner: BOLD_MAX_INNER,
    reject_after: None,
    open_tag: "<strong>",
    close_tag: "</strong>",
};

pub(crate) const ITALIC: SpanRule = SpanRule {
    delimiter: "*",
    max_inner: ITALIC_MAX_INNER,
    reject_after: Some('*'),
    open_tag: "<em>",
    close_tag: "</em>",
};

pub(crate) const CODE: SpanRule = SpanRule {
    delimiter: "`",
    max_inner: CODE_MAX_INNER,
    reject_after: None,
    open_tag: CODE_OPEN,
    close_tag: "</code>",
};

/// Format untrusted message content into an HTML fragment.
///
/// Total over all inputs. The result contains no markup other than the
/// tags introduced here, and no `&` outside the entities of [`escape_html`].
pub fn format_message(content: &str) -> String {
    let escaped = escape_html(content);
    let formatted = line_breaks(&escaped);
    let formatted = replace_spans(&formatted, &BOLD);
    let formatted = replace_spans(&formatted, &ITALIC);
    let formatted = replace_spans(&formatted, &CODE);
    highlight_phrases(&formatted)
}

pub(crate) fn line_breaks(escaped: &str) -> String {
    escaped.replace('\n', LINE_BREAK)
}

/// Replace every well-formed span of `rule` in `text`, scanning left to
/// right. The shortest valid close wins; an opening delimiter without one is
/// copied through and scanning resumes at the next character.
pub(crate) fn replace_spans(text: &str, rule: &SpanRule) -> String {
    let chars: Vec<char> = text.chars().collect();
    let delim: Vec<char> = rule.delimiter.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i..].starts_with(&delim) {
            let inner_start = i + delim.len();
            if let Some(close) = find_close(&chars, inner_start, &delim, rule) {
                out.push_str(rule.open_tag);
                out.extend(&chars[inner_start..close]);
                out.push_str(rule.close_tag);
                i = close + delim.len();
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}

fn find_close(chars: &[char], inner_start: usize, delim: &[char], rule: &SpanRule) -> Option<usize> {
    let mut units = 0;
    for close in inner_start + 1..=chars.len() {
        let c = chars[close - 1];
        if is_line_terminator(c) {
            return None;
        }
        units += c.len_utf16();
        if units > rule.max_inner {
            return None;
        }
        if !chars[close..].starts_with(delim) {
            continue;
        }
        let rejected = rule
            .reject_after
            .is_some_and(|c| chars.get(close + delim.len()) == Some(&c));
        if !rejected {
            return Some(close);
        }
    }
    None
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}
