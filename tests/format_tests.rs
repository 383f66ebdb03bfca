//! External tests for the formatting pipeline: injection safety over
//! arbitrary input, and the documented formatting behavior.

use proptest::prelude::*;
use tutor_chat::escape::{escape_html, ENTITIES};
use tutor_chat::format::{format_message, CODE_OPEN, LINE_BREAK};
use tutor_chat::highlight::{HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN};

const PIPELINE_TAGS: &[&str] = &[
    LINE_BREAK,
    "<strong>",
    "</strong>",
    "<em>",
    "</em>",
    CODE_OPEN,
    "</code>",
    HIGHLIGHT_OPEN,
    HIGHLIGHT_CLOSE,
];

/// Panics if `html` carries markup or raw ampersands the pipeline did not put there.
fn assert_only_pipeline_markup(html: &str) {
    let mut stripped = html.to_string();
    for tag in PIPELINE_TAGS {
        stripped = stripped.replace(tag, "");
    }
    assert!(!stripped.contains('<'), "stray '<' in {html:?}");
    assert!(!stripped.contains('>'), "stray '>' in {html:?}");
    assert!(!stripped.contains('"'), "stray '\"' in {html:?}");
    for (i, _) in stripped.match_indices('&') {
        let rest = &stripped[i..];
        assert!(
            ENTITIES.iter().any(|e| rest.starts_with(e)),
            "raw '&' in {html:?}"
        );
    }
}

// ---------------------------------------------------------------------------
// Safety properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn prop_format_arbitrary_text_is_safe(s in any::<String>()) {
        assert_only_pipeline_markup(&format_message(&s));
    }

    #[test]
    fn prop_format_markup_heavy_text_is_safe(s in "[*`<>&\"' a-zA-Zéàç\n\r]{0,400}") {
        assert_only_pipeline_markup(&format_message(&s));
    }

    #[test]
    fn prop_escape_leaves_no_special_chars(s in any::<String>()) {
        let escaped = escape_html(&s);
        prop_assert!(!escaped.contains('<'));
        prop_assert!(!escaped.contains('>'));
        prop_assert!(!escaped.contains('"'));
        prop_assert!(!escaped.contains('\''));
    }

    #[test]
    fn prop_format_plain_ascii_words_unchanged(s in "[a-z ]{0,200}") {
        // No delimiters, no accents, no newlines: nothing to format.
        prop_assert_eq!(format_message(&s), s);
    }
}

// ---------------------------------------------------------------------------
// Documented behavior
// ---------------------------------------------------------------------------

#[test]
fn test_line_break_between_words() {
    let out = format_message("a\nb");
    assert_eq!(out.matches(LINE_BREAK).count(), 1);
    assert_eq!(out, "a<br>b");
}

#[test]
fn test_bold_bonjour() {
    assert_eq!(format_message("**Bonjour**"), "<strong>Bonjour</strong>");
}

#[test]
fn test_bold_300_non_space_chars_not_bold() {
    let input = format!("**{}**", "Q".repeat(300));
    assert!(!format_message(&input).contains("<strong>"));
}

#[test]
fn test_escape_is_not_idempotent() {
    let once = escape_html("<b>");
    let twice = escape_html(&once);
    assert_eq!(once, "&lt;b&gt;");
    assert_eq!(twice, "&amp;lt;b&amp;gt;");
}

#[test]
fn test_injection_inside_every_construct() {
    let payload = "<img src=x onerror=alert(1)>";
    for wrapped in [
        format!("**{payload}**"),
        format!("*{payload}*"),
        format!("`{payload}`"),
        format!("très {payload} bien"),
    ] {
        assert_only_pipeline_markup(&format_message(&wrapped));
    }
}

#[test]
fn test_tutor_reply_renders() {
    let reply = "**Bonjour** means *hello*.\nTry `bonjour` and say: je suis très content";
    let out = format_message(reply);
    assert!(out.starts_with("<strong>Bonjour</strong> means <em>hello</em>.<br>"));
    assert!(out.contains(&format!("{CODE_OPEN}bonjour</code>")));
    assert!(out.contains(&format!("je {HIGHLIGHT_OPEN}suis très content{HIGHLIGHT_CLOSE}")));
}

#[test]
fn test_very_long_adversarial_input_completes() {
    let input = "*`**".repeat(50_000);
    let out = format_message(&input);
    assert_only_pipeline_markup(&out);
}
