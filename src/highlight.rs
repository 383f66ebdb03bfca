//! Accented phrase highlighting, the last formatting pass.
//!
//! A phrase is a word of at least 3 letters followed by 1 to 5 more words of
//! at least 2 letters, separated by whitespace. Letters are ASCII letters and
//! the Latin-1 range U+00C0..=U+00FF. Only phrases containing a Latin-1
//! letter are wrapped; everything else is copied through.
//!
//! Phrase edges follow ASCII word boundaries: only `[A-Za-z0-9_]` counts as a
//! word character there, so a phrase never starts or ends between two
//! accented letters. When the last word ends in accented letters the phrase is
//! cut back to the last position that sits on such a boundary, or loses the
//! word entirely. A phrase that is found but not wrapped is still consumed, so
//! scanning resumes after it.
//!
//! Input is escaped text that may already carry markup from earlier passes.
//! Tags (`<...>`) and entities (`&...;`) are copied through opaquely and never
//! take part in a phrase.

use crate::escape::escape_html;

/// Phrases longer than this many UTF-16 code units are copied through unwrapped.
pub const PHRASE_MAX_LEN: usize = 100;
const FIRST_WORD_MIN: usize = 3;
const NEXT_WORD_MIN: usize = 2;
const MAX_EXTRA_WORDS: usize = 5;
/// Longest entity the scanner will skip, `&quot;` being the longest produced.
const ENTITY_MAX_LEN: usize = 8;

pub const HIGHLIGHT_OPEN: &str = r#"<span style="color: var(--primary-color); font-weight: 500;">"#;
pub const HIGHLIGHT_CLOSE: &str = "</span>";

fn is_accented(c: char) -> bool {
    ('\u{C0}'..='\u{FF}').contains(&c)
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || is_accented(c)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// The separator class between phrase words. Unlike `char::is_whitespace`
/// this includes U+FEFF and excludes U+0085.
fn is_space(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// True when exactly one side of the gap before `pos` is a word character.
fn at_boundary(chars: &[char], pos: usize) -> bool {
    let before = pos.checked_sub(1).is_some_and(|p| is_word_char(chars[p]));
    let after = chars.get(pos).is_some_and(|&c| is_word_char(c));
    before != after
}

pub(crate) fn highlight_phrases(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    // Every start inside one letter run shares the same continuation, so the
    // lookup is done once per run.
    let mut run: Option<(usize, Option<usize>)> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '<' {
            let end = tag_end(&chars, i);
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }
        if c == '&' {
            let end = entity_end(&chars, i).unwrap_or(i + 1);
            out.extend(&chars[i..end]);
            i = end;
            continue;
        }
        if is_letter(c) && at_boundary(&chars, i) {
            let (word_end, tail) = match run {
                Some((word_end, tail)) if i < word_end => (word_end, tail),
                _ => {
                    let word_end = run_end(&chars, i, is_letter);
                    let tail = phrase_tail(&chars, word_end);
                    run = Some((word_end, tail));
                    (word_end, tail)
                }
            };
            if let Some(end) = tail.filter(|_| word_end - i >= FIRST_WORD_MIN) {
                let phrase: String = chars[i..end].iter().collect();
                push_phrase(&mut out, &phrase);
                i = end;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

fn push_phrase(out: &mut String, phrase: &str) {
    if phrase.encode_utf16().count() <= PHRASE_MAX_LEN && phrase.chars().any(is_accented) {
        out.push_str(HIGHLIGHT_OPEN);
        out.push_str(&escape_html(phrase));
        out.push_str(HIGHLIGHT_CLOSE);
    } else {
        out.push_str(phrase);
    }
}

/// End (exclusive) of a phrase whose first word ends at `first_end`, if the
/// required extra words follow it.
fn phrase_tail(chars: &[char], first_end: usize) -> Option<usize> {
    let word_start = run_end(chars, first_end, is_space);
    if word_start == first_end {
        return None;
    }
    next_words(chars, word_start, 1)
}

/// Match the `count`th extra word at `start` and as many following words as
/// allowed. Longer candidates are tried first; a word may be cut short only
/// where the cut lands on a word boundary.
fn next_words(chars: &[char], start: usize, count: usize) -> Option<usize> {
    let full = run_end(chars, start, is_letter);
    if full - start < NEXT_WORD_MIN {
        return None;
    }

    if count < MAX_EXTRA_WORDS {
        let after_space = run_end(chars, full, is_space);
        if after_space > full {
            if let Some(end) = next_words(chars, after_space, count + 1) {
                return Some(end);
            }
        }
    }

    (start + NEXT_WORD_MIN..=full)
        .rev()
        .find(|&end| at_boundary(chars, end))
}

fn run_end(chars: &[char], start: usize, pred: fn(char) -> bool) -> usize {
    chars[start..]
        .iter()
        .position(|&c| !pred(c))
        .map_or(chars.len(), |n| start + n)
}

fn tag_end(chars: &[char], start: usize) -> usize {
    chars[start..]
        .iter()
        .position(|&c| c == '>')
        .map_or(chars.len(), |n| start + n + 1)
}

fn entity_end(chars: &[char], start: usize) -> Option<usize> {
    chars[start..]
        .iter()
        .take(ENTITY_MAX_LEN)
        .position(|&c| c == ';')
        .map(|n| start + n + 1)
}
