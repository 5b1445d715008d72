use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::wire::footnote_placeholder;

struct FootnotePatterns {
    /// `\f ... \f*`, shortest span closed by the footnote's own closing marker.
    block: Regex,
    /// `\fr` origin reference piece.
    reference: Regex,
    /// `\ft` body pieces.
    body: Regex,
    /// Nested character-style markers such as `\+wh` and `\+wh*`.
    plus_marker: Regex,
    whitespace: Regex,
}

fn patterns() -> &'static FootnotePatterns {
    static PATTERNS: OnceLock<FootnotePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| FootnotePatterns {
        block: Regex::new(r"(?s)\\f\b.*?\\f\*").expect("Invalid footnote block regex"),
        reference: Regex::new(r"\\fr\b\s*([^\\]+)").expect("Invalid footnote ref regex"),
        body: Regex::new(r"\\ft\b\s*([^\\]+)").expect("Invalid footnote text regex"),
        plus_marker: Regex::new(r"\\\+[A-Za-z]+[* ]?").expect("Invalid plus marker regex"),
        whitespace: Regex::new(r"\s+").expect("Invalid whitespace regex"),
    })
}

/// Replaces every footnote block with an inline footnote placeholder.
///
/// ```text
/// ... \f + \fr 1:2 \ft Note text\f* ...  →  ... ␞FOOTNOTE␞1:2: Note text␞FOOTNOTE␞ ...
/// ```
///
/// Multiple `\ft` pieces are joined with a space; an `\fr` piece becomes a
/// `ref: ` prefix. Blocks with no body text are deleted, leaving a single space.
/// Unterminated blocks are not matched and pass through untouched.
pub fn extract_footnotes(raw: &str) -> String {
    let p = patterns();
    p.block
        .replace_all(raw, |caps: &Captures| {
            // Nested style markers carry backslashes that would cut the body short.
            let block = p.plus_marker.replace_all(&caps[0], "");

            let reference = p
                .reference
                .captures(&block)
                .map(|c| collapse(&c[1]))
                .unwrap_or_default();

            let body = p
                .body
                .captures_iter(&block)
                .map(|c| collapse(&c[1]))
                .filter(|piece| !piece.is_empty())
                .collect::<Vec<_>>()
                .join(" ");

            if body.is_empty() {
                return " ".to_string();
            }

            let note = if reference.is_empty() {
                body
            } else {
                format!("{reference}: {body}")
            };
            format!("{} ", footnote_placeholder(&note))
        })
        .into_owned()
}

fn collapse(s: &str) -> String {
    patterns().whitespace.replace_all(s, " ").trim().to_string()
}
