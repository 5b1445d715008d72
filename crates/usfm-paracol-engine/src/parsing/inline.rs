use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::wire::{Edge, SpanKind, Tag};

struct InlinePatterns {
    style_marker: Regex,
    attribute: Regex,
    stars: Regex,
    marker: Regex,
    whitespace: Regex,
    apostrophe: Regex,
    after_open_quote: Regex,
    after_close_double: Regex,
    after_close_single: Regex,
    before_punct: Regex,
}

fn patterns() -> &'static InlinePatterns {
    static PATTERNS: OnceLock<InlinePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| InlinePatterns {
        style_marker: Regex::new(r"\\\+?(add|nd|sc|sup)(\*|\s)")
            .expect("Invalid style marker regex"),
        attribute: Regex::new(r#"\|[A-Za-z]+="[^"]*""#).expect("Invalid attribute regex"),
        stars: Regex::new(r"\*+").expect("Invalid star regex"),
        marker: Regex::new(r"\\\+?[A-Za-z]+\d*\*?").expect("Invalid marker regex"),
        whitespace: Regex::new(r"\s+").expect("Invalid whitespace regex"),
        apostrophe: Regex::new(r"\s*([’'])\s*").expect("Invalid apostrophe regex"),
        after_open_quote: Regex::new(r#"([‘“'"])\s+(\w)"#).expect("Invalid open quote regex"),
        after_close_double: Regex::new(r#"([”"])(\w)"#).expect("Invalid close quote regex"),
        after_close_single: Regex::new(r"([,.;:!?])([’'])(\w)")
            .expect("Invalid close single quote regex"),
        before_punct: Regex::new(r"\s+([,.;:!?])").expect("Invalid punctuation regex"),
    })
}

/// Cleans one fragment of verse text.
///
/// Footnotes must already have been extracted. The steps run in a fixed order and
/// later steps rely on the earlier ones:
///
/// 1. non-breaking spaces become spaces
/// 2. `\add`, `\sc`, `\nd`, `\sup` (and their `\+` nested forms) become span placeholders
/// 3. `|attr="value"` annotations are dropped
/// 4. stray `*` runs are dropped
/// 5. any remaining marker becomes a space
/// 6. stray `|` becomes a space
/// 7. whitespace collapses
/// 8. apostrophes re-attach between letters (`don ' t` → `don't`)
/// 9. no space after an opening quote
/// 10. a space after a closing double quote before a word
/// 11. a space after a closing single quote that follows punctuation
/// 12. no space before punctuation
///
/// Returns an empty string when nothing is left.
pub fn normalize_fragment(fragment: &str) -> String {
    let p = patterns();

    let line = fragment.replace('\u{00A0}', " ");

    let line = p.style_marker.replace_all(&line, |caps: &Captures| {
        let edge = if &caps[2] == "*" {
            Edge::Close
        } else {
            Edge::Open
        };
        match SpanKind::from_marker(&caps[1]) {
            Some(kind) => Tag::Span(kind, edge).to_string(),
            None => caps[0].to_string(),
        }
    });

    let line = p.attribute.replace_all(&line, "");
    let line = p.stars.replace_all(&line, "");
    let line = p.marker.replace_all(&line, " ");
    let line = line.replace('|', " ");

    let line = p.whitespace.replace_all(&line, " ");
    let line = line.trim();

    let line = attach_apostrophes(line);
    let line = p.after_open_quote.replace_all(&line, "$1$2");
    let line = p.after_close_double.replace_all(&line, "$1 $2");
    let line = p.after_close_single.replace_all(&line, "$1$2 $3");
    let line = p.before_punct.replace_all(&line, "$1");

    line.into_owned()
}

/// Removes whitespace around an apostrophe that sits between two word characters.
///
/// The neighbours are looked up in `s` rather than consumed by the match, so
/// chains such as `a ' b ' c` collapse in one pass.
fn attach_apostrophes(s: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    patterns()
        .apostrophe
        .replace_all(s, |caps: &Captures| {
            let (Some(m), Some(apostrophe)) = (caps.get(0), caps.get(1)) else {
                return String::new();
            };
            let before = s[..m.start()].chars().next_back().is_some_and(is_word);
            let after = s[m.end()..].chars().next().is_some_and(is_word);
            if before && after {
                apostrophe.as_str().to_string()
            } else {
                m.as_str().to_string()
            }
        })
        .into_owned()
}
