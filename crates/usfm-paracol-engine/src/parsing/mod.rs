//! # USFM Encoding
//!
//! Turns a USFM document into one encoded string per verse, preserving footnotes,
//! poetry/paragraph layout and inline character styles in the [`wire`](crate::wire)
//! format.
//!
//! ## Phases
//!
//! 1. **Line Classification** (`classify`): each line becomes a [`LineClass`] holding
//!    only local facts (marker kind, numbers, trailing text).
//! 2. **Verse Construction** (`builder`): a [`VerseBuilder`] tracks book, chapter, the
//!    open verse and the single-use `\d` / `\p` context flags, and emits one encoded
//!    verse per verse marker.
//!
//! Every fragment of verse text goes through [`encode_fragment`] on its way into a
//! chunk: delimiter scrub, then [`footnote::extract_footnotes`], then
//! [`inline::normalize_fragment`].
//!
//! ## Leniency
//!
//! Source corpora carry stray formatting. No single line can make encoding fail:
//! malformed markers are treated as text or ignored.

pub mod builder;
pub mod classify;
pub mod footnote;
pub mod inline;

#[cfg(test)]
mod tests;

pub use builder::{BuilderState, VerseBuilder};
pub use classify::{LineClass, UsfmLineClassifier};

use crate::{verse_map::VerseMap, wire::strip_delimiter};

/// The encoded verses of one source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBook {
    /// Book code from the `\id` line, uppercased.
    pub book_id: Option<String>,
    pub verses: VerseMap,
}

pub fn parse_document(source: &str) -> ParsedBook {
    let source = source.strip_prefix('\u{FEFF}').unwrap_or(source);
    let classifier = UsfmLineClassifier;
    let mut builder = VerseBuilder::new();

    for line in source.lines() {
        let lc = classifier.classify(line);
        builder.push(&lc);
    }

    builder.finish()
}

/// Encodes one raw text fragment for inclusion in a chunk.
pub fn encode_fragment(raw: &str) -> String {
    let scrubbed = strip_delimiter(raw);
    let extracted = footnote::extract_footnotes(&scrubbed);
    inline::normalize_fragment(&extracted)
}
