//! # Typesetting
//!
//! The decoding half of the wire format: encoded verse text in, output-format
//! markup out.
//!
//! ## Modules
//!
//! - **`decode`**: [`decode`] walks one escaped verse string left to right and emits
//!   the abstract commands of a [`Typesetter`]
//! - **`latex`**: [`Latex`], the paracol LaTeX output used for the printed edition
//! - **`html`**: [`Html`], a standalone preview page
//! - **`document`**: [`assemble`] builds a whole parallel document from rows
//!
//! Decoding is stateless per verse. Any verse string can be rendered on its own,
//! in any order.

pub mod decode;
pub mod document;
pub mod html;
pub mod latex;

use std::sync::OnceLock;

use regex::{Captures, Regex};

pub use decode::decode;
pub use document::{DocumentMeta, assemble};
pub use html::Html;
pub use latex::Latex;

use crate::wire::SpanKind;

/// Concrete syntax for the abstract commands an encoded verse decodes into.
///
/// Text handed to the command methods is already escaped.
pub trait Typesetter {
    /// Escapes raw text for the output format. Must never produce the wire delimiter.
    fn escape(&self, text: &str) -> String;
    /// Wraps one run of Hebrew-script characters.
    fn hebrew(&self, run: &str) -> String;

    fn poem_line(&self, indent: u8, text: &str) -> String;
    fn paragraph_break(&self) -> String;
    /// Paragraph start when there is nothing before it to break from.
    fn paragraph_mark(&self) -> String;
    fn heading(&self, text: &str) -> String;
    fn footnote(&self, text: &str) -> String;
    fn span_open(&self, kind: SpanKind) -> String;
    fn span_close(&self, kind: SpanKind) -> String;
    /// Groups a fragment containing poem lines so its line breaks stay ragged.
    fn ragged(&self, body: &str) -> String;

    fn begin_document(&self, meta: &DocumentMeta) -> String;
    fn begin_chapter(&self, chapter: u32) -> String;
    fn end_chapter(&self) -> String;
    fn verse_pair(
        &self,
        primary_ref: &str,
        primary: &str,
        secondary_ref: &str,
        secondary: &str,
    ) -> String;
    fn end_document(&self) -> String;

    /// Wraps every Hebrew-script run (U+0590..U+05FF) with [`Typesetter::hebrew`].
    fn wrap_script(&self, text: &str) -> String {
        static HEBREW: OnceLock<Regex> = OnceLock::new();
        let re = HEBREW
            .get_or_init(|| Regex::new(r"[\x{0590}-\x{05FF}]+").expect("Invalid Hebrew regex"));
        re.replace_all(text, |caps: &Captures| self.hebrew(&caps[0]))
            .into_owned()
    }
}

/// Renders one raw encoded verse: escape, wrap Hebrew runs, then decode.
pub fn render_verse(ts: &dyn Typesetter, raw: &str) -> String {
    decode(ts, &ts.wrap_script(&ts.escape(raw)))
}
