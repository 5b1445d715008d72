//! # Verse Text Wire Format
//!
//! Encoded verse text is a plain string that multiplexes structure, footnotes and
//! inline styling through a reserved delimiter character (`␞`, U+241E):
//!
//! ```text
//! ␞P␞␞STYLE:PARA␞The word came.␞FOOTNOTE␞1:2: Note␞FOOTNOTE␞ ␞Q:1␞Hear, O heavens,
//! ```
//!
//! Every delimiter pair encloses a tag, so splitting on the delimiter yields
//! text and tag pieces in strict alternation. The encoder builds verses as
//! [`EncodedVerse`] values and only flattens them here; the decoder reads them back
//! with [`tokenize`].

use std::fmt;

/// The reserved delimiter. Source text is scrubbed of it before encoding.
pub const DELIM: char = '\u{241E}';

/// Inline style span kinds carried through the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    /// Translator additions (`\add`), rendered as emphasis.
    Emphasis,
    /// `\sc` and divine-name `\nd` runs.
    SmallCaps,
    Superscript,
}

impl SpanKind {
    fn wire_stem(self) -> &'static str {
        match self {
            SpanKind::Emphasis => "ADD",
            SpanKind::SmallCaps => "SC",
            SpanKind::Superscript => "SUP",
        }
    }

    /// Maps a USFM character-style marker name onto a span kind.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "add" => Some(SpanKind::Emphasis),
            "sc" | "nd" => Some(SpanKind::SmallCaps),
            "sup" => Some(SpanKind::Superscript),
            _ => None,
        }
    }
}

/// Which end of a style span a tag marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// Poetry line at the given indent level (`Q:<n>`).
    Poetry(u8),
    /// Prose chunk (`P`).
    Prose,
    /// The chunk follows a descriptive heading marker (`STYLE:HDG`).
    Heading,
    /// The chunk starts a paragraph (`STYLE:PARA`).
    Paragraph,
    /// Opens or closes a footnote payload (`FOOTNOTE`).
    Footnote,
    Span(SpanKind, Edge),
}

impl Tag {
    pub fn parse(s: &str) -> Option<Self> {
        let tag = match s {
            "P" => Tag::Prose,
            "STYLE:HDG" => Tag::Heading,
            "STYLE:PARA" => Tag::Paragraph,
            "FOOTNOTE" => Tag::Footnote,
            "ADDOPEN" => Tag::Span(SpanKind::Emphasis, Edge::Open),
            "ADDCLOSE" => Tag::Span(SpanKind::Emphasis, Edge::Close),
            "SCOPEN" => Tag::Span(SpanKind::SmallCaps, Edge::Open),
            "SCCLOSE" => Tag::Span(SpanKind::SmallCaps, Edge::Close),
            "SUPOPEN" => Tag::Span(SpanKind::Superscript, Edge::Open),
            "SUPCLOSE" => Tag::Span(SpanKind::Superscript, Edge::Close),
            _ => {
                let level = s.strip_prefix("Q:")?;
                // A non-numeric level still marks a poetry line; default to 1.
                Tag::Poetry(level.parse().unwrap_or(1))
            }
        };
        Some(tag)
    }

    /// Whether this tag starts a new structural chunk.
    pub fn is_structural(&self) -> bool {
        matches!(self, Tag::Poetry(_) | Tag::Prose)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{DELIM}")?;
        match self {
            Tag::Poetry(level) => write!(f, "Q:{level}")?,
            Tag::Prose => f.write_str("P")?,
            Tag::Heading => f.write_str("STYLE:HDG")?,
            Tag::Paragraph => f.write_str("STYLE:PARA")?,
            Tag::Footnote => f.write_str("FOOTNOTE")?,
            Tag::Span(kind, Edge::Open) => write!(f, "{}OPEN", kind.wire_stem())?,
            Tag::Span(kind, Edge::Close) => write!(f, "{}CLOSE", kind.wire_stem())?,
        }
        write!(f, "{DELIM}")
    }
}

/// Wraps a resolved note as an inline footnote placeholder.
pub fn footnote_placeholder(note: &str) -> String {
    format!("{}{}{}", Tag::Footnote, strip_delimiter(note), Tag::Footnote)
}

/// Removes every occurrence of the reserved delimiter from source text.
pub fn strip_delimiter(s: &str) -> String {
    s.replace(DELIM, "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    Prose,
    Poetry { indent: u8 },
}

/// One tagged unit of verse text.
///
/// `text` is already normalised and may contain footnote and style-span
/// placeholders; it is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub kind: ChunkKind,
    pub heading: bool,
    pub paragraph: bool,
    pub text: String,
}

impl Chunk {
    pub fn prose(text: impl Into<String>) -> Self {
        Self {
            kind: ChunkKind::Prose,
            heading: false,
            paragraph: false,
            text: text.into(),
        }
    }

    pub fn poetry(indent: u8, text: impl Into<String>) -> Self {
        Self {
            kind: ChunkKind::Poetry { indent },
            heading: false,
            paragraph: false,
            text: text.into(),
        }
    }

    pub fn to_wire(&self) -> String {
        let mut out = match self.kind {
            ChunkKind::Prose => Tag::Prose.to_string(),
            ChunkKind::Poetry { indent } => Tag::Poetry(indent).to_string(),
        };
        if self.heading {
            out.push_str(&Tag::Heading.to_string());
        }
        if self.paragraph {
            out.push_str(&Tag::Paragraph.to_string());
        }
        out.push_str(&self.text);
        out
    }
}

/// A verse as accumulated by the encoder, before flattening.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedVerse {
    pub chunks: Vec<Chunk>,
}

impl EncodedVerse {
    pub fn push(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Joins the chunks with single spaces into the delimited verse string.
    pub fn to_wire(&self) -> String {
        self.chunks
            .iter()
            .map(Chunk::to_wire)
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Text(&'a str),
    Tag(Tag),
    /// A piece in tag position that names no known tag.
    Unknown(&'a str),
}

/// Splits a delimited string into text and tag tokens.
///
/// Empty pieces are dropped. A piece in tag position that is not a known tag comes
/// back as [`Token::Unknown`], so malformed input degrades instead of failing.
pub fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut out = vec![];
    for (i, piece) in s.split(DELIM).enumerate() {
        let in_tag_position = i % 2 == 1;
        match (in_tag_position, Tag::parse(piece)) {
            (true, Some(tag)) => out.push(Token::Tag(tag)),
            _ if piece.is_empty() => {}
            (true, None) => out.push(Token::Unknown(piece)),
            (false, _) => out.push(Token::Text(piece)),
        }
    }
    out
}
