use crate::{
    reference::VerseRef,
    verse_map::VerseMap,
    wire::{Chunk, EncodedVerse},
};

use super::{ParsedBook, classify::LineClass, encode_fragment};

/// Where the builder is in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    SeekingBookId,
    FrontMatter,
    ChapterNoVerse,
    InVerse,
}

#[derive(Debug)]
struct OpenVerse {
    reference: VerseRef,
    verse: EncodedVerse,
}

/// Line-at-a-time state machine that turns classified USFM lines into encoded verses.
///
/// Context flags from `\d` and bare `\p` lines are single-slot and single-use: the
/// next verse marker consumes both, whether or not they were set.
pub struct VerseBuilder {
    book_id: Option<String>,
    chapter: Option<u32>,
    open: Option<OpenVerse>,
    pending_heading: bool,
    pending_paragraph: bool,
    out: VerseMap,
}

impl VerseBuilder {
    pub fn new() -> Self {
        Self {
            book_id: None,
            chapter: None,
            open: None,
            pending_heading: false,
            pending_paragraph: false,
            out: VerseMap::new(),
        }
    }

    pub fn state(&self) -> BuilderState {
        if self.open.is_some() {
            BuilderState::InVerse
        } else if self.chapter.is_some() {
            BuilderState::ChapterNoVerse
        } else if self.book_id.is_some() {
            BuilderState::FrontMatter
        } else {
            BuilderState::SeekingBookId
        }
    }

    pub fn push(&mut self, c: &LineClass) {
        match c {
            LineClass::BookId(code) => self.book_id = Some(code.clone()),
            LineClass::HeadingIntro => self.pending_heading = true,
            LineClass::ParagraphBreak => self.pending_paragraph = true,
            LineClass::Chapter(number) => {
                self.flush_verse();
                self.chapter = Some(*number);
            }
            LineClass::Verse {
                number,
                suffix,
                text,
            } => self.open_verse(*number, *suffix, text),
            LineClass::Poetry { level, text } => {
                self.continue_verse(text, |t| Chunk::poetry(*level, t))
            }
            LineClass::FlushLeft(text) => self.continue_verse(text, |t| Chunk::poetry(1, t)),
            LineClass::Paragraph(text) => self.continue_verse(text, |t| {
                let mut chunk = Chunk::prose(t);
                chunk.paragraph = true;
                chunk
            }),
            LineClass::Text(text) => self.continue_verse(text, |t| Chunk::prose(t)),
            LineClass::Blank => {}
        }
    }

    pub fn finish(mut self) -> ParsedBook {
        // EOF flush
        self.flush_verse();
        ParsedBook {
            book_id: self.book_id,
            verses: self.out,
        }
    }

    fn open_verse(&mut self, number: u32, suffix: Option<char>, text: &str) {
        let Some(chapter) = self.chapter else {
            log::debug!("ignoring verse {number} before any chapter marker");
            return;
        };
        self.flush_verse();

        let reference = match suffix {
            Some(s) => VerseRef::with_suffix(chapter, number, s)
                .unwrap_or_else(|_| VerseRef::new(chapter, number)),
            None => VerseRef::new(chapter, number),
        };

        let heading = std::mem::take(&mut self.pending_heading);
        let paragraph = std::mem::take(&mut self.pending_paragraph);

        let mut verse = EncodedVerse::default();
        let encoded = encode_fragment(text);
        if !encoded.is_empty() {
            let mut chunk = Chunk::prose(encoded);
            chunk.heading = heading;
            chunk.paragraph = paragraph;
            verse.push(chunk);
        }

        self.open = Some(OpenVerse { reference, verse });
    }

    fn continue_verse(&mut self, raw: &str, make: impl FnOnce(String) -> Chunk) {
        let Some(open) = self.open.as_mut() else {
            return;
        };
        let encoded = encode_fragment(raw);
        if !encoded.is_empty() {
            open.verse.push(make(encoded));
        }
    }

    fn flush_verse(&mut self) {
        if let Some(OpenVerse { reference, verse }) = self.open.take() {
            self.out.insert(reference, verse.to_wire());
        }
    }
}

impl Default for VerseBuilder {
    fn default() -> Self {
        Self::new()
    }
}
