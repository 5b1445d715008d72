use std::sync::OnceLock;

use regex::Regex;

/// Classification of a single USFM line containing only local facts.
///
/// This is phase 1 of encoding: each line is classified independently, without
/// reference to the chapter/verse context the builder tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    /// `\id JER ...`, carrying the uppercased book code.
    BookId(String),
    /// A `\d` descriptive-heading line. Its own text is not kept.
    HeadingIntro,
    /// A bare `\p` with no text.
    ParagraphBreak,
    /// `\c N`.
    Chapter(u32),
    /// `\v N[s] text`. The text may be empty.
    Verse {
        number: u32,
        suffix: Option<char>,
        text: String,
    },
    /// `\q`, `\q1`, `\q2` ... with text; an unnumbered marker is level 1.
    Poetry { level: u8, text: String },
    /// `\m text`, flush-left poetry.
    FlushLeft(String),
    /// `\p text`, a paragraph that starts mid-verse.
    Paragraph(String),
    /// Anything else that is not blank, trimmed.
    Text(String),
    Blank,
}

struct LinePatterns {
    chapter: Regex,
    verse: Regex,
    poetry: Regex,
    flush_left: Regex,
    paragraph: Regex,
}

fn patterns() -> &'static LinePatterns {
    static PATTERNS: OnceLock<LinePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| LinePatterns {
        chapter: Regex::new(r"^\\c\s+(\d+)\s*$").expect("Invalid chapter regex"),
        verse: Regex::new(r"^\\v\s+(\d+)([a-z]?)(?:\s+(.*))?$").expect("Invalid verse regex"),
        poetry: Regex::new(r"^\\q(\d*)\s+(.*)$").expect("Invalid poetry regex"),
        flush_left: Regex::new(r"^\\m\s+(.*)$").expect("Invalid flush-left regex"),
        paragraph: Regex::new(r"^\\p\s+(.*)$").expect("Invalid paragraph regex"),
    })
}

/// Classifies individual USFM lines.
pub struct UsfmLineClassifier;

impl UsfmLineClassifier {
    /// Classifies a line into a [`LineClass`].
    ///
    /// Lines that look like markers but do not fit their grammar (a verse marker
    /// without digits, a chapter number with trailing text) fall through to
    /// [`LineClass::Text`] rather than failing.
    pub fn classify(&self, raw: &str) -> LineClass {
        let s = raw.trim();
        let p = patterns();

        if s.is_empty() {
            return LineClass::Blank;
        }

        if s.starts_with(r"\id ")
            && let Some(code) = s.split_whitespace().nth(1)
        {
            return LineClass::BookId(code.to_uppercase());
        }

        if s == r"\d" || s.starts_with(r"\d ") {
            return LineClass::HeadingIntro;
        }

        if s == r"\p" {
            return LineClass::ParagraphBreak;
        }

        if let Some(caps) = p.chapter.captures(s)
            && let Ok(number) = caps[1].parse()
        {
            return LineClass::Chapter(number);
        }

        if let Some(caps) = p.verse.captures(s)
            && let Ok(number) = caps[1].parse()
        {
            return LineClass::Verse {
                number,
                suffix: caps[2].chars().next(),
                text: caps.get(3).map_or("", |m| m.as_str()).to_string(),
            };
        }

        if let Some(caps) = p.poetry.captures(s) {
            let level = if caps[1].is_empty() {
                1
            } else {
                caps[1].parse().unwrap_or(1)
            };
            return LineClass::Poetry {
                level,
                text: caps[2].to_string(),
            };
        }

        if let Some(caps) = p.flush_left.captures(s) {
            return LineClass::FlushLeft(caps[1].to_string());
        }

        if let Some(caps) = p.paragraph.captures(s) {
            return LineClass::Paragraph(caps[1].to_string());
        }

        LineClass::Text(s.to_string())
    }
}
