//! # Verse References
//!
//! `VerseRef` is the `chapter:verse[suffix]` address used as the join key between
//! parallel texts. Ordering is chapter, then verse, then suffix, with an absent
//! suffix sorting before any letter: `40 < 40a < 40b < 41`.
//!
//! Parsing is strict. Reference tables are treated as authoritative, so anything
//! outside the grammar is a hard [`RefError`] carrying the offending text.

use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefError {
    #[error("Bad verse reference format: {0:?}")]
    Malformed(String),
    #[error("Ranges with suffixes not supported: {0}")]
    SuffixedRange(String),
    #[error("Range crosses chapters: {0}")]
    CrossChapter(String),
    #[error("Range runs backwards: {0}")]
    Reversed(String),
}

/// A single verse address.
///
/// Field order matters: the derived `Ord` compares chapter, verse, then suffix,
/// and `None < Some(_)` gives the required "bare verse first" ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerseRef {
    chapter: u32,
    verse: u32,
    suffix: Option<char>,
}

impl VerseRef {
    pub fn new(chapter: u32, verse: u32) -> Self {
        Self {
            chapter,
            verse,
            suffix: None,
        }
    }

    /// Builds a suffixed reference such as `24:40a`.
    ///
    /// The suffix must be a single ASCII letter; it is stored lowercased.
    pub fn with_suffix(chapter: u32, verse: u32, suffix: char) -> Result<Self, RefError> {
        if !suffix.is_ascii_alphabetic() {
            return Err(RefError::Malformed(format!("{chapter}:{verse}{suffix}")));
        }
        Ok(Self {
            chapter,
            verse,
            suffix: Some(suffix.to_ascii_lowercase()),
        })
    }

    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    pub fn verse(&self) -> u32 {
        self.verse
    }

    pub fn suffix(&self) -> Option<char> {
        self.suffix
    }

    pub fn has_suffix(&self) -> bool {
        self.suffix.is_some()
    }
}

fn ref_regex() -> &'static Regex {
    static REF_REGEX: OnceLock<Regex> = OnceLock::new();
    REF_REGEX.get_or_init(|| {
        Regex::new(r"^(\d+):(\d+)([A-Za-z]?)$").expect("Invalid verse reference regex")
    })
}

impl FromStr for VerseRef {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let malformed = || RefError::Malformed(s.to_string());
        let caps = ref_regex().captures(trimmed).ok_or_else(malformed)?;

        let chapter = caps[1].parse::<u32>().map_err(|_| malformed())?;
        let verse = caps[2].parse::<u32>().map_err(|_| malformed())?;
        // Chapters and verses count from one
        if chapter == 0 || verse == 0 {
            return Err(malformed());
        }
        match caps[3].chars().next() {
            Some(suffix) => Self::with_suffix(chapter, verse, suffix),
            None => Ok(Self::new(chapter, verse)),
        }
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chapter, self.verse)?;
        if let Some(suffix) = self.suffix {
            write!(f, "{suffix}")?;
        }
        Ok(())
    }
}

impl Serialize for VerseRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VerseRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An inclusive `start-end` span of verses within one chapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefRange {
    pub start: VerseRef,
    pub end: VerseRef,
}

fn range_regex() -> &'static Regex {
    static RANGE_REGEX: OnceLock<Regex> = OnceLock::new();
    RANGE_REGEX.get_or_init(|| {
        Regex::new(r"^(\d+:\d+[A-Za-z]?)\s*-\s*(\d+:\d+[A-Za-z]?)$")
            .expect("Invalid reference range regex")
    })
}

impl RefRange {
    /// Expands the range into individual references in ascending order.
    pub fn expand(&self) -> Result<Vec<VerseRef>, RefError> {
        if self.start.has_suffix() || self.end.has_suffix() {
            return Err(RefError::SuffixedRange(self.to_string()));
        }
        if self.start.chapter != self.end.chapter {
            return Err(RefError::CrossChapter(self.to_string()));
        }
        if self.start.verse > self.end.verse {
            return Err(RefError::Reversed(self.to_string()));
        }
        Ok((self.start.verse..=self.end.verse)
            .map(|verse| VerseRef::new(self.start.chapter, verse))
            .collect())
    }
}

impl FromStr for RefRange {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = range_regex()
            .captures(s.trim())
            .ok_or_else(|| RefError::Malformed(s.to_string()))?;
        Ok(Self {
            start: caps[1].parse()?,
            end: caps[2].parse()?,
        })
    }
}

impl fmt::Display for RefRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// The secondary side of an alignment row: one verse or a range of verses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryRef {
    Single(VerseRef),
    Range(RefRange),
}

impl SecondaryRef {
    pub fn expand(&self) -> Result<Vec<VerseRef>, RefError> {
        match self {
            SecondaryRef::Single(r) => Ok(vec![*r]),
            SecondaryRef::Range(range) => range.expand(),
        }
    }
}

impl FromStr for SecondaryRef {
    type Err = RefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('-') {
            s.parse().map(SecondaryRef::Range)
        } else {
            s.parse().map(SecondaryRef::Single)
        }
    }
}

impl fmt::Display for SecondaryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecondaryRef::Single(r) => r.fmt(f),
            SecondaryRef::Range(range) => range.fmt(f),
        }
    }
}
