use crate::wire::SpanKind;

use super::{DocumentMeta, Typesetter};

/// LaTeX output for a two-column `paracol` edition.
///
/// The verse-level commands (`\poemline`, `\VerseParBreak`, `\VerseParMark`,
/// `\VerseHeading`, `\VersePair`, `\ChapterHeading`) are defined by the preamble.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latex;

impl Typesetter for Latex {
    fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '\\' => out.push_str(r"\textbackslash{}"),
                '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                    out.push('\\');
                    out.push(c);
                }
                '~' => out.push_str(r"\textasciitilde{}"),
                '^' => out.push_str(r"\textasciicircum{}"),
                _ => out.push(c),
            }
        }
        out
    }

    fn hebrew(&self, run: &str) -> String {
        format!(r"\texthebrew{{{run}}}")
    }

    fn poem_line(&self, indent: u8, text: &str) -> String {
        format!(r"\poemline{{{indent}}}{{{text}}}")
    }

    fn paragraph_break(&self) -> String {
        r"\VerseParBreak{}".to_string()
    }

    fn paragraph_mark(&self) -> String {
        r"\VerseParMark{}".to_string()
    }

    fn heading(&self, text: &str) -> String {
        format!(r"\VerseHeading{{{text}}}")
    }

    fn footnote(&self, text: &str) -> String {
        format!(r"\footnote{{{text}}}")
    }

    fn span_open(&self, kind: SpanKind) -> String {
        match kind {
            SpanKind::Emphasis => r"\textit{",
            SpanKind::SmallCaps => r"\textsc{",
            SpanKind::Superscript => r"\textsuperscript{",
        }
        .to_string()
    }

    fn span_close(&self, _kind: SpanKind) -> String {
        "}".to_string()
    }

    fn ragged(&self, body: &str) -> String {
        format!(r"{{\raggedright {body}}}")
    }

    fn begin_document(&self, meta: &DocumentMeta) -> String {
        let mut out = format!("\\input{{{}}}\n\\begin{{document}}\n", meta.preamble);
        if let Some(intro) = &meta.intro {
            out.push_str(&format!("\\input{{{intro}}}\n"));
        }
        out.push_str(&format!("\\section*{{{}}}\n", self.escape(&meta.title)));
        out
    }

    fn begin_chapter(&self, chapter: u32) -> String {
        format!("\\ChapterHeading{{{chapter}}}\n\\begin{{paracol}}{{2}}\n")
    }

    fn end_chapter(&self) -> String {
        "\\end{paracol}\n".to_string()
    }

    fn verse_pair(
        &self,
        primary_ref: &str,
        primary: &str,
        secondary_ref: &str,
        secondary: &str,
    ) -> String {
        format!("\\VersePair{{{primary_ref}}}{{{primary}}}{{{secondary_ref}}}{{{secondary}}}\n")
    }

    fn end_document(&self) -> String {
        "\\end{document}\n".to_string()
    }
}
