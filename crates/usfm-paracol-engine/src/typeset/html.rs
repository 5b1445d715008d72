use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::wire::SpanKind;

use super::{DocumentMeta, Typesetter};

/// A self-contained HTML preview of the parallel edition.
///
/// Each chapter is a two-column table. The preamble path is linked as a stylesheet
/// and the intro, if any, is linked from the page header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html;

impl Typesetter for Html {
    fn escape(&self, text: &str) -> String {
        encode_text(text).into_owned()
    }

    fn hebrew(&self, run: &str) -> String {
        format!(r#"<span lang="he" dir="rtl">{run}</span>"#)
    }

    fn poem_line(&self, indent: u8, text: &str) -> String {
        format!(r#"<span class="poemline q{indent}">{text}</span>"#)
    }

    fn paragraph_break(&self) -> String {
        r#"<br class="par">"#.to_string()
    }

    fn paragraph_mark(&self) -> String {
        r#"<span class="parmark">¶</span>"#.to_string()
    }

    fn heading(&self, text: &str) -> String {
        format!(r#"<strong class="heading">{text}</strong>"#)
    }

    fn footnote(&self, text: &str) -> String {
        format!(r#"<span class="footnote">{text}</span>"#)
    }

    fn span_open(&self, kind: SpanKind) -> String {
        match kind {
            SpanKind::Emphasis => "<em>",
            SpanKind::SmallCaps => r#"<span class="sc">"#,
            SpanKind::Superscript => "<sup>",
        }
        .to_string()
    }

    fn span_close(&self, kind: SpanKind) -> String {
        match kind {
            SpanKind::Emphasis => "</em>",
            SpanKind::SmallCaps => "</span>",
            SpanKind::Superscript => "</sup>",
        }
        .to_string()
    }

    fn ragged(&self, body: &str) -> String {
        format!(r#"<div class="poetry">{body}</div>"#)
    }

    fn begin_document(&self, meta: &DocumentMeta) -> String {
        let title = self.escape(&meta.title);
        let mut out = format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
             <link rel=\"stylesheet\" href=\"{}\">\n</head>\n<body>\n",
            encode_double_quoted_attribute(&meta.preamble)
        );
        if let Some(intro) = &meta.intro {
            out.push_str(&format!(
                "<p class=\"intro\"><a href=\"{}\">Introduction</a></p>\n",
                encode_double_quoted_attribute(intro)
            ));
        }
        out.push_str(&format!("<h1>{title}</h1>\n"));
        out
    }

    fn begin_chapter(&self, chapter: u32) -> String {
        format!("<h2 class=\"chapter\">{chapter}</h2>\n<table class=\"paracol\">\n")
    }

    fn end_chapter(&self) -> String {
        "</table>\n".to_string()
    }

    fn verse_pair(
        &self,
        primary_ref: &str,
        primary: &str,
        secondary_ref: &str,
        secondary: &str,
    ) -> String {
        format!(
            "<tr><td class=\"ref\">{primary_ref}</td><td>{primary}</td>\
             <td class=\"ref\">{secondary_ref}</td><td>{secondary}</td></tr>\n"
        )
    }

    fn end_document(&self) -> String {
        "</body>\n</html>\n".to_string()
    }
}
