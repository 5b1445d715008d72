use crate::alignment::ParallelRow;

use super::{Typesetter, render_verse};

/// Front matter of an assembled document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMeta {
    pub title: String,
    /// Preamble the document pulls in: a LaTeX input file or a stylesheet.
    pub preamble: String,
    pub intro: Option<String>,
}

impl Default for DocumentMeta {
    fn default() -> Self {
        Self {
            title: "Parallel Edition".to_string(),
            preamble: "preamble.tex".to_string(),
            intro: None,
        }
    }
}

/// Builds a complete parallel document.
///
/// Rows are grouped into chapters by their primary reference, in the order given;
/// a chapter is opened whenever the chapter number changes.
pub fn assemble(ts: &dyn Typesetter, meta: &DocumentMeta, rows: &[ParallelRow]) -> String {
    let mut out = ts.begin_document(meta);
    let mut current = None;

    for row in rows {
        let chapter = row.primary_ref.chapter();
        if current != Some(chapter) {
            if current.is_some() {
                out.push_str(&ts.end_chapter());
            }
            out.push_str(&ts.begin_chapter(chapter));
            current = Some(chapter);
        }

        out.push_str(&ts.verse_pair(
            &ts.escape(&row.primary_ref.to_string()),
            &render_verse(ts, &row.primary_text),
            &ts.escape(&row.secondary_ref),
            &render_verse(ts, &row.secondary_text),
        ));
    }

    if current.is_some() {
        out.push_str(&ts.end_chapter());
    }
    out.push_str(&ts.end_document());
    log::debug!("assembled {} rows", rows.len());
    out
}
