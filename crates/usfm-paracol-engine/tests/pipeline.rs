use pretty_assertions::assert_eq;
use usfm_paracol_engine::{
    DocumentMeta, Latex, MappingRow, RefError, SecondaryRef, VerseRef, assemble, build_rows,
    decode, parse_document, render_verse,
};

fn encode(usfm: &str, reference: &str) -> String {
    let book = parse_document(usfm);
    book.verses
        .get(&reference.parse().unwrap())
        .unwrap_or_else(|| panic!("missing verse {reference}"))
        .to_string()
}

#[test]
fn divine_name_decodes_to_small_caps() {
    let text = encode("\\c 5\n\\v 1 The word of \\+nd LORD\\+nd* came.\n", "5:1");
    let rendered = render_verse(&Latex, &text);

    assert_eq!(rendered, r"The word of \textsc{LORD} came.");
    assert!(!rendered.contains(r"\+"));
    assert!(!rendered.contains(r"\nd"));
}

#[test]
fn poetry_lines_decode_to_indented_poem_lines() {
    let usfm = "\\c 1\n\\v 2 \n\\q1 Hear, O heavens,\n\\q2 and give ear, O earth:\n";
    let rendered = render_verse(&Latex, &encode(usfm, "1:2"));

    insta::assert_snapshot!(
        rendered,
        @r"{\raggedright \poemline{1}{Hear, O heavens,}\poemline{2}{and give ear, O earth:}}"
    );
}

#[test]
fn heading_style_is_single_use() {
    let usfm = "\\c 3\n\\d\n\\v 1 A Psalm.\n\\v 2 Praise him.\n";
    let book = parse_document(usfm);
    let first = render_verse(&Latex, book.verses.get(&VerseRef::new(3, 1)).unwrap());
    let second = render_verse(&Latex, book.verses.get(&VerseRef::new(3, 2)).unwrap());

    assert_eq!(first, r"\VerseHeading{A Psalm.}");
    assert!(!second.contains(r"\VerseHeading"));
}

#[test]
fn footnote_round_trip() {
    let text = encode(
        "\\c 1\n\\v 2 Word\\f + \\fr 1:2 \\ft Note text\\f* follows.\n",
        "1:2",
    );
    assert!(text.contains("␞FOOTNOTE␞1:2: Note text␞FOOTNOTE␞"));
    assert_eq!(
        render_verse(&Latex, &text),
        r"Word\footnote{1:2: Note text} follows."
    );
}

#[test]
fn decoding_is_deterministic_and_passes_plain_text() {
    let text = encode("\\c 1\n\\p\n\\v 1 \\add a\\add* b\n\\q1 c\n", "1:1");
    assert_eq!(decode(&Latex, &text), decode(&Latex, &text));
    assert_eq!(decode(&Latex, "no delimiters here"), "no delimiters here");
}

#[test]
fn range_counterparts_expand_and_join() {
    let primary = parse_document("\\c 31\n\\v 35 Thus says the Lord.\n");
    let secondary = parse_document(
        "\\c 24\n\\v 40 a\n\\v 41 b\n\\v 42 c\n\\v 43 d\n\\v 44 e\n\\v 45 f\n\\v 46 g\n",
    );
    let range: SecondaryRef = "24:40-24:45".parse().unwrap();
    assert_eq!(
        range.expand().unwrap(),
        (40..=45).map(|v| VerseRef::new(24, v)).collect::<Vec<_>>()
    );

    let mapping = [MappingRow {
        primary: VerseRef::new(31, 35),
        secondary: Some(range),
    }];
    let rows = build_rows(&mapping, &primary.verses, &secondary.verses).unwrap();
    assert_eq!(rows[0].secondary_text, "␞P␞a ␞P␞b ␞P␞c ␞P␞d ␞P␞e ␞P␞f");
    assert_eq!(render_verse(&Latex, &rows[0].secondary_text), "a b c d e f");
}

#[test]
fn suffixed_or_cross_chapter_ranges_fail() {
    let suffixed: SecondaryRef = "24:40a-24:45".parse().unwrap();
    assert!(matches!(suffixed.expand(), Err(RefError::SuffixedRange(_))));

    let crossing: SecondaryRef = "24:40-25:2".parse().unwrap();
    assert!(matches!(crossing.expand(), Err(RefError::CrossChapter(_))));
}

#[test]
fn whole_document_from_two_editions() {
    let primary = parse_document(
        "\\id JER\n\\c 1\n\\p\n\\v 1 The words of Jeremiah.\n\\v 2 \\add To\\add* whom.\n\\c 2\n\\v 1 More & more.\n",
    );
    let secondary = parse_document("\\id JER\n\\c 1\n\\v 1 The words.\n\\v 2 To whom.\n");
    let mapping = [
        MappingRow {
            primary: VerseRef::new(2, 1),
            secondary: None,
        },
        MappingRow {
            primary: VerseRef::new(1, 1),
            secondary: Some("1:1".parse().unwrap()),
        },
        MappingRow {
            primary: VerseRef::new(1, 2),
            secondary: Some("1:2".parse().unwrap()),
        },
    ];
    let rows = build_rows(&mapping, &primary.verses, &secondary.verses).unwrap();
    let meta = DocumentMeta {
        title: "Jeremiah (Parallel)".into(),
        preamble: "preamble.tex".into(),
        intro: Some("intro".into()),
    };

    insta::assert_snapshot!(assemble(&Latex, &meta, &rows), @r"
    \input{preamble.tex}
    \begin{document}
    \input{intro}
    \section*{Jeremiah (Parallel)}
    \ChapterHeading{1}
    \begin{paracol}{2}
    \VersePair{1:1}{\VerseParMark{}The words of Jeremiah.}{1:1}{The words.}
    \VersePair{1:2}{\textit{To} whom.}{1:2}{To whom.}
    \end{paracol}
    \ChapterHeading{2}
    \begin{paracol}{2}
    \VersePair{2:1}{More \& more.}{—}{}
    \end{paracol}
    \end{document}
    ");
}
