//! Fixture tests for the parsing module.
//!
//! Fixtures (.usfm) live in `fixtures/`; each test checks the encoder invariants,
//! then compares a readable listing of the encoded verses against an inline snapshot.


use crate::{
    parsing::{ParsedBook, parse_document},
    typeset::{Latex, render_verse},
    wire::DELIM,
};

fn load_fixture(name: &str) -> ParsedBook {
    let path = format!(
        "{}/src/parsing/tests/fixtures/{name}.usfm",
        env!("CARGO_MANIFEST_DIR")
    );
    let usfm = std::fs::read_to_string(path).unwrap();
    let book = parse_document(&usfm);
    invariants::check(&book);
    book
}

#[test]
fn fixture_call_of_jeremiah() {
    let book = load_fixture("call_of_jeremiah");
    insta::assert_snapshot!(normalize::normalize(&book), @r"
    book: JER
    1:1
      P PARA: The words of Jeremiah the son of Hilkiah,[^1:1: Or, the priest] of the priests.
    1:2
      P: to whom the word of <sc>Yahweh</sc> came.
      P: The Call of Jeremiah
    1:4
      P PARA: Now the word of <sc>Yahweh</sc> came to me, saying,
      Q1: “Before I formed you in the womb, I knew you.
      Q2: Before you were born, I sanctified you.
    1:5
      P: Ah, Lord Yahweh!
    2:1
      P HDG: Hear the word <i>of</i> Yahweh.
      Q1: So it was.
    2:2
      P: Second
    ");
}

#[test]
fn fixture_edge_cases() {
    let book = load_fixture("edge_cases");
    insta::assert_snapshot!(normalize::normalize(&book), @r"
    book: PSA
    24:40
      P: Base verse.
    24:40a
      P: Then he said, go.
    24:40b
      P: A stray delimiter.
    24:41
      Q2: only poetry <sup>1</sup>
    25:1
      P PARA: don't stop <i>unclosed
    ");
}

/// Every encoded verse decodes to markup with no delimiter left and balanced groups.
#[test]
fn fixtures_decode_cleanly() {
    for name in ["call_of_jeremiah", "edge_cases"] {
        let book = load_fixture(name);
        for (reference, text) in book.verses.iter() {
            let rendered = render_verse(&Latex, text);
            assert!(!rendered.contains(DELIM), "{name} {reference}: {rendered}");
            let depth = rendered.chars().try_fold(0i32, |depth, c| match c {
                '{' => Some(depth + 1),
                '}' if depth > 0 => Some(depth - 1),
                '}' => None,
                _ => Some(depth),
            });
            assert_eq!(depth, Some(0), "{name} {reference}: {rendered}");
        }
    }
}

#[test]
fn empty_document() {
    let book = parse_document("");
    assert_eq!(book, ParsedBook::default());
}

#[test]
fn front_matter_only() {
    let book = parse_document("\\id GEN\n\\h Genesis\n\\mt1 Genesis\n");
    assert_eq!(book.book_id.as_deref(), Some("GEN"));
    assert!(book.verses.is_empty());
}

#[test]
fn crlf_line_endings() {
    let book = parse_document("\\c 1\r\n\\v 1 In the beginning\r\n\\q1 poetry\r\n");
    invariants::check(&book);
    assert_eq!(
        book.verses.get(&"1:1".parse().unwrap()),
        Some("␞P␞In the beginning ␞Q:1␞poetry")
    );
}
