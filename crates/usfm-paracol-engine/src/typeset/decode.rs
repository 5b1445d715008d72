use crate::wire::{DELIM, Edge, SpanKind, Tag, Token, tokenize};

use super::Typesetter;

/// Decodes one escaped verse string into typeset markup.
///
/// A string without the delimiter is only trimmed, which is what the token pass
/// would make of it. Otherwise the tokens are consumed in a single left-to-right pass; structural tags start payloads,
/// footnote and span tags are substituted inside the current payload.
///
/// Malformed input degrades instead of failing: dangling tags and empty payloads
/// are skipped, a stray span close is ignored and an unclosed span runs to the end
/// of the fragment. Every payload's spans are closed before the payload ends, so the
/// output is always balanced.
pub fn decode(ts: &dyn Typesetter, escaped: &str) -> String {
    if !escaped.contains(DELIM) {
        return escaped.trim().to_string();
    }

    let mut decoder = Decoder::new(ts);
    for token in tokenize(escaped) {
        decoder.push(token);
    }
    decoder.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadKind {
    Prose,
    Poetry(u8),
    /// Text outside any structural chunk.
    Literal,
}

#[derive(Debug)]
struct Payload {
    kind: PayloadKind,
    body: String,
    has_content: bool,
}

struct Decoder<'t> {
    ts: &'t dyn Typesetter,
    out: String,
    current: Option<Payload>,
    /// Open spans, innermost last. Survive payload boundaries.
    spans: Vec<SpanKind>,
    note: Option<String>,
    pending_heading: bool,
    poem_lines: bool,
    /// Set after text recovered from an unknown tag.
    space_next: bool,
}

impl<'t> Decoder<'t> {
    fn new(ts: &'t dyn Typesetter) -> Self {
        Self {
            ts,
            out: String::new(),
            current: None,
            spans: vec![],
            note: None,
            pending_heading: false,
            poem_lines: false,
            space_next: false,
        }
    }

    fn push(&mut self, token: Token<'_>) {
        match token {
            Token::Tag(Tag::Prose) => self.start_payload(PayloadKind::Prose),
            Token::Tag(Tag::Poetry(indent)) => self.start_payload(PayloadKind::Poetry(indent)),
            Token::Tag(Tag::Heading) => self.pending_heading = true,
            Token::Tag(Tag::Paragraph) => self.paragraph(),
            Token::Tag(Tag::Footnote) => self.toggle_note(),
            Token::Tag(Tag::Span(kind, edge)) => self.span(kind, edge),
            Token::Text(text) => self.text(text),
            Token::Unknown(text) => self.unknown(text),
        }
    }

    fn finish(mut self) -> String {
        self.end_payload();
        let rendered = self.out.trim();
        if self.poem_lines {
            self.ts.ragged(rendered)
        } else {
            rendered.to_string()
        }
    }

    fn start_payload(&mut self, kind: PayloadKind) {
        self.end_payload();
        self.current = Some(self.fresh_payload(kind));
    }

    /// A new payload that re-opens the spans still carried from earlier payloads.
    fn fresh_payload(&self, kind: PayloadKind) -> Payload {
        let mut body = String::new();
        for kind in &self.spans {
            body.push_str(&self.ts.span_open(*kind));
        }
        Payload {
            kind,
            body,
            has_content: false,
        }
    }

    /// The current payload, starting a literal one for text outside any chunk.
    fn payload(&mut self) -> &mut Payload {
        let payload = match self.current.take() {
            Some(payload) => payload,
            None => self.fresh_payload(PayloadKind::Literal),
        };
        self.current.insert(payload)
    }

    fn end_payload(&mut self) {
        self.close_note();
        self.space_next = false;
        let Some(mut payload) = self.current.take() else {
            return;
        };
        for kind in self.spans.iter().rev() {
            payload.body.push_str(&self.ts.span_close(*kind));
        }
        if !payload.has_content {
            return;
        }

        let body = payload.body.trim();
        match payload.kind {
            PayloadKind::Poetry(indent) => {
                self.out.push_str(&self.ts.poem_line(indent, body));
                self.poem_lines = true;
            }
            PayloadKind::Prose | PayloadKind::Literal => {
                if std::mem::take(&mut self.pending_heading) {
                    self.out.push_str(&self.ts.heading(body));
                } else {
                    self.out.push_str(body);
                }
                self.out.push(' ');
            }
        }
    }

    fn paragraph(&mut self) {
        // Out of place after text: the text before it becomes its own payload.
        if let Some(payload) = &self.current
            && payload.has_content
        {
            let kind = payload.kind;
            self.start_payload(kind);
        }
        let command = if self.out.is_empty() {
            self.ts.paragraph_mark()
        } else {
            self.ts.paragraph_break()
        };
        self.out.push_str(&command);
    }

    fn toggle_note(&mut self) {
        if self.note.is_some() {
            self.close_note();
        } else {
            self.note = Some(String::new());
        }
    }

    /// Emits the collected footnote, if any, into the current payload.
    fn close_note(&mut self) {
        let Some(note) = self.note.take() else {
            return;
        };
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        let command = self.ts.footnote(note);
        let payload = self.payload();
        payload.body.push_str(&command);
        payload.has_content = true;
    }

    fn span(&mut self, kind: SpanKind, edge: Edge) {
        // Footnote bodies never carry styling.
        if self.note.is_some() {
            return;
        }
        match edge {
            Edge::Open => {
                let command = self.ts.span_open(kind);
                self.payload().body.push_str(&command);
                self.spans.push(kind);
            }
            Edge::Close => {
                let Some(at) = self.spans.iter().rposition(|k| *k == kind) else {
                    log::trace!("ignoring stray {kind:?} close");
                    return;
                };
                let inner: Vec<SpanKind> = self.spans.drain(at..).collect();
                let mut commands = String::new();
                for k in inner.iter().rev() {
                    commands.push_str(&self.ts.span_close(*k));
                }
                for k in &inner[1..] {
                    commands.push_str(&self.ts.span_open(*k));
                    self.spans.push(*k);
                }
                self.payload().body.push_str(&commands);
            }
        }
    }

    fn text(&mut self, text: &str) {
        let spaced;
        let text = if std::mem::take(&mut self.space_next) && !text.starts_with(char::is_whitespace)
        {
            spaced = format!(" {text}");
            spaced.as_str()
        } else {
            text
        };
        if let Some(note) = self.note.as_mut() {
            note.push_str(text);
            return;
        }
        let payload = self.payload();
        payload.body.push_str(text);
        if !text.trim().is_empty() {
            payload.has_content = true;
        }
    }

    /// An unknown tag is kept as a word of its own, spaced from its neighbours.
    fn unknown(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let ends_in_word = |s: &str| !s.is_empty() && !s.ends_with(char::is_whitespace);
        let needs_space = match &self.note {
            Some(note) => ends_in_word(note),
            None => self.current.as_ref().is_some_and(|p| ends_in_word(&p.body)),
        };
        if needs_space {
            self.text(" ");
        }
        self.text(text);
        self.space_next = true;
    }
}
