//! SAX-style reader for the WordprocessingML main document part.
//!
//! Only paragraphs that are direct children of `<w:body>` are collected.
//! Paragraphs inside tables, text boxes and other containers are skipped, as
//! are headers and footers (which live in separate parts of the package).

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::Event;

const BODY: &[u8] = b"body";
const RUN: &[u8] = b"r";

/// Paragraph texts recovered from a `word/document.xml` stream.
#[derive(Debug, Default)]
pub struct ParsedBody {
    pub paragraphs: Vec<String>,
    /// Set when the XML stream was malformed and parsing stopped early.
    pub truncated: bool,
}

/// Parse a `word/document.xml` stream into body-level paragraph texts.
///
/// Within a paragraph, `<w:t>` run text is concatenated, `<w:tab/>` becomes
/// a tab and `<w:br/>`/`<w:cr/>` a newline. Malformed XML ends parsing; the
/// paragraphs completed so far (plus any partial one) are kept.
pub fn parse_document_xml<R: BufRead>(reader: R) -> ParsedBody {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(false);

    let mut buf = Vec::with_capacity(4096);
    let mut body = ParsedBody::default();

    // Local names of the currently open elements.
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut in_para = false;
    // Paragraphs nested inside the current body paragraph (text boxes).
    let mut nested = 0usize;
    let mut reading_text = false;
    let mut current = String::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.local_name().as_ref().to_vec();
                let parent = stack.last().map(Vec::as_slice);

                match name.as_slice() {
                    b"p" if parent == Some(BODY) => {
                        in_para = true;
                        nested = 0;
                        current.clear();
                    }
                    b"p" if in_para => nested += 1,
                    b"t" => reading_text = in_para && nested == 0 && parent == Some(RUN),
                    _ => {}
                }
                stack.push(name);
            }

            Ok(Event::Empty(ref e)) => {
                let name = e.local_name();
                let parent = stack.last().map(Vec::as_slice);

                if in_para && nested == 0 && parent == Some(RUN) {
                    match name.as_ref() {
                        b"tab" => current.push('\t'),
                        b"br" | b"cr" => current.push('\n'),
                        _ => {}
                    }
                } else if name.as_ref() == b"p" && parent == Some(BODY) {
                    body.paragraphs.push(String::new());
                }
            }

            Ok(Event::Text(ref e)) => {
                if reading_text {
                    if let Ok(text) = e.unescape() {
                        current.push_str(&text);
                    }
                }
            }

            Ok(Event::CData(ref e)) => {
                if reading_text {
                    current.push_str(&String::from_utf8_lossy(&e[..]));
                }
            }

            Ok(Event::End(ref e)) => {
                stack.pop();
                match e.local_name().as_ref() {
                    b"t" => reading_text = false,
                    b"p" if nested > 0 => nested -= 1,
                    b"p" if in_para && stack.last().map(Vec::as_slice) == Some(BODY) => {
                        body.paragraphs.push(std::mem::take(&mut current));
                        in_para = false;
                    }
                    _ => {}
                }
            }

            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(
                    position = xml.buffer_position(),
                    error = %e,
                    "malformed document XML, keeping paragraphs read so far"
                );
                body.truncated = true;
                if in_para && !current.is_empty() {
                    body.paragraphs.push(std::mem::take(&mut current));
                }
                break;
            }
            _ => {}
        }

        buf.clear();
    }

    body
}
