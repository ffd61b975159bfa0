//! Turning per-token BIO tags from a token-classification model into
//! [`Entity`] spans over the source text.

use crate::ner::{Entity, EntityLabel};

/// One sub-word token with its predicted tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    /// `B-PER`, `I-SKILL`, `O`, or a bare kind for IO-tagged models.
    pub tag: String,
    /// Byte span in the tagged text.
    pub start: usize,
    pub end: usize,
    /// Index of the word this token belongs to; `None` for special tokens.
    pub word: Option<u32>,
}

/// Map a model's entity kind to an [`EntityLabel`].
pub fn entity_label(kind: &str) -> EntityLabel {
    match kind.to_ascii_uppercase().as_str() {
        "PER" | "PERSON" => EntityLabel::Person,
        "SKILL" | "SKILLS" => EntityLabel::Skill,
        other => EntityLabel::Other(other.to_string()),
    }
}

fn split_tag(tag: &str) -> (char, &str) {
    match tag.split_once('-') {
        Some((prefix, kind)) if prefix.len() == 1 => {
            (prefix.chars().next().unwrap_or('O').to_ascii_uppercase(), kind)
        }
        _ if tag.eq_ignore_ascii_case("O") || tag.is_empty() => ('O', ""),
        _ => ('I', tag),
    }
}

/// Group BIO-tagged tokens into entities.
///
/// The first sub-word of a word decides its tag; later pieces of the same
/// word only widen whatever span is open. `I-X` after a different kind (or
/// after `O`) starts a new span, as does every `B-X`.
pub fn decode_bio(text: &str, tokens: &[TaggedToken]) -> Vec<Entity> {
    let mut entities = Vec::new();
    let mut open: Option<(&str, usize, usize)> = None;
    let mut previous_word: Option<u32> = None;

    for token in tokens {
        let Some(word) = token.word else {
            close(text, &mut open, &mut entities);
            previous_word = None;
            continue;
        };

        if previous_word == Some(word) {
            if let Some(span) = open.as_mut() {
                span.2 = span.2.max(token.end);
            }
            continue;
        }
        previous_word = Some(word);

        match split_tag(&token.tag) {
            ('O', _) => close(text, &mut open, &mut entities),
            ('I', kind) if open.is_some_and(|(k, ..)| k.eq_ignore_ascii_case(kind)) => {
                if let Some(span) = open.as_mut() {
                    span.2 = token.end;
                }
            }
            (_, kind) => {
                close(text, &mut open, &mut entities);
                open = Some((kind, token.start, token.end));
            }
        }
    }
    close(text, &mut open, &mut entities);
    entities
}

fn close<'a>(text: &str, open: &mut Option<(&'a str, usize, usize)>, out: &mut Vec<Entity>) {
    let Some((kind, start, end)) = open.take() else {
        return;
    };
    if let Some(span) = text.get(start..end) {
        out.push(Entity {
            text: span.to_string(),
            label: entity_label(kind),
            start,
            end,
        });
    }
}

/// Split `text` at line boundaries into pieces of at most `max_bytes`
/// (a longer single line is its own piece), each with its byte offset.
pub fn chunk_lines(text: &str, max_bytes: usize) -> Vec<(usize, &str)> {
    let mut chunks = Vec::new();
    let mut chunk_start = 0;
    let mut chunk_end = 0;

    for line in text.split_inclusive('\n') {
        let line_end = chunk_end + line.len();
        if chunk_end > chunk_start && line_end - chunk_start > max_bytes {
            chunks.push((chunk_start, &text[chunk_start..chunk_end]));
            chunk_start = chunk_end;
        }
        chunk_end = line_end;
    }
    if chunk_end > chunk_start {
        chunks.push((chunk_start, &text[chunk_start..chunk_end]));
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(tag: &str, start: usize, end: usize, word: Option<u32>) -> TaggedToken {
        TaggedToken {
            tag: tag.to_string(),
            start,
            end,
            word,
        }
    }

    #[test]
    fn test_person_span_across_words() {
        let text = "Jane Doe, Kubernetes";
        let tokens = vec![
            token("O", 0, 0, None),
            token("B-PER", 0, 4, Some(0)),
            token("I-PER", 5, 8, Some(1)),
            token("O", 8, 9, Some(2)),
            token("B-SKILL", 10, 14, Some(3)),
            token("O", 14, 20, Some(3)),
            token("O", 0, 0, None),
        ];
        let entities = decode_bio(text, &tokens);
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].text, "Jane Doe");
        assert_eq!(entities[0].label, EntityLabel::Person);
        assert_eq!(entities[1].text, "Kubernetes");
        assert_eq!(entities[1].label, EntityLabel::Skill);
    }

    #[test]
    fn test_new_begin_splits_adjacent_entities() {
        let text = "Python Docker";
        let tokens = vec![
            token("B-SKILL", 0, 6, Some(0)),
            token("B-SKILL", 7, 13, Some(1)),
        ];
        let texts: Vec<String> = decode_bio(text, &tokens).into_iter().map(|e| e.text).collect();
        assert_eq!(texts, vec!["Python", "Docker"]);
    }

    #[test]
    fn test_inside_after_other_kind_starts_span() {
        let text = "Ana Souza Rust";
        let tokens = vec![
            token("I-PER", 0, 3, Some(0)),
            token("I-PER", 4, 9, Some(1)),
            token("I-SKILL", 10, 14, Some(2)),
        ];
        let entities = decode_bio(text, &tokens);
        assert_eq!(entities[0].text, "Ana Souza");
        assert_eq!(entities[1].text, "Rust");
        assert_eq!(entities[1].label, EntityLabel::Skill);
    }

    #[test]
    fn test_unprefixed_tags_and_other_kinds() {
        assert_eq!(entity_label("org"), EntityLabel::Other("ORG".into()));
        let text = "Acme";
        let entities = decode_bio(text, &[token("ORG", 0, 4, Some(0))]);
        assert_eq!(entities[0].label, EntityLabel::Other("ORG".into()));
    }

    #[test]
    fn test_out_of_range_offsets_are_dropped() {
        let entities = decode_bio("abc", &[token("B-PER", 1, 40, Some(0))]);
        assert!(entities.is_empty());
    }

    #[test]
    fn test_chunk_lines_keeps_offsets() {
        let text = "alpha\nbeta\ngamma\n";
        let chunks = chunk_lines(text, 11);
        assert_eq!(chunks, vec![(0, "alpha\nbeta\n"), (11, "gamma\n")]);
        for (offset, chunk) in &chunks {
            assert_eq!(&text[*offset..*offset + chunk.len()], *chunk);
        }

        let long = "a very long single line";
        assert_eq!(chunk_lines(long, 4), vec![(0, long)]);
        assert!(chunk_lines("", 10).is_empty());
    }
}
