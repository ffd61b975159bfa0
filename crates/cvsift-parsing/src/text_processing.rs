use once_cell::sync::Lazy;
use regex::Regex;

/// Replace every run of non-ASCII characters with a single space.
pub fn clean_text(text: &str) -> String {
    static NON_ASCII_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\x00-\x7F]+").unwrap());
    NON_ASCII_RE.replace_all(text, " ").into_owned()
}

/// The first `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
