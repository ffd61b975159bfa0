use once_cell::sync::Lazy;
use regex::Regex;

/// Expand common typographic ligatures found in PDFs.
pub fn expand_ligatures(text: &str) -> String {
    text.replace('\u{FB00}', "ff")
        .replace('\u{FB01}', "fi")
        .replace('\u{FB02}', "fl")
        .replace('\u{FB03}', "ffi")
        .replace('\u{FB04}', "ffl")
        .replace(['\u{FB05}', '\u{FB06}'], "st")
}

/// Clean up raw PDF text into the line-oriented form the extractors expect.
///
/// - ligatures expanded (`"ﬁle"` → `"file"`)
/// - form feeds and carriage returns become newlines
/// - remaining control characters are dropped
/// - runs of spaces/tabs collapse to a single space
/// - every line is trimmed and blank lines are folded away
pub fn normalize_pdf_text(text: &str) -> String {
    static HSPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\S\n]+").unwrap());

    let text = expand_ligatures(text)
        .replace("\r\n", "\n")
        .replace(['\r', '\x0c'], "\n");

    let text: String = text
        .chars()
        .filter(|c| *c == '\n' || *c == '\t' || !c.is_control())
        .collect();

    let text = HSPACE_RE.replace_all(&text, " ");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
