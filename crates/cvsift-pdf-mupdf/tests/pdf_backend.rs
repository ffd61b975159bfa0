//! Text extraction from small generated PDFs.

use std::path::{Path, PathBuf};

use cvsift_core::TextBackend;
use cvsift_pdf_mupdf::MupdfBackend;

/// Write a minimal PDF with one page per entry of `pages`, each line drawn
/// in Helvetica 20pt below the previous one. Lines must be ASCII.
fn write_pdf(dir: &Path, name: &str, pages: &[&[&str]]) -> PathBuf {
    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..pages.len())
                .map(|i| format!("{} 0 R", 4 + 2 * i))
                .collect::<Vec<_>>()
                .join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    for (i, lines) in pages.iter().enumerate() {
        let mut stream = String::from("BT\n/F1 12 Tf\n72 720 Td\n");
        for (j, line) in lines.iter().enumerate() {
            if j > 0 {
                stream.push_str("0 -20 Td\n");
            }
            stream.push_str(&format!("({line}) Tj\n"));
        }
        stream.push_str("ET\n");

        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            5 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{stream}endstream",
            stream.len()
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
    }
    let xref = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
        objects.len() + 1
    ));

    let path = dir.join(name);
    std::fs::write(&path, out).unwrap();
    path
}

#[test]
fn pages_are_joined_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "two_pages.pdf",
        &[
            &["Jane Doe", "jane.doe@example.com"],
            &["Skills: Python, Docker"],
        ],
    );

    let text = MupdfBackend::new().extract_text(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec!["Jane Doe", "jane.doe@example.com", "Skills: Python, Docker"]
    );
}

#[test]
fn page_text_is_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(
        dir.path(),
        "spaced.pdf",
        &[&["   Jane     Doe   ", "Backend   Engineer"], &[]],
    );

    let text = MupdfBackend::new().extract_text(&path).unwrap();
    assert!(text.lines().any(|l| l == "Jane Doe"), "{text:?}");
    assert!(text.lines().any(|l| l == "Backend Engineer"), "{text:?}");
    assert!(text.lines().all(|l| !l.is_empty() && l == l.trim()));
    assert!(!text.contains("  "));
    assert!(!text.ends_with('\n'));
}

#[test]
fn blank_document_yields_empty_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_pdf(dir.path(), "blank.pdf", &[&[], &[]]);

    let text = MupdfBackend::new().extract_text(&path).unwrap();
    assert!(text.is_empty());
}
