//! End-to-end checks of `DocxBackend` against zip packages written on the fly.

use std::io::Write;
use std::path::{Path, PathBuf};

use cvsift_core::{BackendError, TextBackend};
use cvsift_docx::DocxBackend;
use zip::write::SimpleFileOptions;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#;

fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    )
}

fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">{text}</w:t></w:r></w:p>")
}

/// Write a package with the given `(entry name, contents)` pairs.
fn write_package(dir: &Path, name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    for (entry, contents) in entries {
        zip.start_file(*entry, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}

#[test]
fn paragraphs_are_joined_with_newlines() {
    let dir = tempfile::tempdir().unwrap();
    let body = [
        paragraph("Jane Doe"),
        paragraph("jane.doe@example.com | +1 555-123-4567"),
        paragraph("Skills: Python, Docker, PostgreSQL"),
    ]
    .concat();
    let path = write_package(
        dir.path(),
        "resume.docx",
        &[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("word/document.xml", &document_xml(&body)),
        ],
    );

    let text = DocxBackend::new().extract_text(&path).unwrap();
    assert_eq!(
        text,
        "Jane Doe\njane.doe@example.com | +1 555-123-4567\nSkills: Python, Docker, PostgreSQL"
    );
}

#[test]
fn headers_and_tables_are_not_read() {
    let dir = tempfile::tempdir().unwrap();
    let body = format!(
        "{}<w:tbl><w:tr><w:tc>{}</w:tc></w:tr></w:tbl>{}",
        paragraph("Jane Doe"),
        paragraph("Kubernetes"),
        paragraph("Experience")
    );
    let path = write_package(
        dir.path(),
        "resume.docx",
        &[
            ("word/document.xml", &document_xml(&body)),
            ("word/header1.xml", &document_xml(&paragraph("Confidential"))),
        ],
    );

    let text = DocxBackend::new().extract_text(&path).unwrap();
    assert_eq!(text, "Jane Doe\nExperience");
    assert!(!text.contains("Kubernetes"));
    assert!(!text.contains("Confidential"));
}

#[test]
fn empty_body_yields_empty_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_package(
        dir.path(),
        "blank.docx",
        &[("word/document.xml", &document_xml("<w:sectPr/>"))],
    );

    let text = DocxBackend::new().extract_text(&path).unwrap();
    assert!(text.trim().is_empty());
}

#[test]
fn package_without_document_part_is_open_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_package(dir.path(), "other.docx", &[("xl/workbook.xml", "<workbook/>")]);

    let result = DocxBackend::new().extract_text(&path);
    assert!(matches!(result, Err(BackendError::OpenError(_))));
}

#[test]
fn corrupt_document_xml_keeps_leading_paragraphs() {
    let dir = tempfile::tempdir().unwrap();
    let broken = format!(
        r#"<w:document xmlns:w="x"><w:body>{}{}<w:p><w:r><w:t>cut</w:t></w:x>"#,
        paragraph("Jane Doe"),
        paragraph("Python developer")
    );
    let path = write_package(dir.path(), "broken.docx", &[("word/document.xml", &broken)]);

    let text = DocxBackend::new().extract_text(&path).unwrap();
    assert!(text.starts_with("Jane Doe\nPython developer"));
}
