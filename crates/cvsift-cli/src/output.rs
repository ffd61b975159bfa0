use std::io::Write;

use owo_colors::OwoColorize;
use serde::Serialize;

use cvsift_core::ParseResult;
use cvsift_parsing::ExtractedSkills;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    result: &'a ParseResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    categories: Option<&'a ExtractedSkills>,
}

/// Print the record as pretty JSON, with the category breakdown as an extra
/// `categories` key when requested.
pub fn print_json(
    w: &mut dyn Write,
    result: &ParseResult,
    categories: Option<&ExtractedSkills>,
) -> std::io::Result<()> {
    let report = JsonReport { result, categories };
    serde_json::to_writer_pretty(&mut *w, &report)?;
    writeln!(w)
}

/// Print a human-readable summary of one parse.
pub fn print_summary(
    w: &mut dyn Write,
    file_name: &str,
    result: &ParseResult,
    categories: Option<&ExtractedSkills>,
    color: ColorMode,
) -> std::io::Result<()> {
    if !result.success {
        if color.enabled() {
            writeln!(w, "{} {}", "FAILED:".bold().red(), file_name.bold())?;
            writeln!(w, "  {}", result.message.red())?;
        } else {
            writeln!(w, "FAILED: {}", file_name)?;
            writeln!(w, "  {}", result.message)?;
        }
        return Ok(());
    }

    if color.enabled() {
        writeln!(w, "{} {}", "PARSED:".bold().green(), file_name.bold())?;
    } else {
        writeln!(w, "PARSED: {}", file_name)?;
    }

    print_field(w, "Name", &result.name, color)?;
    print_field(w, "Email", &result.email, color)?;
    print_field(w, "Phone", &result.phone, color)?;
    print_field(w, "Skills", &result.skills, color)?;

    if let Some(categories) = categories {
        writeln!(w)?;
        for (category, skills) in categories.iter() {
            if color.enabled() {
                writeln!(w, "  {}", category.display_name().cyan())?;
            } else {
                writeln!(w, "  {}", category.display_name())?;
            }
            writeln!(w, "    {}", skills.join(", "))?;
        }
    }

    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", result.message.dimmed())?;
    } else {
        writeln!(w, "{}", result.message)?;
    }
    Ok(())
}

fn print_field(w: &mut dyn Write, label: &str, value: &str, color: ColorMode) -> std::io::Result<()> {
    let label = format!("{label}:");
    if value.is_empty() {
        if color.enabled() {
            writeln!(w, "  {:<8} {}", label, "(not found)".dimmed())
        } else {
            writeln!(w, "  {:<8} (not found)", label)
        }
    } else {
        writeln!(w, "  {:<8} {}", label, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(result: &ParseResult) -> String {
        let mut buf = Vec::new();
        print_summary(&mut buf, "jane.docx", result, None, ColorMode(false)).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn summary_marks_missing_fields() {
        let result = ParseResult::success(Some("Jane Doe".into()), None, None, "rust".into());
        let out = render(&result);
        assert!(out.starts_with("PARSED: jane.docx\n"));
        assert!(out.contains("Name:    Jane Doe"));
        assert!(out.contains("Email:   (not found)"));
    }

    #[test]
    fn summary_reports_failure_message() {
        let out = render(&ParseResult::failure("No text could be extracted from the file"));
        assert!(out.starts_with("FAILED: jane.docx\n"));
        assert!(out.contains("Error parsing resume: No text could be extracted from the file"));
    }

    #[test]
    fn json_without_categories_has_record_keys_only() {
        let mut buf = Vec::new();
        print_json(&mut buf, &ParseResult::failure("x"), None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 6);
        assert_eq!(object["success"], serde_json::Value::Bool(false));
    }
}
