//! Email and phone extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParsingConfig;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\d{1,3}[-\s]?\(?\d{2,4}\)?[-\s]?\d{3,4}[-\s]?\d{3,4}").unwrap()
});

pub(crate) const DEFAULT_EMAIL_KEYWORDS: &[&str] = &["email", "e-mail", "mail", "@"];

/// Extract the first email address, preferring lines near an email keyword.
pub fn extract_email(text: &str) -> Option<String> {
    extract_email_with_config(text, &ParsingConfig::default())
}

/// Config-aware version of [`extract_email`].
///
/// Pass 1 searches each line containing a keyword together with the lines
/// that follow it (`email_context_lines` in total). Pass 2 searches the
/// whole text and only runs if pass 1 found nothing.
pub fn extract_email_with_config(text: &str, config: &ParsingConfig) -> Option<String> {
    let defaults: Vec<String> = DEFAULT_EMAIL_KEYWORDS.iter().map(|s| s.to_string()).collect();
    let keywords = config.email_keywords.resolve(&defaults);

    let lines: Vec<&str> = text.split('\n').collect();
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !keywords.iter().any(|k| lower.contains(k.as_str())) {
            continue;
        }
        let end = (i + config.email_context_lines).min(lines.len());
        let window = lines[i..end].join("\n");
        if let Some(m) = EMAIL_RE.find(&window) {
            return Some(m.as_str().trim().to_string());
        }
    }

    EMAIL_RE.find(text).map(|m| m.as_str().trim().to_string())
}

/// Extract the first plausible phone number.
///
/// Each candidate is reduced to its ASCII digits and `+`. A leading `+` is
/// returned as-is, exactly ten digits become `XXX-XXX-XXXX`, longer digit
/// strings are returned raw, and anything shorter is skipped.
pub fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE.find_iter(text).find_map(|m| {
        let phone: String = m
            .as_str()
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '+')
            .collect();

        if phone.starts_with('+') {
            Some(phone)
        } else if phone.len() == 10 {
            Some(format!("{}-{}-{}", &phone[..3], &phone[3..6], &phone[6..]))
        } else if phone.len() > 10 {
            Some(phone)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParsingConfigBuilder;

    #[test]
    fn test_email_after_label() {
        assert_eq!(
            extract_email("Contact: jane.doe@example.com").as_deref(),
            Some("jane.doe@example.com")
        );
    }

    #[test]
    fn test_email_keyword_window_beats_earlier_address() {
        let text = "Referee: boss@oldcorp.com\nSummary\nE-mail\nJane.Doe@Example.org";
        // The referee line contains '@' and is itself a keyword line, so it wins.
        assert_eq!(extract_email(text).as_deref(), Some("boss@oldcorp.com"));

        let text = "Jane Doe\nEmail:\n\njane@example.com\nother@example.com";
        assert_eq!(extract_email(text).as_deref(), Some("jane@example.com"));
    }

    #[test]
    fn test_email_preserves_case() {
        assert_eq!(
            extract_email("Mail me: Jane.Doe@Example.ORG").as_deref(),
            Some("Jane.Doe@Example.ORG")
        );
    }

    #[test]
    fn test_email_context_window_is_configurable() {
        let text = "Email\nline two\nline three\nfar@example.com";
        // Outside the keyword window, but the address line itself holds '@'.
        assert_eq!(extract_email(text).as_deref(), Some("far@example.com"));

        let config = ParsingConfigBuilder::new()
            .set_email_keywords(vec!["contact".to_string()])
            .build()
            .unwrap();
        let text = "x@first.com\nContact\nsecond@example.com";
        assert_eq!(
            extract_email_with_config(text, &config).as_deref(),
            Some("second@example.com")
        );
    }

    #[test]
    fn test_no_email() {
        assert_eq!(extract_email("No address here, just a mailbox."), None);
        assert_eq!(extract_email(""), None);
    }

    #[test]
    fn test_phone_parenthesized_us_number() {
        assert_eq!(extract_phone("(555) 123-4567").as_deref(), Some("555-123-4567"));
    }

    #[test]
    fn test_phone_plain_ten_digits() {
        assert_eq!(
            extract_phone("Phone: 555.123.4567 or 5551234567").as_deref(),
            Some("555-123-4567")
        );
    }

    #[test]
    fn test_phone_international_kept_with_plus() {
        assert_eq!(
            extract_phone("Tel +44 20 7946 0958").as_deref(),
            Some("+442079460958")
        );
    }

    #[test]
    fn test_phone_long_digit_string_returned_raw() {
        assert_eq!(
            extract_phone("Mobile 91 98765 43210").as_deref(),
            Some("91987654321")
        );
    }

    #[test]
    fn test_phone_short_candidates_rejected() {
        assert_eq!(extract_phone("Class of 2019, GPA 3.9"), None);
        assert_eq!(extract_phone("ID 12 345 678"), None);
    }
}
