//! Header lookup on fetched messages

use crate::models::Message;

/// Name of the header carrying a message's subject line
pub const SUBJECT_HEADER: &str = "Subject";

/// How header names are compared during a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeaderMatch {
    /// Byte-for-byte comparison
    #[default]
    Exact,
    /// ASCII case-insensitive comparison
    IgnoreCase,
}

impl HeaderMatch {
    pub fn matches(self, candidate: &str, wanted: &str) -> bool {
        match self {
            HeaderMatch::Exact => candidate == wanted,
            HeaderMatch::IgnoreCase => candidate.eq_ignore_ascii_case(wanted),
        }
    }
}

/// Return the trimmed value of the first top-level header called `name`.
///
/// Nested parts are not searched. Returns `None` when the message has no
/// payload or no header matches.
pub fn extract_header(message: &Message, name: &str, mode: HeaderMatch) -> Option<String> {
    message
        .payload
        .as_ref()?
        .headers
        .iter()
        .find(|header| mode.matches(&header.name, name))
        .map(|header| header.value.trim().to_string())
}

/// Subject line of `message`, or an empty string if it has none
pub fn extract_subject(message: &Message) -> String {
    extract_subject_with(message, HeaderMatch::Exact)
}

pub fn extract_subject_with(message: &Message, mode: HeaderMatch) -> String {
    extract_header(message, SUBJECT_HEADER, mode).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Header, Payload};

    fn message_with_headers(headers: Vec<Header>) -> Message {
        Message {
            id: "a1".to_string(),
            thread_id: "t1".to_string(),
            payload: Some(Payload {
                mime_type: Some("text/plain".to_string()),
                headers,
                parts: vec![],
            }),
        }
    }

    #[test]
    fn test_extract_subject_trims_value() {
        let message = message_with_headers(vec![
            Header::new("From", "alice@example.com"),
            Header::new("Subject", "  Hello \r\n"),
        ]);
        assert_eq!(extract_subject(&message), "Hello");
    }

    #[test]
    fn test_first_subject_wins() {
        let message = message_with_headers(vec![
            Header::new("Subject", "first"),
            Header::new("Subject", "second"),
        ]);
        assert_eq!(extract_subject(&message), "first");
    }

    #[test]
    fn test_missing_payload_gives_empty_subject() {
        let message = Message {
            id: "a1".to_string(),
            thread_id: String::new(),
            payload: None,
        };
        assert_eq!(extract_subject(&message), "");
    }

    #[test]
    fn test_no_subject_header_gives_empty_subject() {
        let message = message_with_headers(vec![Header::new("Date", "Mon, 1 Jan 2024")]);
        assert_eq!(extract_subject(&message), "");
    }

    #[test]
    fn test_exact_match_is_case_sensitive() {
        let message = message_with_headers(vec![Header::new("subject", "lower")]);
        assert_eq!(extract_subject(&message), "");
        assert_eq!(
            extract_subject_with(&message, HeaderMatch::IgnoreCase),
            "lower"
        );
    }

    #[test]
    fn test_nested_parts_are_not_searched() {
        let message = Message {
            id: "a1".to_string(),
            thread_id: String::new(),
            payload: Some(Payload {
                mime_type: Some("multipart/mixed".to_string()),
                headers: vec![],
                parts: vec![Payload {
                    mime_type: Some("message/rfc822".to_string()),
                    headers: vec![Header::new("Subject", "inner")],
                    parts: vec![],
                }],
            }),
        };
        assert_eq!(extract_subject(&message), "");
    }

    #[test]
    fn test_extract_header_other_names() {
        let message = message_with_headers(vec![
            Header::new("From", " bob@example.com "),
            Header::new("Subject", "Hi"),
        ]);
        assert_eq!(
            extract_header(&message, "From", HeaderMatch::Exact).as_deref(),
            Some("bob@example.com")
        );
        assert_eq!(extract_header(&message, "To", HeaderMatch::Exact), None);
    }
}
