//! Common test utilities and fixtures

#![allow(dead_code)]

use gmail_subject_reader::client::MailboxClient;
use gmail_subject_reader::error::Result;
use gmail_subject_reader::models::{Header, Message, MessageRef, Payload};
use mockall::mock;

/// Create a message reference with a derived thread id
pub fn create_test_ref(id: &str) -> MessageRef {
    MessageRef {
        id: id.to_string(),
        thread_id: format!("thread_{}", id),
    }
}

/// Create a message carrying the given top-level headers
pub fn create_test_message(id: &str, headers: &[(&str, &str)]) -> Message {
    Message {
        id: id.to_string(),
        thread_id: format!("thread_{}", id),
        payload: Some(Payload {
            mime_type: Some("text/plain".to_string()),
            headers: headers
                .iter()
                .map(|(name, value)| Header::new(*name, *value))
                .collect(),
            parts: vec![],
        }),
    }
}

/// Create a message with a From, Subject and Date header
pub fn create_message_with_subject(id: &str, subject: &str) -> Message {
    create_test_message(
        id,
        &[
            ("From", "sender@example.com"),
            ("Subject", subject),
            ("Date", "Mon, 1 Jan 2024 10:00:00 -0800"),
        ],
    )
}

/// Collect what the runner wrote to its output
pub fn output_lines(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out)
        .lines()
        .map(|line| line.to_string())
        .collect()
}

// Mock implementation of MailboxClient for testing
mock! {
    pub MailboxClient {}

    #[async_trait::async_trait]
    impl MailboxClient for MailboxClient {
        async fn list_messages(&self, owner: &str, max_results: u32) -> Result<Vec<MessageRef>>;
        async fn fetch_message(&self, owner: &str, id: &str) -> Result<Message>;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_ref() {
        let msg_ref = create_test_ref("a1");
        assert_eq!(msg_ref.id, "a1");
        assert_eq!(msg_ref.thread_id, "thread_a1");
    }

    #[test]
    fn test_create_message_with_subject() {
        let message = create_message_with_subject("a1", "Hello");
        let headers = &message.payload.as_ref().unwrap().headers;
        assert_eq!(headers.len(), 3);
        assert_eq!(headers[1], Header::new("Subject", "Hello"));
    }

    #[test]
    fn test_output_lines() {
        assert_eq!(output_lines(b"one\ntwo\n"), vec!["one", "two"]);
    }
}
