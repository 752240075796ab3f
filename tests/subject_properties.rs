//! Property tests for subject extraction

use gmail_subject_reader::models::{Header, Message, Payload};
use gmail_subject_reader::subject::{extract_subject, SUBJECT_HEADER};
use proptest::prelude::*;

fn header_strategy() -> impl Strategy<Value = Header> {
    let name = prop_oneof![
        Just("Subject".to_string()),
        Just("subject".to_string()),
        Just("From".to_string()),
        Just("Date".to_string()),
        "[A-Za-z-]{1,12}",
    ];
    (name, "[ -~]{0,24}").prop_map(|(name, value)| Header { name, value })
}

fn message(headers: Vec<Header>) -> Message {
    Message {
        id: "m".to_string(),
        thread_id: "t".to_string(),
        payload: Some(Payload {
            mime_type: None,
            headers,
            parts: vec![],
        }),
    }
}

proptest! {
    #[test]
    fn subject_is_first_exact_match_or_empty(headers in prop::collection::vec(header_strategy(), 0..8)) {
        let expected = headers
            .iter()
            .find(|h| h.name == SUBJECT_HEADER)
            .map(|h| h.value.trim().to_string())
            .unwrap_or_default();

        prop_assert_eq!(extract_subject(&message(headers)), expected);
    }

    #[test]
    fn extraction_is_idempotent(headers in prop::collection::vec(header_strategy(), 0..8)) {
        let msg = message(headers);
        let before = msg.clone();

        let first = extract_subject(&msg);
        let second = extract_subject(&msg);

        prop_assert_eq!(first, second);
        prop_assert_eq!(msg, before);
    }

    #[test]
    fn absent_payload_is_always_empty(id in "[a-z0-9]{1,16}") {
        let msg = Message { id, thread_id: String::new(), payload: None };
        prop_assert_eq!(extract_subject(&msg), "");
    }
}
