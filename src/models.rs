//! Message references, messages, payloads and headers

use google_gmail1::api;
use serde::{Deserialize, Serialize};

use crate::error::{GmailError, Result};

/// Identifier-only reference returned by a message listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: String,
    pub thread_id: String,
}

/// A fully fetched message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub payload: Option<Payload>,
}

/// One node of a message's MIME tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub mime_type: Option<String>,
    pub headers: Vec<Header>,
    pub parts: Vec<Payload>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl TryFrom<api::Message> for MessageRef {
    type Error = GmailError;

    fn try_from(msg: api::Message) -> Result<Self> {
        let id = msg
            .id
            .ok_or_else(|| GmailError::InvalidMessageFormat("Missing message ID".to_string()))?;

        Ok(Self {
            id,
            thread_id: msg.thread_id.unwrap_or_default(),
        })
    }
}

impl TryFrom<api::Message> for Message {
    type Error = GmailError;

    fn try_from(msg: api::Message) -> Result<Self> {
        let id = msg
            .id
            .ok_or_else(|| GmailError::InvalidMessageFormat("Missing message ID".to_string()))?;

        Ok(Self {
            id,
            thread_id: msg.thread_id.unwrap_or_default(),
            payload: msg.payload.map(Payload::from),
        })
    }
}

impl From<api::MessagePart> for Payload {
    fn from(part: api::MessagePart) -> Self {
        Self {
            mime_type: part.mime_type,
            headers: part
                .headers
                .unwrap_or_default()
                .into_iter()
                .map(Header::from)
                .collect(),
            parts: part
                .parts
                .unwrap_or_default()
                .into_iter()
                .map(Payload::from)
                .collect(),
        }
    }
}

impl From<api::MessagePartHeader> for Header {
    fn from(header: api::MessagePartHeader) -> Self {
        Self {
            name: header.name.unwrap_or_default(),
            value: header.value.unwrap_or_default(),
        }
    }
}
