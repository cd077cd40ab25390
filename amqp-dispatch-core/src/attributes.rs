// amqp-dispatch-core/src/attributes.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Value stored under a message header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Str(String),
    Bytes(Vec<u8>),
    Bool(bool),
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Str(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Str(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        HeaderValue::Bool(value)
    }
}

impl From<Vec<u8>> for HeaderValue {
    fn from(value: Vec<u8>) -> Self {
        HeaderValue::Bytes(value)
    }
}

pub type Headers = BTreeMap<String, HeaderValue>;

/// AMQP delivery-mode attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Persistence {
    Transient,
    #[default]
    Persistent,
}

impl Persistence {
    pub fn code(self) -> u8 {
        match self {
            Persistence::Transient => 1,
            Persistence::Persistent => 2,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Persistence::Transient),
            2 => Some(Persistence::Persistent),
            _ => None,
        }
    }
}

/// Protocol-level attributes sent alongside a message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolAttributes {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub persistence: Persistence,
    pub priority: Option<u8>,
    pub message_id: Option<String>,
    pub correlation_id: Option<String>,
    pub reply_to: Option<String>,
    pub expiration: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub app_id: Option<String>,
    pub user_id: Option<String>,
    pub cluster_id: Option<String>,
    pub headers: Headers,
}

impl ProtocolAttributes {
    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn with_reply_to(mut self, queue: impl Into<String>) -> Self {
        self.reply_to = Some(queue.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<HeaderValue>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_codes() {
        assert_eq!(Persistence::default().code(), 2);
        assert_eq!(Persistence::from_code(1), Some(Persistence::Transient));
        assert_eq!(Persistence::from_code(2), Some(Persistence::Persistent));
        assert_eq!(Persistence::from_code(7), None);
    }

    #[test]
    fn header_conversions() {
        let attrs = ProtocolAttributes::default()
            .with_header("a", "x")
            .with_header("b", true)
            .with_header("c", vec![1u8, 2]);
        assert_eq!(attrs.headers["a"], HeaderValue::Str("x".into()));
        assert_eq!(attrs.headers["b"], HeaderValue::Bool(true));
        assert_eq!(attrs.headers["c"], HeaderValue::Bytes(vec![1, 2]));
    }
}
