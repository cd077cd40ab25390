// amqp-dispatch-core/src/context.rs
use std::collections::HashMap;

use crate::Headers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::Str(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::Str(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Int(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

/// Read-only view of the application message being sent.
#[derive(Debug, Clone, Default)]
pub struct MessageContext {
    message_id: Option<String>,
    soap_action: Option<String>,
    transport_headers: Option<Headers>,
    properties: HashMap<String, ContextValue>,
}

impl MessageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    pub fn with_soap_action(mut self, action: impl Into<String>) -> Self {
        self.soap_action = Some(action.into());
        self
    }

    pub fn with_transport_headers(mut self, headers: Headers) -> Self {
        self.transport_headers = Some(headers);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    pub fn soap_action(&self) -> Option<&str> {
        self.soap_action.as_deref()
    }

    pub fn transport_headers(&self) -> Option<&Headers> {
        self.transport_headers.as_ref()
    }

    pub fn property(&self, key: &str) -> Option<&ContextValue> {
        self.properties.get(key)
    }

    /// Only string-typed values.
    pub fn str_property(&self, key: &str) -> Option<&str> {
        match self.properties.get(key) {
            Some(ContextValue::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Integer values, or strings that parse as one.
    pub fn int_property(&self, key: &str) -> Option<i64> {
        match self.properties.get(key)? {
            ContextValue::Int(n) => Some(*n),
            ContextValue::Str(s) => s.trim().parse().ok(),
            ContextValue::Bool(_) => None,
        }
    }

    pub fn bool_property(&self, key: &str) -> Option<bool> {
        match self.properties.get(key) {
            Some(ContextValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_lookups() {
        let ctx = MessageContext::new()
            .with_property("s", "12")
            .with_property("n", 7i64)
            .with_property("b", true)
            .with_property("junk", "abc");

        assert_eq!(ctx.str_property("s"), Some("12"));
        assert_eq!(ctx.int_property("s"), Some(12));
        assert_eq!(ctx.int_property("n"), Some(7));
        assert_eq!(ctx.str_property("n"), None);
        assert_eq!(ctx.bool_property("b"), Some(true));
        assert_eq!(ctx.bool_property("s"), None);
        assert_eq!(ctx.int_property("junk"), None);
        assert_eq!(ctx.int_property("missing"), None);
    }
}
