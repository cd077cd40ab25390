// amqp-dispatch-core/src/endpoint.rs
use std::collections::HashMap;

use serde::Deserialize;

use crate::{keys::endpoint as key, Persistence};

/// Endpoint parameters attached to a target, as plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct EndpointParams(HashMap<String, String>);

impl EndpointParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Like [`get`](Self::get) but treats an empty value as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn queue_name(&self) -> Option<&str> {
        self.non_empty(key::QUEUE_NAME)
    }

    pub fn exchange_name(&self) -> Option<&str> {
        self.non_empty(key::EXCHANGE_NAME)
    }

    pub fn exchange_type(&self) -> Option<&str> {
        self.non_empty(key::EXCHANGE_TYPE)
    }

    pub fn routing_key(&self) -> Option<&str> {
        self.non_empty(key::QUEUE_ROUTING_KEY)
    }

    /// Falls back to persistent when the value is missing, non-numeric or
    /// not a known delivery-mode code.
    pub fn persistence(&self) -> Persistence {
        self.get(key::QUEUE_DELIVERY_MODE)
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(Persistence::from_code)
            .unwrap_or_default()
    }
}

impl From<HashMap<String, String>> for EndpointParams {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_defaults() {
        assert_eq!(EndpointParams::new().persistence(), Persistence::Persistent);
        let p = EndpointParams::new().with(key::QUEUE_DELIVERY_MODE, "1");
        assert_eq!(p.persistence(), Persistence::Transient);
        let p = EndpointParams::new().with(key::QUEUE_DELIVERY_MODE, "fast");
        assert_eq!(p.persistence(), Persistence::Persistent);
        let p = EndpointParams::new().with(key::QUEUE_DELIVERY_MODE, "9");
        assert_eq!(p.persistence(), Persistence::Persistent);
    }

    #[test]
    fn empty_names_are_absent() {
        let p = EndpointParams::new()
            .with(key::EXCHANGE_NAME, "")
            .with(key::QUEUE_NAME, "jobs");
        assert_eq!(p.exchange_name(), None);
        assert_eq!(p.queue_name(), Some("jobs"));
    }

    #[test]
    fn flags_parse_or_default() {
        let p = EndpointParams::new()
            .with(key::QUEUE_DURABLE, "false")
            .with(key::QUEUE_EXCLUSIVE, "maybe");
        assert!(!p.flag(key::QUEUE_DURABLE, true));
        assert!(p.flag(key::QUEUE_EXCLUSIVE, true));
        assert!(!p.flag(key::QUEUE_AUTO_DELETE, false));
    }
}
