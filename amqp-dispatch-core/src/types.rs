// amqp-dispatch-core/src/types.rs
use std::{fmt, str::FromStr, time::Duration};

use serde::Deserialize;

use crate::{DispatchError, ProtocolAttributes};

/// How a single `send` is delivered. Chosen per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum DeliveryMode {
    FireAndForget,
    Confirmed,
    RequestReply,
}

impl DeliveryMode {
    pub fn expects_reply(self) -> bool {
        matches!(self, DeliveryMode::RequestReply)
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeliveryMode::FireAndForget => "fire_and_forget",
            DeliveryMode::Confirmed => "publisher_confirms",
            DeliveryMode::RequestReply => "rpc",
        };
        f.write_str(name)
    }
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire_and_forget" | "fireandforget" | "default" => Ok(DeliveryMode::FireAndForget),
            "publisher_confirms" | "confirmed" => Ok(DeliveryMode::Confirmed),
            "rpc" | "requestreply" | "request_reply" => Ok(DeliveryMode::RequestReply),
            other => Err(format!("unknown delivery mode: {other}")),
        }
    }
}

impl TryFrom<String> for DeliveryMode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Exchange/routing-key pair a message is published to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    exchange: String,
    routing_key: String,
}

impl Destination {
    /// An empty exchange name means the broker's default exchange.
    pub fn new(exchange: Option<&str>, routing_key: &str) -> Result<Self, DispatchError> {
        if routing_key.is_empty() {
            return Err(DispatchError::InvalidMessage("routing key must not be empty".into()));
        }
        Ok(Self {
            exchange: exchange.unwrap_or_default().to_string(),
            routing_key: routing_key.to_string(),
        })
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    pub fn routing_key(&self) -> &str {
        &self.routing_key
    }

    pub fn uses_default_exchange(&self) -> bool {
        self.exchange.is_empty()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.uses_default_exchange() {
            write!(f, "(default)/{}", self.routing_key)
        } else {
            write!(f, "{}/{}", self.exchange, self.routing_key)
        }
    }
}

/// A message ready to go out on the channel.
#[derive(Debug, Clone)]
pub struct OutboundMessage {
    destination: Destination,
    attributes: ProtocolAttributes,
    body: Vec<u8>,
}

impl OutboundMessage {
    pub fn new(destination: Destination, attributes: ProtocolAttributes, body: Vec<u8>) -> Self {
        Self {
            destination,
            attributes,
            body,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn attributes(&self) -> &ProtocolAttributes {
        &self.attributes
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

/// A message delivered on a reply destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyMessage {
    pub exchange: String,
    pub routing_key: String,
    pub attributes: ProtocolAttributes,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Received(ReplyMessage),
    /// The bounded wait elapsed with nothing delivered. Not an error.
    NoReply { reply_to: String, waited: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    Published,
    Confirmed,
    Reply(ReplyOutcome),
}

impl SendResult {
    pub fn reply(&self) -> Option<&ReplyMessage> {
        match self {
            SendResult::Reply(ReplyOutcome::Received(msg)) => Some(msg),
            _ => None,
        }
    }

    pub fn into_reply(self) -> Option<ReplyMessage> {
        match self {
            SendResult::Reply(ReplyOutcome::Received(msg)) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_mode_parses_config_names() {
        assert_eq!("rpc".parse::<DeliveryMode>(), Ok(DeliveryMode::RequestReply));
        assert_eq!(
            "publisher_confirms".parse::<DeliveryMode>(),
            Ok(DeliveryMode::Confirmed)
        );
        assert_eq!(
            " Fire_And_Forget ".parse::<DeliveryMode>(),
            Ok(DeliveryMode::FireAndForget)
        );
        assert!("carrier-pigeon".parse::<DeliveryMode>().is_err());
    }

    #[test]
    fn destination_requires_routing_key() {
        assert!(matches!(
            Destination::new(Some("ex"), ""),
            Err(DispatchError::InvalidMessage(_))
        ));
    }

    #[test]
    fn destination_empty_exchange_is_default() {
        let d = Destination::new(None, "jobs").unwrap();
        assert!(d.uses_default_exchange());
        assert_eq!(d.to_string(), "(default)/jobs");

        let d = Destination::new(Some(""), "jobs").unwrap();
        assert!(d.uses_default_exchange());

        let d = Destination::new(Some("work"), "jobs").unwrap();
        assert!(!d.uses_default_exchange());
        assert_eq!(d.exchange(), "work");
    }
}
