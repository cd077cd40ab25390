// amqp-dispatch-core/src/error.rs
use std::time::Duration;
use thiserror::Error;

/// I/O failure reported by a [`Channel`](crate::Channel) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error(
        "message published to exchange '{exchange}' with routing key '{routing_key}' was nacked by the broker"
    )]
    Nacked {
        exchange: String,
        routing_key: String,
    },

    #[error(
        "no confirmation within {}ms for message published to exchange '{exchange}' with routing key '{routing_key}'",
        .timeout.as_millis()
    )]
    ConfirmTimeout {
        exchange: String,
        routing_key: String,
        timeout: Duration,
    },

    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nack_message_names_destination() {
        let err = DispatchError::Nacked {
            exchange: "orders".into(),
            routing_key: "orders.created".into(),
        };
        let text = err.to_string();
        assert!(text.contains("'orders'"));
        assert!(text.contains("'orders.created'"));
    }

    #[test]
    fn confirm_timeout_reports_millis() {
        let err = DispatchError::ConfirmTimeout {
            exchange: String::new(),
            routing_key: "q".into(),
            timeout: Duration::from_millis(250),
        };
        assert!(err.to_string().starts_with("no confirmation within 250ms"));
    }
}
