// amqp-dispatch-core/src/channel.rs
use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{DeliveryCallback, ProtocolAttributes, TransportError};

/// Identifies a live subscription (the broker's consumer tag).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(pub String);

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of waiting on the channel's outstanding publisher confirms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Acked,
    Nacked,
    TimedOut,
}

/// One outbound channel to the broker.
///
/// Publisher confirms are tracked per channel, not per message, so a
/// channel shared by concurrent confirmed publishes cannot tell their
/// confirms apart.
#[async_trait]
pub trait Channel: Send + Sync {
    /// `exchange` is `""` for the default exchange.
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        attributes: &ProtocolAttributes,
        body: &[u8],
    ) -> Result<(), TransportError>;

    /// Provisions a fresh broker-named queue that is removed once unused.
    async fn declare_temporary_destination(&self) -> Result<String, TransportError>;

    /// Removes a temporary destination that never got a consumer.
    async fn delete_temporary_destination(&self, destination: &str) -> Result<(), TransportError>;

    async fn subscribe(
        &self,
        destination: &str,
        on_message: Arc<dyn DeliveryCallback>,
    ) -> Result<SubscriptionHandle, TransportError>;

    async fn cancel_subscription(&self, handle: &SubscriptionHandle) -> Result<(), TransportError>;

    /// Waits until every publish made so far is acked or nacked.
    async fn wait_for_confirms(&self, timeout: Duration) -> Result<Confirmation, TransportError>;
}
