// amqp-dispatch-core/src/dispatcher.rs
use std::{sync::Arc, time::Duration};

use tracing::{info_span, Instrument, Span};

use crate::{
    keys::context as ctx_key,
    strategy::strategy_for,
    Channel, DeliveryMode, Destination, DispatchError, EndpointParams, MessageContext,
    NoTopology, OutboundMessage, PropertyBuilder, SendResult, TopologyProvisioner,
};

/// Applies to both reply and confirm waits when the context sets none.
pub const DEFAULT_WAIT: Duration = Duration::from_millis(30_000);

/// Reads a millisecond wait from the context, falling back to [`DEFAULT_WAIT`].
pub fn wait_timeout(context: &MessageContext, key: &str) -> Duration {
    context
        .int_property(key)
        .and_then(|ms| u64::try_from(ms).ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_WAIT)
}

/// Sends messages over one shared channel.
///
/// There is no internal locking. Publisher confirms are tracked per channel,
/// so `send` must not run concurrently on the same `Dispatcher`; callers
/// that need parallel sends should use one dispatcher (and channel) each.
pub struct Dispatcher {
    channel: Arc<dyn Channel>,
    topology: Arc<dyn TopologyProvisioner>,
    factory_name: String,
    span: Span,
}

impl Dispatcher {
    pub fn new(channel: Arc<dyn Channel>, factory_name: impl Into<String>) -> Self {
        let factory_name = factory_name.into();
        Self {
            span: info_span!("dispatcher", factory = %factory_name),
            channel,
            topology: Arc::new(NoTopology),
            factory_name,
        }
    }

    pub fn with_topology(mut self, topology: Arc<dyn TopologyProvisioner>) -> Self {
        self.topology = topology;
        self
    }

    /// Replaces the span every send is recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn channel(&self) -> &Arc<dyn Channel> {
        &self.channel
    }

    pub fn factory_name(&self) -> &str {
        &self.factory_name
    }

    /// Provisions topology, builds the attributes from `context` and
    /// delivers `body` to `routing_key` according to `mode`.
    pub async fn send(
        &self,
        mode: DeliveryMode,
        routing_key: &str,
        context: &MessageContext,
        body: Vec<u8>,
        endpoint: &EndpointParams,
    ) -> Result<SendResult, DispatchError> {
        async move {
            let destination = Destination::new(endpoint.exchange_name(), routing_key)?;
            self.topology
                .provision(endpoint.queue_name(), endpoint.exchange_name(), endpoint)
                .await?;

            let attributes = PropertyBuilder::new(self.channel.as_ref(), &self.factory_name)
                .build(context, endpoint, mode)
                .await?;

            let timeout = match mode {
                DeliveryMode::FireAndForget => Duration::ZERO,
                DeliveryMode::Confirmed => wait_timeout(context, ctx_key::WAIT_CONFIRMS),
                DeliveryMode::RequestReply => wait_timeout(context, ctx_key::WAIT_REPLY),
            };

            let message = OutboundMessage::new(destination, attributes, body);
            self.run(mode, &message, timeout).await
        }
        .instrument(self.span.clone())
        .await
    }

    /// Delivers an already assembled message. `timeout` bounds the confirm
    /// or reply wait and is ignored for fire-and-forget.
    pub async fn dispatch(
        &self,
        mode: DeliveryMode,
        message: &OutboundMessage,
        timeout: Duration,
    ) -> Result<SendResult, DispatchError> {
        self.run(mode, message, timeout)
            .instrument(self.span.clone())
            .await
    }

    async fn run(
        &self,
        mode: DeliveryMode,
        message: &OutboundMessage,
        timeout: Duration,
    ) -> Result<SendResult, DispatchError> {
        let span = info_span!(
            "send",
            %mode,
            exchange = message.destination().exchange(),
            routing_key = message.destination().routing_key()
        );
        strategy_for(mode)
            .execute(&self.channel, message, timeout)
            .instrument(span)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_timeout_parsing() {
        let ctx = MessageContext::new()
            .with_property(ctx_key::WAIT_REPLY, "1500")
            .with_property(ctx_key::WAIT_CONFIRMS, "soon");
        assert_eq!(wait_timeout(&ctx, ctx_key::WAIT_REPLY), Duration::from_millis(1500));
        assert_eq!(wait_timeout(&ctx, ctx_key::WAIT_CONFIRMS), DEFAULT_WAIT);

        let ctx = MessageContext::new().with_property(ctx_key::WAIT_REPLY, -5i64);
        assert_eq!(wait_timeout(&ctx, ctx_key::WAIT_REPLY), DEFAULT_WAIT);
    }
}
