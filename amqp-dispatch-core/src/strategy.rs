// amqp-dispatch-core/src/strategy.rs
use std::{borrow::Cow, sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{debug, warn, Instrument};

use crate::{
    rendezvous::{rendezvous, Polled},
    Channel, Confirmation, DeliveryMode, DispatchError, OutboundMessage, ReplyMessage,
    ReplyOutcome, SendResult, SubscriptionHandle, TransportError,
};

#[async_trait]
pub(crate) trait Strategy: Send + Sync {
    async fn execute(
        &self,
        channel: &Arc<dyn Channel>,
        message: &OutboundMessage,
        timeout: Duration,
    ) -> Result<SendResult, DispatchError>;
}

pub(crate) fn strategy_for(mode: DeliveryMode) -> &'static dyn Strategy {
    match mode {
        DeliveryMode::FireAndForget => &PublishStrategy,
        DeliveryMode::Confirmed => &ConfirmStrategy,
        DeliveryMode::RequestReply => &RpcStrategy,
    }
}

/// An empty exchange name publishes through the default exchange, where the
/// routing key names the target queue directly.
async fn publish(channel: &dyn Channel, message: &OutboundMessage) -> Result<(), DispatchError> {
    let dest = message.destination();
    debug!(
        exchange = dest.exchange(),
        routing_key = dest.routing_key(),
        bytes = message.body().len(),
        "publishing"
    );
    channel
        .publish(
            dest.exchange(),
            dest.routing_key(),
            message.attributes(),
            message.body(),
        )
        .await?;
    Ok(())
}

struct PublishStrategy;

#[async_trait]
impl Strategy for PublishStrategy {
    async fn execute(
        &self,
        channel: &Arc<dyn Channel>,
        message: &OutboundMessage,
        _timeout: Duration,
    ) -> Result<SendResult, DispatchError> {
        publish(channel.as_ref(), message).await?;
        Ok(SendResult::Published)
    }
}

struct ConfirmStrategy;

#[async_trait]
impl Strategy for ConfirmStrategy {
    async fn execute(
        &self,
        channel: &Arc<dyn Channel>,
        message: &OutboundMessage,
        timeout: Duration,
    ) -> Result<SendResult, DispatchError> {
        publish(channel.as_ref(), message).await?;

        // bounded here even if the channel ignores `timeout`
        let outcome = match tokio::time::timeout(timeout, channel.wait_for_confirms(timeout)).await
        {
            Ok(res) => res?,
            Err(_) => Confirmation::TimedOut,
        };

        let dest = message.destination();
        match outcome {
            Confirmation::Acked => Ok(SendResult::Confirmed),
            Confirmation::Nacked => Err(DispatchError::Nacked {
                exchange: dest.exchange().to_string(),
                routing_key: dest.routing_key().to_string(),
            }),
            Confirmation::TimedOut => Err(DispatchError::ConfirmTimeout {
                exchange: dest.exchange().to_string(),
                routing_key: dest.routing_key().to_string(),
                timeout,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RpcState {
    Idle,
    Published,
    AwaitingReply,
    Replied,
    TimedOut,
    Closed,
    Cancelled,
}

struct RpcCall {
    state: RpcState,
}

impl RpcCall {
    fn new() -> Self {
        Self {
            state: RpcState::Idle,
        }
    }

    fn advance(&mut self, next: RpcState) {
        debug!(from = ?self.state, to = ?next, "rpc state");
        self.state = next;
    }
}

/// Request/reply needs a non-empty correlation id; the message id stands in
/// when none was set.
fn with_correlation(message: &OutboundMessage) -> Result<Cow<'_, OutboundMessage>, DispatchError> {
    let attrs = message.attributes();
    if attrs.correlation_id.as_deref().is_some_and(|id| !id.is_empty()) {
        return Ok(Cow::Borrowed(message));
    }
    let Some(id) = attrs.message_id.as_deref().filter(|id| !id.is_empty()) else {
        return Err(DispatchError::InvalidMessage(
            "request/reply message needs a correlation id or a message id".into(),
        ));
    };
    Ok(Cow::Owned(OutboundMessage::new(
        message.destination().clone(),
        attrs.clone().with_correlation_id(id),
        message.body().to_vec(),
    )))
}

struct RpcStrategy;

#[async_trait]
impl Strategy for RpcStrategy {
    async fn execute(
        &self,
        channel: &Arc<dyn Channel>,
        message: &OutboundMessage,
        timeout: Duration,
    ) -> Result<SendResult, DispatchError> {
        let reply_to = message.attributes().reply_to.clone().ok_or_else(|| {
            DispatchError::InvalidMessage("request/reply message has no reply-to destination".into())
        })?;
        let message = with_correlation(message)?;
        let mut call = RpcCall::new();

        // the consumer goes on first: cancelling it is what lets the broker
        // auto-delete the reply queue, whichever way the call ends
        let (sender, mut pending) = rendezvous::<ReplyMessage>();
        let handle = match channel.subscribe(&reply_to, Arc::new(sender)).await {
            Ok(handle) => handle,
            Err(e) => {
                discard_destination(channel.as_ref(), &reply_to).await;
                return Err(e.into());
            }
        };
        let guard = SubscriptionGuard::new(Arc::clone(channel), handle);

        if let Err(e) = publish(channel.as_ref(), &message).await {
            guard.release().await;
            return Err(e);
        }
        call.advance(RpcState::Published);
        call.advance(RpcState::AwaitingReply);

        let polled = pending.poll(timeout).await;
        call.advance(match polled {
            Polled::Item(_) => RpcState::Replied,
            Polled::Elapsed => RpcState::TimedOut,
            Polled::Closed => RpcState::Closed,
        });

        guard.release().await;
        call.advance(RpcState::Cancelled);

        match polled {
            Polled::Item(msg) => Ok(SendResult::Reply(ReplyOutcome::Received(msg))),
            Polled::Elapsed => {
                warn!(
                    reply_to = %reply_to,
                    timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    "did not receive a response within the timeout"
                );
                Ok(SendResult::Reply(ReplyOutcome::NoReply {
                    reply_to,
                    waited: timeout,
                }))
            }
            Polled::Closed => Err(DispatchError::Transport(TransportError::new(format!(
                "reply subscription on '{reply_to}' closed before a reply arrived"
            )))),
        }
    }
}

/// Cancels the reply subscription exactly once: explicitly through
/// [`release`](Self::release), or from `Drop` when the waiting future is
/// abandoned mid-call.
struct SubscriptionGuard {
    channel: Arc<dyn Channel>,
    handle: Option<SubscriptionHandle>,
}

impl SubscriptionGuard {
    fn new(channel: Arc<dyn Channel>, handle: SubscriptionHandle) -> Self {
        Self {
            channel,
            handle: Some(handle),
        }
    }

    async fn release(mut self) {
        if let Some(handle) = self.handle.take() {
            cancel(self.channel.as_ref(), &handle).await;
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let channel = Arc::clone(&self.channel);
        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                rt.spawn(
                    async move { cancel(channel.as_ref(), &handle).await }.in_current_span(),
                );
            }
            Err(_) => warn!(consumer_tag = %handle, "no runtime left to cancel reply subscription"),
        }
    }
}

async fn cancel(channel: &dyn Channel, handle: &SubscriptionHandle) {
    if let Err(e) = channel.cancel_subscription(handle).await {
        warn!(consumer_tag = %handle, "failed to cancel reply subscription: {e}");
    }
}

async fn discard_destination(channel: &dyn Channel, destination: &str) {
    if let Err(e) = channel.delete_temporary_destination(destination).await {
        warn!(queue = destination, "failed to delete reply queue: {e}");
    }
}
