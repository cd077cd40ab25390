// amqp-dispatch-core/src/handler.rs
use crate::ReplyMessage;
use async_trait::async_trait;

/// Receives messages delivered to a subscription.
#[async_trait]
pub trait DeliveryCallback: Send + Sync {
    async fn handle(&self, delivery: ReplyMessage);
}
