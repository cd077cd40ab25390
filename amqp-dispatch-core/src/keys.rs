// amqp-dispatch-core/src/keys.rs
//! Well-known property, parameter and header names.

/// Keys read from a [`MessageContext`](crate::MessageContext).
pub mod context {
    pub const TIMESTAMP: &str = "rabbitmq.message.timestamp";
    pub const EXPIRATION: &str = "rabbitmq.message.expiration";
    pub const USER_ID: &str = "rabbitmq.message.user.id";
    pub const APP_ID: &str = "rabbitmq.message.app.id";
    pub const CLUSTER_ID: &str = "rabbitmq.message.cluster.id";
    pub const PRIORITY: &str = "rabbitmq.message.priority";
    pub const CORRELATION_ID: &str = "rabbitmq.message.correlation.id";
    pub const CONTENT_TYPE: &str = "messageType";
    pub const CONTENT_ENCODING: &str = "CHARACTER_SET_ENCODING";
    /// Milliseconds to wait for an RPC reply.
    pub const WAIT_REPLY: &str = "RABBITMQ_WAIT_REPLY";
    /// Milliseconds to wait for publisher confirms.
    pub const WAIT_CONFIRMS: &str = "RABBITMQ_WAIT_CONFIRMS";
    pub const TRANSACTION_COUNTED: &str = "INTERNAL_TRANSACTION_COUNTED";
}

/// Keys read from [`EndpointParams`](crate::EndpointParams).
pub mod endpoint {
    pub const QUEUE_NAME: &str = "rabbitmq.queue.name";
    pub const QUEUE_ROUTING_KEY: &str = "rabbitmq.queue.routing.key";
    pub const QUEUE_DURABLE: &str = "rabbitmq.queue.durable";
    pub const QUEUE_EXCLUSIVE: &str = "rabbitmq.queue.exclusive";
    pub const QUEUE_AUTO_DELETE: &str = "rabbitmq.queue.auto.delete";
    pub const QUEUE_DELIVERY_MODE: &str = "rabbitmq.queue.delivery.mode";
    pub const EXCHANGE_NAME: &str = "rabbitmq.exchange.name";
    pub const EXCHANGE_TYPE: &str = "rabbitmq.exchange.type";
    pub const EXCHANGE_DURABLE: &str = "rabbitmq.exchange.durable";
    pub const EXCHANGE_AUTO_DELETE: &str = "rabbitmq.exchange.auto.delete";
}

/// Synthetic headers added by the property builder.
pub mod header {
    pub const SOAP_ACTION: &str = "SOAP_ACTION";
    pub const TRANSACTION_COUNTED: &str = "INTERNAL_TRANSACTION_COUNTED";
    pub const CONNECTION_FACTORY: &str = "rabbitmq.connection.factory";
}
