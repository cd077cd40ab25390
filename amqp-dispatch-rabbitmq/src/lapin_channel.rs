use async_trait::async_trait;
use futures_util::StreamExt;
use lapin::{options::*, types::FieldTable, Channel, Connection, ConnectionProperties};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info, warn};

use crate::{
    confirms::ConfirmTracker,
    convert::{from_basic_properties, to_basic_properties, transport},
    options::RabbitMqOptions,
};
use amqp_dispatch_core::{
    Channel as DispatchChannel, Confirmation, DeliveryCallback, ProtocolAttributes, ReplyMessage,
    SubscriptionHandle, TransportError,
};

/// [`DispatchChannel`] backed by one lapin channel.
pub struct LapinChannel {
    _conn: Option<Connection>,
    ch: Channel,
    confirms: bool,
    tracker: Arc<ConfirmTracker>,
}

impl LapinChannel {
    /// Wraps a channel whose connection is owned elsewhere.
    pub fn new(ch: Channel, confirms: bool) -> Self {
        Self {
            _conn: None,
            ch,
            confirms,
            tracker: Arc::new(ConfirmTracker::new()),
        }
    }

    pub async fn connect(opts: &RabbitMqOptions) -> Result<Self, TransportError> {
        let conn = Connection::connect(&opts.uri, ConnectionProperties::default())
            .await
            .map_err(transport)?;

        let ch = conn.create_channel().await.map_err(transport)?;

        if opts.confirms {
            ch.confirm_select(ConfirmSelectOptions::default())
                .await
                .map_err(transport)?;
        }

        info!(
            factory = %opts.factory_name,
            confirms = opts.confirms,
            "RabbitMQ connected"
        );
        Ok(Self {
            _conn: Some(conn),
            ..Self::new(ch, opts.confirms)
        })
    }

    /// The underlying lapin channel, e.g. for topology declaration.
    pub fn inner(&self) -> &Channel {
        &self.ch
    }

    /// Publishes the broker has not acked or nacked yet.
    pub fn unconfirmed(&self) -> usize {
        self.tracker.outstanding()
    }
}

#[async_trait]
impl DispatchChannel for LapinChannel {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        attributes: &ProtocolAttributes,
        body: &[u8],
    ) -> Result<(), TransportError> {
        let confirm = self
            .ch
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions {
                    mandatory: false,
                    immediate: false,
                },
                body,
                to_basic_properties(attributes),
            )
            .await
            .map_err(transport)?;

        if self.confirms {
            // cada confirm se resuelve en su propia task; solo queda el contador
            self.tracker.begin();
            let tracker = Arc::clone(&self.tracker);
            tokio::spawn(async move {
                let nacked = match confirm.await {
                    Ok(c) => c.is_nack(),
                    Err(e) => {
                        warn!("publisher confirm failed: {e}");
                        true
                    }
                };
                tracker.settle(nacked);
            });
        }
        Ok(())
    }

    async fn declare_temporary_destination(&self) -> Result<String, TransportError> {
        // nombre generado por el broker; exclusiva de la conexion y auto_delete
        // la borra cuando se cancela su ultimo consumidor
        let queue = self
            .ch
            .queue_declare(
                "",
                QueueDeclareOptions {
                    durable: false,
                    auto_delete: true,
                    exclusive: true,
                    nowait: false,
                    passive: false,
                },
                FieldTable::default(),
            )
            .await
            .map_err(transport)?;
        Ok(queue.name().as_str().to_string())
    }

    async fn delete_temporary_destination(&self, destination: &str) -> Result<(), TransportError> {
        self.ch
            .queue_delete(destination, QueueDeleteOptions::default())
            .await
            .map_err(transport)?;
        Ok(())
    }

    async fn subscribe(
        &self,
        destination: &str,
        on_message: Arc<dyn DeliveryCallback>,
    ) -> Result<SubscriptionHandle, TransportError> {
        let mut consumer = self
            .ch
            .basic_consume(
                destination,
                "",
                BasicConsumeOptions {
                    no_ack: true,
                    exclusive: false,
                    nowait: false,
                    ..Default::default()
                },
                FieldTable::default(),
            )
            .await
            .map_err(transport)?;

        let tag = consumer.tag().as_str().to_string();
        debug!(queue = destination, consumer_tag = %tag, "consuming");

        let queue = destination.to_string();
        tokio::spawn(async move {
            // el stream termina con basic_cancel
            while let Some(delivery) = consumer.next().await {
                match delivery {
                    Ok(d) => {
                        let reply = ReplyMessage {
                            exchange: d.exchange.as_str().to_string(),
                            routing_key: d.routing_key.as_str().to_string(),
                            attributes: from_basic_properties(&d.properties),
                            body: d.data,
                        };
                        on_message.handle(reply).await;
                    }
                    Err(e) => {
                        error!(queue = %queue, "delivery error: {e}");
                        break;
                    }
                }
            }
            debug!(queue = %queue, "consumer stream closed");
        });

        Ok(SubscriptionHandle(tag))
    }

    async fn cancel_subscription(&self, handle: &SubscriptionHandle) -> Result<(), TransportError> {
        self.ch
            .basic_cancel(&handle.0, BasicCancelOptions::default())
            .await
            .map_err(transport)
    }

    async fn wait_for_confirms(&self, timeout: Duration) -> Result<Confirmation, TransportError> {
        if !self.confirms {
            return Err(TransportError::new(
                "publisher confirms are not enabled on this channel",
            ));
        }

        Ok(self.tracker.wait(timeout).await)
    }
}
