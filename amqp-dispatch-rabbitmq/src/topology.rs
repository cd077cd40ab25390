use amqp_dispatch_core::{keys::endpoint as key, EndpointParams, TopologyProvisioner, TransportError};
use async_trait::async_trait;
use lapin::{options::*, types::FieldTable, Channel, ExchangeKind};
use tracing::debug;

use crate::convert::transport;

pub(crate) fn exchange_kind(name: Option<&str>) -> ExchangeKind {
    match name.map(str::to_ascii_lowercase).as_deref() {
        None | Some("direct") => ExchangeKind::Direct,
        Some("topic") => ExchangeKind::Topic,
        Some("fanout") => ExchangeKind::Fanout,
        Some("headers") => ExchangeKind::Headers,
        Some(other) => ExchangeKind::Custom(other.to_string()),
    }
}

/// Declares the queue, exchange and binding named by the endpoint.
pub struct LapinTopology {
    ch: Channel,
}

impl LapinTopology {
    pub fn new(ch: Channel) -> Self {
        Self { ch }
    }
}

#[async_trait]
impl TopologyProvisioner for LapinTopology {
    async fn provision(
        &self,
        queue: Option<&str>,
        exchange: Option<&str>,
        params: &EndpointParams,
    ) -> Result<(), TransportError> {
        if let Some(queue) = queue {
            self.ch
                .queue_declare(
                    queue,
                    QueueDeclareOptions {
                        durable: params.flag(key::QUEUE_DURABLE, true),
                        auto_delete: params.flag(key::QUEUE_AUTO_DELETE, false),
                        exclusive: params.flag(key::QUEUE_EXCLUSIVE, false),
                        nowait: false,
                        passive: false,
                    },
                    FieldTable::default(),
                )
                .await
                .map_err(transport)?;
            debug!(queue, "queue declared");
        }

        if let Some(exchange) = exchange {
            self.ch
                .exchange_declare(
                    exchange,
                    exchange_kind(params.exchange_type()),
                    ExchangeDeclareOptions {
                        durable: params.flag(key::EXCHANGE_DURABLE, true),
                        auto_delete: params.flag(key::EXCHANGE_AUTO_DELETE, false),
                        internal: false,
                        nowait: false,
                        passive: false,
                    },
                    FieldTable::default(),
                )
                .await
                .map_err(transport)?;
            debug!(exchange, "exchange declared");
        }

        if let (Some(queue), Some(exchange)) = (queue, exchange) {
            let rk = params.routing_key().unwrap_or(queue);
            self.ch
                .queue_bind(
                    queue,
                    exchange,
                    rk,
                    QueueBindOptions { nowait: false },
                    FieldTable::default(),
                )
                .await
                .map_err(transport)?;
            debug!(queue, exchange, routing_key = rk, "queue bound");
        }

        Ok(())
    }
}
