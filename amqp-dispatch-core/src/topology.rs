// amqp-dispatch-core/src/topology.rs
use async_trait::async_trait;

use crate::{EndpointParams, TransportError};

/// Makes sure queues, exchanges and bindings exist before a send.
#[async_trait]
pub trait TopologyProvisioner: Send + Sync {
    async fn provision(
        &self,
        queue: Option<&str>,
        exchange: Option<&str>,
        params: &EndpointParams,
    ) -> Result<(), TransportError>;
}

/// For deployments whose topology is declared elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTopology;

#[async_trait]
impl TopologyProvisioner for NoTopology {
    async fn provision(
        &self,
        _queue: Option<&str>,
        _exchange: Option<&str>,
        _params: &EndpointParams,
    ) -> Result<(), TransportError> {
        Ok(())
    }
}
