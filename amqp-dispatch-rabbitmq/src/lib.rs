mod confirms;
mod convert;
mod lapin_channel;
mod options;
mod topology;

use std::sync::Arc;

use amqp_dispatch_core::{Dispatcher, TransportError};

pub use convert::{from_basic_properties, from_field_table, to_basic_properties, to_field_table};
pub use lapin_channel::LapinChannel;
pub use options::{RabbitMqOptions, DEFAULT_FACTORY_NAME};
pub use topology::LapinTopology;

/// Opens a connection and channel and wires them into a [`Dispatcher`]
/// that declares the endpoint topology before each send.
pub async fn connect(opts: &RabbitMqOptions) -> Result<Dispatcher, TransportError> {
    let channel = LapinChannel::connect(opts).await?;
    let topology = LapinTopology::new(channel.inner().clone());
    Ok(Dispatcher::new(Arc::new(channel), opts.factory_name.clone())
        .with_topology(Arc::new(topology)))
}
