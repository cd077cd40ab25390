pub mod attributes;
pub mod channel;
pub mod context;
pub mod dispatcher;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod keys;
pub mod properties;
pub mod rendezvous;
mod strategy;
pub mod topology;
pub mod types;

pub use attributes::{HeaderValue, Headers, Persistence, ProtocolAttributes};
pub use channel::{Channel, Confirmation, SubscriptionHandle};
pub use context::{ContextValue, MessageContext};
pub use dispatcher::{wait_timeout, Dispatcher, DEFAULT_WAIT};
pub use endpoint::EndpointParams;
pub use error::{DispatchError, TransportError};
pub use handler::DeliveryCallback;
pub use properties::PropertyBuilder;
pub use rendezvous::{rendezvous, PendingReply, Polled, ReplySender};
pub use topology::{NoTopology, TopologyProvisioner};
pub use types::{DeliveryMode, Destination, OutboundMessage, ReplyMessage, ReplyOutcome, SendResult};
