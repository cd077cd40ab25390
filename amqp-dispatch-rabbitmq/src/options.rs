use serde::Deserialize;

pub const DEFAULT_FACTORY_NAME: &str = "AMQPConnectionFactory";

#[derive(Clone, Debug, Deserialize)]
pub struct RabbitMqOptions {
    pub uri: String,
    /// Nombre de la connection factory; viaja como header en las peticiones RPC.
    #[serde(default = "default_factory_name")]
    pub factory_name: String,
    /// Si true, activa publisher confirms en el canal (necesario para el modo Confirmed).
    #[serde(default)]
    pub confirms: bool,
}

fn default_factory_name() -> String {
    DEFAULT_FACTORY_NAME.to_string()
}

impl RabbitMqOptions {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            factory_name: default_factory_name(),
            confirms: false,
        }
    }
}
