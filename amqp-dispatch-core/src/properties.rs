// amqp-dispatch-core/src/properties.rs
//! Turns a [`MessageContext`] plus endpoint parameters into the protocol
//! attributes of an outbound message.
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::{
    keys::{context as ctx_key, header},
    Channel, DeliveryMode, DispatchError, EndpointParams, HeaderValue, MessageContext,
    ProtocolAttributes,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses `yyyy-MM-dd HH:mm:ss`, read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Everything that needs no broker round-trip.
pub fn assemble(context: &MessageContext, endpoint: &EndpointParams) -> ProtocolAttributes {
    let mut attrs = ProtocolAttributes {
        persistence: endpoint.persistence(),
        headers: context.transport_headers().cloned().unwrap_or_default(),
        ..Default::default()
    };

    if let Some(raw) = context.str_property(ctx_key::TIMESTAMP).filter(|s| !s.is_empty()) {
        attrs.timestamp = parse_timestamp(raw);
        if attrs.timestamp.is_none() {
            warn!(timestamp = raw, "timestamp can not be parsed, omitting it");
        }
    }

    let copy = |key: &str| context.str_property(key).map(str::to_string);
    attrs.expiration = copy(ctx_key::EXPIRATION);
    attrs.user_id = copy(ctx_key::USER_ID);
    attrs.app_id = copy(ctx_key::APP_ID);
    attrs.cluster_id = copy(ctx_key::CLUSTER_ID);
    attrs.content_type = copy(ctx_key::CONTENT_TYPE);
    attrs.content_encoding = copy(ctx_key::CONTENT_ENCODING);

    if let Some(p) = context.int_property(ctx_key::PRIORITY) {
        match u8::try_from(p) {
            Ok(p) => attrs.priority = Some(p),
            Err(_) => warn!(priority = p, "priority out of range, omitting it"),
        }
    }

    attrs.message_id = context.message_id().map(str::to_string);
    attrs.correlation_id = context
        .str_property(ctx_key::CORRELATION_ID)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .or_else(|| attrs.message_id.clone());

    if let Some(action) = context.soap_action() {
        attrs
            .headers
            .insert(header::SOAP_ACTION.to_string(), HeaderValue::Str(action.to_string()));
    }
    if let Some(counted) = context.bool_property(ctx_key::TRANSACTION_COUNTED) {
        attrs
            .headers
            .insert(header::TRANSACTION_COUNTED.to_string(), HeaderValue::Bool(counted));
    }

    attrs
}

/// Builds attributes for one send, provisioning a reply queue when the
/// mode expects a reply.
pub struct PropertyBuilder<'a> {
    channel: &'a dyn Channel,
    factory_name: &'a str,
}

impl<'a> PropertyBuilder<'a> {
    pub fn new(channel: &'a dyn Channel, factory_name: &'a str) -> Self {
        Self {
            channel,
            factory_name,
        }
    }

    pub async fn build(
        &self,
        context: &MessageContext,
        endpoint: &EndpointParams,
        mode: DeliveryMode,
    ) -> Result<ProtocolAttributes, DispatchError> {
        let mut attrs = assemble(context, endpoint);
        if !mode.expects_reply() {
            return Ok(attrs);
        }

        if attrs.correlation_id.as_deref().map_or(true, str::is_empty) {
            let id = Uuid::new_v4().to_string();
            attrs.message_id.get_or_insert_with(|| id.clone());
            attrs.correlation_id = Some(id);
        }

        attrs.reply_to = Some(self.channel.declare_temporary_destination().await?);
        attrs.headers.insert(
            header::CONNECTION_FACTORY.to_string(),
            HeaderValue::Str(self.factory_name.to_string()),
        );
        Ok(attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{keys::endpoint as ep_key, Headers, Persistence};
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_timestamp_format() {
        let ts = parse_timestamp("2024-03-09 17:45:02").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 9));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (17, 45, 2));
        assert!(parse_timestamp("2024-03-09T17:45:02Z").is_none());
        assert!(parse_timestamp("not-a-date").is_none());
    }

    #[test]
    fn malformed_timestamp_is_omitted() {
        let ctx = MessageContext::new().with_property(ctx_key::TIMESTAMP, "not-a-date");
        let attrs = assemble(&ctx, &EndpointParams::new());
        assert_eq!(attrs.timestamp, None);
    }

    #[test]
    fn correlation_defaults_to_message_id() {
        let ctx = MessageContext::new().with_message_id("urn:uuid:1");
        let attrs = assemble(&ctx, &EndpointParams::new());
        assert_eq!(attrs.message_id.as_deref(), Some("urn:uuid:1"));
        assert_eq!(attrs.correlation_id.as_deref(), Some("urn:uuid:1"));

        let ctx = MessageContext::new()
            .with_message_id("urn:uuid:1")
            .with_property(ctx_key::CORRELATION_ID, "");
        assert_eq!(
            assemble(&ctx, &EndpointParams::new()).correlation_id.as_deref(),
            Some("urn:uuid:1")
        );

        let ctx = MessageContext::new()
            .with_message_id("urn:uuid:1")
            .with_property(ctx_key::CORRELATION_ID, "corr-9");
        assert_eq!(
            assemble(&ctx, &EndpointParams::new()).correlation_id.as_deref(),
            Some("corr-9")
        );
    }

    #[test]
    fn copies_context_properties() {
        let ctx = MessageContext::new()
            .with_property(ctx_key::EXPIRATION, "60000")
            .with_property(ctx_key::USER_ID, "guest")
            .with_property(ctx_key::APP_ID, "billing")
            .with_property(ctx_key::CLUSTER_ID, "c1")
            .with_property(ctx_key::PRIORITY, 5i64)
            .with_property(ctx_key::CONTENT_TYPE, "application/json")
            .with_property(ctx_key::CONTENT_ENCODING, "UTF-8")
            .with_property(ctx_key::TIMESTAMP, "2020-01-01 00:00:00");
        let endpoint = EndpointParams::new().with(ep_key::QUEUE_DELIVERY_MODE, "1");

        let attrs = assemble(&ctx, &endpoint);
        assert_eq!(attrs.expiration.as_deref(), Some("60000"));
        assert_eq!(attrs.user_id.as_deref(), Some("guest"));
        assert_eq!(attrs.app_id.as_deref(), Some("billing"));
        assert_eq!(attrs.cluster_id.as_deref(), Some("c1"));
        assert_eq!(attrs.priority, Some(5));
        assert_eq!(attrs.content_type.as_deref(), Some("application/json"));
        assert_eq!(attrs.content_encoding.as_deref(), Some("UTF-8"));
        assert_eq!(attrs.persistence, Persistence::Transient);
        assert_eq!(attrs.timestamp.map(|t| t.timestamp()), Some(1_577_836_800));
        assert_eq!(attrs.reply_to, None);
    }

    #[test]
    fn out_of_range_priority_is_dropped() {
        let ctx = MessageContext::new().with_property(ctx_key::PRIORITY, 300i64);
        assert_eq!(assemble(&ctx, &EndpointParams::new()).priority, None);
    }

    #[test]
    fn synthetic_headers() {
        let mut headers = Headers::new();
        headers.insert("tenant".into(), HeaderValue::Str("acme".into()));
        let ctx = MessageContext::new()
            .with_transport_headers(headers)
            .with_soap_action("urn:getQuote")
            .with_property(ctx_key::TRANSACTION_COUNTED, true);

        let attrs = assemble(&ctx, &EndpointParams::new());
        assert_eq!(attrs.headers["tenant"], HeaderValue::Str("acme".into()));
        assert_eq!(
            attrs.headers[header::SOAP_ACTION],
            HeaderValue::Str("urn:getQuote".into())
        );
        assert_eq!(attrs.headers[header::TRANSACTION_COUNTED], HeaderValue::Bool(true));
    }

    #[test]
    fn non_boolean_transaction_marker_is_ignored() {
        let ctx = MessageContext::new().with_property(ctx_key::TRANSACTION_COUNTED, "true");
        let attrs = assemble(&ctx, &EndpointParams::new());
        assert!(attrs.headers.is_empty());
    }
}
