use amqp_dispatch_core::{HeaderValue, Headers, Persistence, ProtocolAttributes, TransportError};
use chrono::{DateTime, Utc};
use lapin::{
    types::{AMQPValue, ByteArray, FieldTable, LongString, ShortString},
    BasicProperties,
};
use tracing::debug;

pub(crate) fn transport(e: lapin::Error) -> TransportError {
    TransportError::new(e.to_string())
}

fn short(s: &str) -> ShortString {
    s.into()
}

fn opt_string(v: &Option<ShortString>) -> Option<String> {
    v.as_ref().map(|s| s.as_str().to_string())
}

pub fn to_field_table(headers: &Headers) -> FieldTable {
    let mut table = FieldTable::default();
    for (k, v) in headers {
        let value = match v {
            HeaderValue::Str(s) => AMQPValue::LongString(LongString::from(s.as_str())),
            HeaderValue::Bytes(b) => AMQPValue::ByteArray(ByteArray::from(b.clone())),
            HeaderValue::Bool(b) => AMQPValue::Boolean(*b),
        };
        table.insert(short(k), value);
    }
    table
}

/// Numeric header values come back as their decimal text; nested tables and
/// arrays are skipped.
pub fn from_field_table(table: &FieldTable) -> Headers {
    let mut headers = Headers::new();
    for (k, v) in table.inner() {
        let value = match v {
            AMQPValue::LongString(s) => {
                HeaderValue::Str(String::from_utf8_lossy(s.as_bytes()).into_owned())
            }
            AMQPValue::ShortString(s) => HeaderValue::Str(s.as_str().to_string()),
            AMQPValue::Boolean(b) => HeaderValue::Bool(*b),
            AMQPValue::ByteArray(b) => HeaderValue::Bytes(b.as_slice().to_vec()),
            AMQPValue::ShortShortInt(n) => HeaderValue::Str(n.to_string()),
            AMQPValue::ShortShortUInt(n) => HeaderValue::Str(n.to_string()),
            AMQPValue::ShortInt(n) => HeaderValue::Str(n.to_string()),
            AMQPValue::ShortUInt(n) => HeaderValue::Str(n.to_string()),
            AMQPValue::LongInt(n) => HeaderValue::Str(n.to_string()),
            AMQPValue::LongUInt(n) => HeaderValue::Str(n.to_string()),
            AMQPValue::LongLongInt(n) => HeaderValue::Str(n.to_string()),
            AMQPValue::Timestamp(n) => HeaderValue::Str(n.to_string()),
            other => {
                debug!(header = k.as_str(), value = ?other, "skipping unsupported header value");
                continue;
            }
        };
        headers.insert(k.as_str().to_string(), value);
    }
    headers
}

pub fn to_basic_properties(attrs: &ProtocolAttributes) -> BasicProperties {
    let mut props = BasicProperties::default().with_delivery_mode(attrs.persistence.code());

    if let Some(v) = &attrs.content_type {
        props = props.with_content_type(short(v));
    }
    if let Some(v) = &attrs.content_encoding {
        props = props.with_content_encoding(short(v));
    }
    if let Some(v) = attrs.priority {
        props = props.with_priority(v);
    }
    if let Some(v) = &attrs.message_id {
        props = props.with_message_id(short(v));
    }
    if let Some(v) = &attrs.correlation_id {
        props = props.with_correlation_id(short(v));
    }
    if let Some(v) = &attrs.reply_to {
        props = props.with_reply_to(short(v));
    }
    if let Some(v) = &attrs.expiration {
        props = props.with_expiration(short(v));
    }
    if let Some(secs) = attrs.timestamp.and_then(|t| u64::try_from(t.timestamp()).ok()) {
        props = props.with_timestamp(secs);
    }
    if let Some(v) = &attrs.app_id {
        props = props.with_app_id(short(v));
    }
    if let Some(v) = &attrs.user_id {
        props = props.with_user_id(short(v));
    }
    if let Some(v) = &attrs.cluster_id {
        props = props.with_cluster_id(short(v));
    }
    props.with_headers(to_field_table(&attrs.headers))
}

pub fn from_basic_properties(props: &BasicProperties) -> ProtocolAttributes {
    let persistence = match props.delivery_mode() {
        Some(code) => Persistence::from_code(i64::from(*code)).unwrap_or_default(),
        None => Persistence::default(),
    };
    ProtocolAttributes {
        content_type: opt_string(props.content_type()),
        content_encoding: opt_string(props.content_encoding()),
        persistence,
        priority: *props.priority(),
        message_id: opt_string(props.message_id()),
        correlation_id: opt_string(props.correlation_id()),
        reply_to: opt_string(props.reply_to()),
        expiration: opt_string(props.expiration()),
        timestamp: props
            .timestamp()
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        app_id: opt_string(props.app_id()),
        user_id: opt_string(props.user_id()),
        cluster_id: opt_string(props.cluster_id()),
        headers: props
            .headers()
            .as_ref()
            .map(from_field_table)
            .unwrap_or_default(),
    }
}
