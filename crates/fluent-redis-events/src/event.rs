//! Decoded log records.
//!
//! A Fluent Bit entry looks like one of:
//!
//! ```text
//! [EventTime, {fields}]                 -- classic layout
//! [[EventTime, {metadata}], {fields}]   -- Fluent Bit 2.1+ layout
//! ```
//!
//! `EventTime` is MessagePack extension type 0 carrying 8 bytes: big-endian
//! unix seconds followed by big-endian nanoseconds. Older forward-protocol
//! producers send a plain integer or float of seconds instead.

use rmpv::Value;

use crate::error::DecodeError;

/// Extension type code Fluent Bit uses for `EventTime`.
pub const EVENT_TIME_EXT: i8 = 0;

/// Length of an `EventTime` extension payload.
const EVENT_TIME_LEN: usize = 8;

/// Nanoseconds in one second.
const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Timestamp of one log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EventTime {
    seconds: u64,
    nanos: u32,
}

impl EventTime {
    /// Create a timestamp from unix seconds and a nanosecond remainder.
    pub const fn new(seconds: u64, nanos: u32) -> Self {
        Self { seconds, nanos }
    }

    /// Unix seconds. This is the part used in delivery keys.
    pub const fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Nanosecond remainder.
    pub const fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Parse the 8-byte `EventTime` extension payload.
    ///
    /// Bytes beyond the first eight are ignored.
    pub fn from_ext_payload(data: &[u8]) -> Result<Self, String> {
        let too_short = || {
            format!(
                "EventTime payload has {} bytes, expected at least {EVENT_TIME_LEN}",
                data.len()
            )
        };
        let (seconds, rest) = data.split_first_chunk::<4>().ok_or_else(too_short)?;
        let nanos = rest.first_chunk::<4>().ok_or_else(too_short)?;
        Ok(Self {
            seconds: u64::from(u32::from_be_bytes(*seconds)),
            nanos: u32::from_be_bytes(*nanos),
        })
    }

    /// Interpret the timestamp element of an entry.
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Ext(_, data) => Self::from_ext_payload(data),
            Value::Integer(int) => int
                .as_u64()
                .map(|seconds| Self::new(seconds, 0))
                .ok_or_else(|| "integer timestamp is negative".to_owned()),
            Value::F64(secs) => Self::from_float(*secs),
            Value::F32(secs) => Self::from_float(f64::from(*secs)),
            other => {
                tracing::warn!(
                    kind = value_kind(other),
                    "timestamp entry can't have attributes inspected"
                );
                Err(format!("{} is not a timestamp", value_kind(other)))
            }
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn from_float(secs: f64) -> Result<Self, String> {
        if !secs.is_finite() || secs < 0.0 || secs > u64::MAX as f64 {
            return Err(format!("float timestamp {secs} is out of range"));
        }
        let nanos = (secs.fract() * NANOS_PER_SEC) as u32;
        Ok(Self::new(secs.trunc() as u64, nanos))
    }

    /// Encode as the `EventTime` extension, or a plain integer when the
    /// seconds do not fit in 32 bits.
    pub(crate) fn to_value(self) -> Value {
        u32::try_from(self.seconds).map_or_else(
            |_| Value::from(self.seconds),
            |seconds| {
                let mut payload = Vec::with_capacity(EVENT_TIME_LEN);
                payload.extend_from_slice(&seconds.to_be_bytes());
                payload.extend_from_slice(&self.nanos.to_be_bytes());
                Value::Ext(EVENT_TIME_EXT, payload)
            },
        )
    }
}

/// The field map of a record, kept in wire order.
///
/// Names and values are raw MessagePack values; [`crate::flatten()`] decides
/// which of them can be written to the store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields(Vec<(Value, Value)>);

impl Fields {
    /// Build a field map from name/value pairs.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over name/value pairs in wire order.
    pub fn iter(&self) -> std::slice::Iter<'_, (Value, Value)> {
        self.0.iter()
    }

    /// Look up a field by its textual or binary name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(k, _)| match k {
                Value::String(s) => s.as_bytes() == name.as_bytes(),
                Value::Binary(b) => b.as_slice() == name.as_bytes(),
                _ => false,
            })
            .map(|(_, v)| v)
    }

    fn from_map(value: Value) -> Result<Self, String> {
        match value {
            Value::Map(pairs) => Ok(Self(pairs)),
            other => Err(format!("expected a map, found {}", value_kind(&other))),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Map(self.0.clone())
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a (Value, Value);
    type IntoIter = std::slice::Iter<'a, (Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One decoded log record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    /// When the record was produced.
    pub time: EventTime,
    /// The record body.
    pub fields: Fields,
    /// Per-record metadata from the Fluent Bit 2.1+ layout. Empty for the
    /// classic layout. Never written to the store.
    pub metadata: Fields,
}

impl Event {
    /// Create an event without metadata.
    pub fn new(time: EventTime, fields: Fields) -> Self {
        Self {
            time,
            fields,
            metadata: Fields::default(),
        }
    }

    /// Interpret one decoded MessagePack entry found at `offset`.
    pub(crate) fn from_value(value: Value, offset: usize) -> Result<Self, DecodeError> {
        let shape = |reason: String| DecodeError::Shape { offset, reason };

        let items = match value {
            Value::Array(items) => items,
            other => return Err(shape(format!("found {}", value_kind(&other)))),
        };
        let [header, body]: [Value; 2] = items
            .try_into()
            .map_err(|items: Vec<Value>| shape(format!("array has {} elements", items.len())))?;

        let (time, metadata) = match header {
            Value::Array(inner) => {
                let [time, metadata]: [Value; 2] = inner.try_into().map_err(|inner: Vec<Value>| {
                    shape(format!("header array has {} elements", inner.len()))
                })?;
                let metadata =
                    Fields::from_map(metadata).map_err(|e| shape(format!("metadata: {e}")))?;
                (time, metadata)
            }
            time => (time, Fields::default()),
        };

        let time = EventTime::from_value(&time)
            .map_err(|reason| DecodeError::Timestamp { offset, reason })?;
        let fields = Fields::from_map(body).map_err(|e| shape(format!("fields: {e}")))?;

        Ok(Self {
            time,
            fields,
            metadata,
        })
    }

    /// Encode back into the entry layout this event was decoded from.
    pub(crate) fn to_value(&self) -> Value {
        let header = if self.metadata.is_empty() {
            self.time.to_value()
        } else {
            Value::Array(vec![self.time.to_value(), self.metadata.to_value()])
        };
        Value::Array(vec![header, self.fields.to_value()])
    }
}

/// Human-readable MessagePack type name for diagnostics.
pub(crate) const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Nil => "nil",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::F32(_) | Value::F64(_) => "float",
        Value::String(_) => "string",
        Value::Binary(_) => "binary",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
        Value::Ext(..) => "extension",
    }
}
