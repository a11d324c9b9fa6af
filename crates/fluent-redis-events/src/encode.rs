//! Writing events in the Fluent Bit chunk layout.
//!
//! Used to build fixtures and to replay captured records; the output is
//! readable by [`EventStream`](crate::EventStream).

use crate::error::EncodeError;
use crate::event::Event;

/// Append one event to `out` as a `[time, fields]` entry.
///
/// Events carrying metadata are written in the Fluent Bit 2.1+ layout.
///
/// # Errors
///
/// Returns [`EncodeError::Write`] if the MessagePack writer fails.
pub fn encode_event(event: &Event, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    rmpv::encode::write_value(out, &event.to_value())
        .map_err(|e| EncodeError::Write(e.to_string()))
}

/// Append several events to `out`, producing a chunk.
///
/// # Errors
///
/// Returns [`EncodeError::Write`] if the MessagePack writer fails.
pub fn encode_events<'a, I>(events: I, out: &mut Vec<u8>) -> Result<(), EncodeError>
where
    I: IntoIterator<Item = &'a Event>,
{
    for event in events {
        encode_event(event, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rmpv::Value;

    use super::*;
    use crate::event::{EVENT_TIME_EXT, EventTime, Fields};

    #[test]
    fn writes_event_time_extension() {
        let event = Event::new(EventTime::new(1000, 5), Fields::new([("k", "v")]));
        let mut out = Vec::new();
        assert!(encode_event(&event, &mut out).is_ok());

        let value = rmpv::decode::read_value(&mut out.as_slice());
        let expected = Value::Array(vec![
            Value::Ext(EVENT_TIME_EXT, vec![0, 0, 3, 232, 0, 0, 0, 5]),
            Value::Map(vec![(Value::from("k"), Value::from("v"))]),
        ]);
        assert_eq!(value.ok(), Some(expected));
    }

    #[test]
    fn metadata_uses_nested_header() {
        let mut event = Event::new(EventTime::new(1, 0), Fields::new([("k", "v")]));
        event.metadata = Fields::new([("trace", "abc")]);
        let mut out = Vec::new();
        assert!(encode_event(&event, &mut out).is_ok());

        let value = rmpv::decode::read_value(&mut out.as_slice()).unwrap_or(Value::Nil);
        let header = value.as_array().and_then(|items| items.first());
        assert!(header.is_some_and(Value::is_array));
    }
}
