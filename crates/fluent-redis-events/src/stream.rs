//! Pull-based decoding of a Fluent Bit chunk.
//!
//! A chunk is a bare concatenation of MessagePack entries. There is no
//! count and no terminator, so the stream ends when the buffer is fully
//! consumed. Anything that stops decoding before that point is reported as
//! a [`DecodeError`] and fuses the stream; whether trailing garbage is fatal
//! is left to the caller.

use std::iter::FusedIterator;

use crate::error::DecodeError;
use crate::event::Event;

/// Lazy decoder over one chunk.
///
/// Yields `Some(Ok(event))` per entry, `None` once the buffer is exhausted,
/// and at most one `Some(Err(_))` after which it yields `None` forever.
/// Each call site builds a fresh stream, so decoding always starts at byte 0.
#[derive(Debug, Clone)]
pub struct EventStream<'a> {
    remaining: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> EventStream<'a> {
    /// Start decoding `chunk` from its first byte.
    pub const fn new(chunk: &'a [u8]) -> Self {
        Self {
            remaining: chunk,
            offset: 0,
            failed: false,
        }
    }

    /// Bytes consumed so far.
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes not yet decoded.
    pub const fn remaining(&self) -> usize {
        self.remaining.len()
    }
}

impl Iterator for EventStream<'_> {
    type Item = Result<Event, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining.is_empty() {
            return None;
        }

        let offset = self.offset;
        let mut reader = self.remaining;
        let decoded = rmpv::decode::read_value(&mut reader).map_err(|e| DecodeError::Malformed {
            offset,
            reason: e.to_string(),
        });

        let consumed = self.remaining.len().saturating_sub(reader.len());
        self.offset = offset.saturating_add(consumed);
        self.remaining = reader;

        let result = decoded.and_then(|value| Event::from_value(value, offset));
        if let Err(e) = &result {
            tracing::debug!(offset, error = %e, "chunk decoding stopped");
            self.failed = true;
        }
        Some(result)
    }
}

impl FusedIterator for EventStream<'_> {}
