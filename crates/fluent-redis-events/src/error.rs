//! Error types for chunk decoding, flattening and encoding.

/// Errors produced while pulling an [`Event`](crate::Event) out of a chunk.
///
/// Every variant carries the byte offset of the entry that failed so the
/// caller can report how much of the buffer was consumed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The bytes at `offset` are not a complete MessagePack value.
    #[error("malformed MessagePack at byte {offset}: {reason}")]
    Malformed {
        /// Byte offset of the entry within the chunk.
        offset: usize,
        /// Description from the MessagePack reader.
        reason: String,
    },

    /// The entry is not a `[timestamp, fields]` array.
    #[error("entry at byte {offset} is not a [timestamp, fields] pair: {reason}")]
    Shape {
        /// Byte offset of the entry within the chunk.
        offset: usize,
        /// What was found instead.
        reason: String,
    },

    /// The timestamp element cannot be turned into an [`EventTime`](crate::EventTime).
    #[error("entry at byte {offset} has an unusable timestamp: {reason}")]
    Timestamp {
        /// Byte offset of the entry within the chunk.
        offset: usize,
        /// Why the timestamp was rejected.
        reason: String,
    },
}

impl DecodeError {
    /// Byte offset of the entry that failed to decode.
    pub const fn offset(&self) -> usize {
        match self {
            Self::Malformed { offset, .. }
            | Self::Shape { offset, .. }
            | Self::Timestamp { offset, .. } => *offset,
        }
    }
}

/// Errors produced while flattening a field map.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlattenError {
    /// A field name is neither a string nor binary.
    #[error("field name of type {kind} cannot be written as a hash field")]
    UnsupportedName {
        /// MessagePack type of the offending name.
        kind: &'static str,
    },

    /// A field value is neither a string nor binary.
    #[error("value of field {field:?} has type {kind} and cannot be written as a hash value")]
    UnsupportedValue {
        /// Name of the offending field (lossy UTF-8).
        field: String,
        /// MessagePack type of the offending value.
        kind: &'static str,
    },
}

/// Errors produced while writing events back to MessagePack.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The MessagePack writer failed.
    #[error("failed to encode event: {0}")]
    Write(String),
}
