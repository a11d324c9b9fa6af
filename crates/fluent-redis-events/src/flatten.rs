//! Flattening a record into `HSET` arguments.
//!
//! `HSET key f1 v1 f2 v2 ...` takes its fields as one flat list. Names and
//! values are passed through as opaque bytes: strings and binaries are both
//! accepted, nothing is escaped or type-tagged. Any other MessagePack type
//! fails the whole record.

use rmpv::Value;

use crate::error::FlattenError;
use crate::event::{Fields, value_kind};

/// Alternating name/value byte strings. Always an even number of entries.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlatRecord(Vec<Vec<u8>>);

impl FlatRecord {
    /// Number of arguments (twice the number of fields).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The flat argument list.
    pub fn as_slice(&self) -> &[Vec<u8>] {
        &self.0
    }

    /// Consume the record, returning the flat argument list.
    pub fn into_args(self) -> Vec<Vec<u8>> {
        self.0
    }

    /// Iterate over `(name, value)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&[u8], &[u8])> {
        self.0.chunks_exact(2).filter_map(|pair| match pair {
            [name, value] => Some((name.as_slice(), value.as_slice())),
            _ => None,
        })
    }
}

/// Flatten a field map into alternating name/value arguments.
///
/// Pair order follows the map's wire order; callers must not rely on it.
///
/// # Errors
///
/// Returns [`FlattenError::UnsupportedName`] or
/// [`FlattenError::UnsupportedValue`] if a name or value is not a string
/// or binary.
pub fn flatten(fields: &Fields) -> Result<FlatRecord, FlattenError> {
    let mut args = Vec::with_capacity(fields.len().saturating_mul(2));
    for (name, value) in fields {
        let name = raw_bytes(name).ok_or(FlattenError::UnsupportedName {
            kind: value_kind(name),
        })?;
        let value = raw_bytes(value).ok_or_else(|| FlattenError::UnsupportedValue {
            field: String::from_utf8_lossy(name).into_owned(),
            kind: value_kind(value),
        })?;
        args.push(name.to_vec());
        args.push(value.to_vec());
    }
    Ok(FlatRecord(args))
}

fn raw_bytes(value: &Value) -> Option<&[u8]> {
    match value {
        Value::String(s) => Some(s.as_bytes()),
        Value::Binary(b) => Some(b.as_slice()),
        _ => None,
    }
}
