//! Delivery key derivation.
//!
//! Every record is written under `{tag}.{seconds}.{sequence}`, where the
//! sequence counts records already written in the same flush call. Keys are
//! therefore unique within one flush but repeat across flushes that carry
//! the same tag and second, unless [`KeyScheme::FlushId`] is selected.

use uuid::Uuid;

use crate::config::KeyScheme;

/// Key builder for one flush call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryKeys {
    flush_id: Option<Uuid>,
}

impl DeliveryKeys {
    /// Start keying a new flush call.
    pub fn for_flush(scheme: KeyScheme) -> Self {
        let flush_id = match scheme {
            KeyScheme::PerFlush => None,
            KeyScheme::FlushId => Some(Uuid::now_v7()),
        };
        Self { flush_id }
    }

    /// Identifier mixed into every key of this flush, if any.
    pub const fn flush_id(&self) -> Option<Uuid> {
        self.flush_id
    }

    /// Key for the record at `sequence` within this flush.
    pub fn key(&self, tag: &str, seconds: u64, sequence: u64) -> String {
        match self.flush_id {
            Some(id) => format!("{tag}.{seconds}.{id}.{sequence}"),
            None => format!("{tag}.{seconds}.{sequence}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn per_flush_key_shape() {
        let keys = DeliveryKeys::for_flush(KeyScheme::PerFlush);
        assert_eq!(keys.key("app.log", 1000, 0), "app.log.1000.0");
        assert_eq!(keys.flush_id(), None);
    }

    #[test]
    fn sequence_disambiguates_same_second() {
        let keys = DeliveryKeys::for_flush(KeyScheme::PerFlush);
        let generated: HashSet<String> = (0..100).map(|seq| keys.key("tag", 42, seq)).collect();
        assert_eq!(generated.len(), 100);
    }

    #[test]
    fn flush_id_keys_differ_across_flushes() {
        let first = DeliveryKeys::for_flush(KeyScheme::FlushId);
        let second = DeliveryKeys::for_flush(KeyScheme::FlushId);
        assert_ne!(first.key("tag", 42, 0), second.key("tag", 42, 0));
        assert!(first.key("tag", 42, 0).starts_with("tag.42."));
        assert!(first.key("tag", 42, 0).ends_with(".0"));
    }
}
