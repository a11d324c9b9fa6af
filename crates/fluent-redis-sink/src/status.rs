//! Host-visible flush outcomes.

use std::fmt;

/// The outcome of one flush call, as reported to Fluent Bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushStatus {
    /// Every decodable record was written.
    Ok,
    /// Transient failure; the host should resubmit the same chunk later.
    Retry,
    /// Permanent failure for this chunk; the host must not resubmit it.
    Error,
}

impl fmt::Display for FlushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "OK",
            Self::Retry => "RETRY",
            Self::Error => "ERROR",
        })
    }
}

/// Summary of one flush call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    /// What the host is told.
    pub status: FlushStatus,
    /// Records acknowledged by the store during this call.
    pub written: u64,
}

impl FlushReport {
    pub(crate) const fn new(status: FlushStatus, written: u64) -> Self {
        Self { status, written }
    }
}
