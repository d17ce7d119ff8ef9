//! Timestamped readings.

use crate::DataStream;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable data point produced on a stream.
///
/// The value is a raw 32-bit quantity; signedness is a property of the
/// stream's semantics, not of the reading. `reading_id` is assigned by the
/// stream log only for streams whose readings must be individually
/// addressable later (buffered and output streams destined for signed
/// export); for everything else it is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reading {
    /// The stream this reading was produced on.
    pub stream: DataStream,
    /// The tick at which it was produced.
    pub timestamp: u32,
    /// The raw 32-bit value.
    pub value: u32,
    /// Monotonically increasing id, when the stream requires one.
    pub reading_id: Option<u32>,
}

impl Reading {
    /// Create a reading without a reading id.
    pub const fn new(stream: DataStream, timestamp: u32, value: u32) -> Self {
        Self {
            stream,
            timestamp,
            value,
            reading_id: None,
        }
    }

    /// The value reinterpreted as signed.
    pub const fn signed_value(&self) -> i32 {
        self.value as i32
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}: {} @ tick {})", self.stream, self.value, self.timestamp)
    }
}
