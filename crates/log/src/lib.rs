//! Append-only stream storage for SensorGraph.
//!
//! The [`SensorLog`] is the single store that graph nodes read and write.
//! It provides:
//!
//! - `push`: append a reading and synchronously notify matching watchers
//! - walkers: cursor-based readers over the pending readings of a selector,
//!   addressed by [`WalkerId`] (the graph is built once, so cursors live in
//!   an index-addressed arena rather than behind pointers)
//! - `inspect_last`: non-consuming peek at a stream's most recent reading
//! - watchers: scoped, synchronous change notification
//!
//! # Retention
//!
//! Retention mirrors the firmware's memory model and is decided by stream
//! kind:
//!
//! - **History** (`output`, `buffered`): full history until consumed; these
//!   pushes receive monotonically increasing reading ids so they can be
//!   individually addressed by a later signed export.
//! - **Latest-with-count** (`counter`, `input`, `system`): only the latest
//!   reading is retained, but the pending count keeps accumulating. Popping
//!   returns a copy of the latest reading.
//! - **Latest-only** (`unbuffered`, `constant`): only the latest reading is
//!   retained and at most one pending reading is ever reported.

mod log;
mod walker;

pub use log::{SensorLog, WatchToken};
pub use walker::WalkerId;

use sensorgraph_types::DataStreamSelector;
use thiserror::Error;

/// Consuming or inspecting a stream with no pending data.
///
/// This is a recoverable, expected condition that callers must handle; it is
/// deliberately distinguishable from a pending count of zero so callers can
/// branch on a checked result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no available readings for {selector}")]
pub struct StreamEmptyError {
    /// What was being read when the log came up empty.
    pub selector: DataStreamSelector,
}
