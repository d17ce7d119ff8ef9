//! Walker cursors over pending readings.

use sensorgraph_types::{DataStream, DataStreamSelector};
use std::collections::BTreeMap;

/// Handle to a walker cursor owned by the [`SensorLog`](crate::SensorLog).
///
/// Walkers live in an arena inside the log and are addressed by index; the
/// graph is built once and never mutated afterwards, so handles stay valid
/// for the life of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WalkerId(pub(crate) usize);

/// Internal cursor state: how far into each matched stream this walker has
/// consumed, as absolute push indices.
#[derive(Debug, Clone)]
pub(crate) struct WalkerState {
    pub(crate) selector: DataStreamSelector,
    /// Consumed-through absolute index per stream. Streams matched by the
    /// selector but absent here (they appeared after the walker was created)
    /// default to 0, i.e. fully visible.
    pub(crate) offsets: BTreeMap<DataStream, u64>,
}

impl WalkerState {
    pub(crate) fn new(selector: DataStreamSelector) -> Self {
        Self {
            selector,
            offsets: BTreeMap::new(),
        }
    }

    pub(crate) fn offset(&self, stream: &DataStream) -> u64 {
        self.offsets.get(stream).copied().unwrap_or(0)
    }
}
