//! Recorded simulation output.

use sensorgraph_types::{DataStreamSelector, Reading};
use serde::{Deserialize, Serialize};

/// An ordered record of the readings produced on the traced selectors.
///
/// Readings appear in push order, which is deterministic for a given source
/// program and input sequence, so two traces of identical runs compare (and
/// serialize) byte-identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationTrace {
    /// The selectors being traced.
    pub selectors: Vec<DataStreamSelector>,
    /// Every matching reading, in the order it was pushed.
    pub readings: Vec<Reading>,
}

impl SimulationTrace {
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Values of the recorded readings, in push order.
    pub fn values(&self) -> Vec<u32> {
        self.readings.iter().map(|r| r.value).collect()
    }
}
