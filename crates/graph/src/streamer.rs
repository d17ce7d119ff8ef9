//! Streamer declarations: bulk-export metadata.

use sensorgraph_types::{DataStreamSelector, SlotIdentifier};
use std::fmt;

/// Declares that readings matching `selector` should be exported in bulk to
/// `dest`.
///
/// Streamers do not move data themselves; they are metadata consumed by an
/// external exporter. `with_other` names another streamer whose transmission
/// window this one piggybacks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataStreamer {
    pub selector: DataStreamSelector,
    pub dest: SlotIdentifier,
    pub with_other: Option<u8>,
}

impl fmt::Display for DataStreamer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.selector, self.dest)?;
        if let Some(other) = self.with_other {
            write!(f, " with_other {other}")?;
        }
        Ok(())
    }
}
