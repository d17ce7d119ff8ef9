//! Physical destination slots.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names a physical destination: the controller or a numbered peripheral slot.
///
/// Used as a streamer destination and an RPC address. Opaque to the execution
/// engine itself.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SlotIdentifier {
    /// The device controller.
    Controller,
    /// A numbered peripheral slot.
    Slot(u8),
}

impl fmt::Display for SlotIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotIdentifier::Controller => write!(f, "controller"),
            SlotIdentifier::Slot(n) => write!(f, "slot {n}"),
        }
    }
}

impl FromStr for SlotIdentifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            ["controller"] => Ok(SlotIdentifier::Controller),
            ["slot", n] => n
                .parse::<u8>()
                .map(SlotIdentifier::Slot)
                .map_err(|_| ParseError::InvalidId {
                    text: s.to_string(),
                }),
            _ => Err(ParseError::Unrecognized {
                text: s.to_string(),
            }),
        }
    }
}
