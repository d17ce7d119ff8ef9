//! Patterns matching one stream or a class of streams.

use crate::stream::kind_from_word;
use crate::{DataStream, ParseError, StreamKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A pattern matching one or more [`DataStream`]s.
///
/// Selectors are used both to address a single stream and to subscribe to a
/// whole class of streams (for watchers, walkers, and streamers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataStreamSelector {
    /// Matches exactly one stream.
    Exact(DataStream),
    /// Matches every stream of a kind.
    Class {
        /// The kind to match.
        kind: StreamKind,
    },
}

impl DataStreamSelector {
    /// Selector matching exactly `stream`.
    pub const fn exact(stream: DataStream) -> Self {
        Self::Exact(stream)
    }

    /// Selector matching every stream of `kind`.
    pub const fn all(kind: StreamKind) -> Self {
        Self::Class { kind }
    }

    /// Whether `stream` is matched by this selector.
    pub fn matches(&self, stream: &DataStream) -> bool {
        match self {
            DataStreamSelector::Exact(s) => s == stream,
            DataStreamSelector::Class { kind } => stream.kind == *kind,
        }
    }
}

impl fmt::Display for DataStreamSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataStreamSelector::Exact(stream) => write!(f, "{stream}"),
            DataStreamSelector::Class { kind } => match kind {
                StreamKind::System => write!(f, "all system inputs"),
                other => write!(f, "all {}s", other.name()),
            },
        }
    }
}

impl FromStr for DataStreamSelector {
    type Err = ParseError;

    /// Parse `counter 15`, `all counters`, or `all system inputs`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            ["all", "system", "inputs"] => Ok(Self::all(StreamKind::System)),
            ["all", plural] => {
                let singular = plural.strip_suffix('s').ok_or_else(|| ParseError::Unrecognized {
                    text: s.to_string(),
                })?;
                let kind = kind_from_word(singular).ok_or_else(|| ParseError::UnknownKind {
                    kind: singular.to_string(),
                })?;
                Ok(Self::all(kind))
            }
            _ => s.parse::<DataStream>().map(Self::Exact),
        }
    }
}
