//! Stream identity: kind tag plus numeric id.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The class of a data stream.
///
/// The kind determines how the stream log retains readings and which ids a
/// device model allows. Ordering is derived so streams can key ordered maps
/// deterministically.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum StreamKind {
    /// External inputs pushed into the graph.
    Input,
    /// Graph outputs destined for export.
    Output,
    /// Running counters (latest value retained, count accumulates).
    Counter,
    /// Buffered data with full history until consumed.
    Buffered,
    /// Unbuffered data where only the latest reading matters.
    Unbuffered,
    /// Constant streams seeded once by `load_constants`.
    Constant,
    /// System-generated streams (ticks, connection events, battery).
    System,
}

impl StreamKind {
    /// The textual name used by the source language.
    pub fn name(&self) -> &'static str {
        match self {
            StreamKind::Input => "input",
            StreamKind::Output => "output",
            StreamKind::Counter => "counter",
            StreamKind::Buffered => "buffered",
            StreamKind::Unbuffered => "unbuffered",
            StreamKind::Constant => "constant",
            StreamKind::System => "system input",
        }
    }
}

/// Identifies a single named data channel.
///
/// Two streams are equal iff their kind and id match. Streams are immutable
/// value types, never mutated after creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DataStream {
    /// The kind tag.
    pub kind: StreamKind,
    /// The numeric id (0-65535).
    pub id: u16,
}

impl DataStream {
    /// Create a stream from a kind and id.
    pub const fn new(kind: StreamKind, id: u16) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for DataStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.name(), self.id)
    }
}

impl FromStr for DataStream {
    type Err = ParseError;

    /// Parse the textual form used by the source language, e.g. `counter 15`
    /// or `system input 1025`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let (kind, rest) = match words.as_slice() {
            ["system", "input", rest @ ..] => (StreamKind::System, rest),
            [kind_word, rest @ ..] => {
                let kind = kind_from_word(kind_word).ok_or_else(|| ParseError::UnknownKind {
                    kind: (*kind_word).to_string(),
                })?;
                (kind, rest)
            }
            [] => {
                return Err(ParseError::Unrecognized {
                    text: s.to_string(),
                })
            }
        };

        match rest {
            [id_word] => {
                let id = parse_stream_id(id_word).ok_or_else(|| ParseError::InvalidId {
                    text: s.to_string(),
                })?;
                Ok(DataStream::new(kind, id))
            }
            _ => Err(ParseError::InvalidId {
                text: s.to_string(),
            }),
        }
    }
}

/// Map a single kind word to a stream kind. `system` is handled separately
/// because its textual form is the two words `system input`.
pub(crate) fn kind_from_word(word: &str) -> Option<StreamKind> {
    match word {
        "input" => Some(StreamKind::Input),
        "output" => Some(StreamKind::Output),
        "counter" => Some(StreamKind::Counter),
        "buffered" => Some(StreamKind::Buffered),
        "unbuffered" => Some(StreamKind::Unbuffered),
        "constant" => Some(StreamKind::Constant),
        _ => None,
    }
}

/// Parse a stream id, accepting decimal or `0x` hex.
pub(crate) fn parse_stream_id(word: &str) -> Option<u16> {
    if let Some(hex) = word.strip_prefix("0x") {
        u16::from_str_radix(hex, 16).ok()
    } else {
        word.parse().ok()
    }
}
