use sensorgraph_types::{ConfigType, DataStream, SlotIdentifier};
use thiserror::Error;

/// A statement could not be lowered into the graph.
///
/// Compile errors are fatal to the compilation attempt and surfaced to the
/// caller; they are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A referenced stream id is outside the device's user range.
    #[error("stream '{stream}' is outside the device's user id range")]
    InvalidStream { stream: DataStream },

    /// The destination stream's kind cannot be written by a node.
    #[error("'{stream}' is not a writable node destination")]
    InvalidDestination { stream: DataStream },

    /// The addressed slot does not exist on the device.
    #[error("unknown slot '{slot}'")]
    UnknownSlot { slot: SlotIdentifier },

    /// A config statement's type tag disagrees with the device model.
    #[error("config key 0x{key:04x} on {slot} requires {expected}, got {found}")]
    ConfigTypeMismatch {
        slot: SlotIdentifier,
        key: u16,
        expected: ConfigType,
        found: ConfigType,
    },

    /// The derived graph contains a producer/consumer cycle.
    #[error("the compiled graph contains a cycle")]
    CyclicGraph,

    /// More nodes than the device supports.
    #[error("graph needs more than the device's limit of {limit} nodes")]
    TooManyNodes { limit: usize },

    /// More streamers than the device supports.
    #[error("more than the device's limit of {limit} streamers")]
    TooManyStreamers { limit: usize },

    /// A block statement appeared where the graph cannot express it, for
    /// example `every` nested inside `on`, or `on connect` outside a `when`
    /// block.
    #[error("'{statement}' is not allowed in this context")]
    InvalidContext { statement: &'static str },

    /// A statement that needs a triggering input appeared at top level.
    #[error("'{statement}' requires an enclosing trigger block")]
    NoTriggerContext { statement: &'static str },

    /// The compiler ran out of internal stream ids for latches, constants,
    /// and chain intermediates.
    #[error("internal stream ids exhausted")]
    InternalStreamExhausted,
}
