//! Compiled graph nodes.
//!
//! Every node has at most two inputs; the compiler chains wider triggers
//! through synthetic intermediate streams so the engine only ever evaluates a
//! fixed-arity binary form. Nodes live in an index-addressed arena inside
//! [`SensorGraph`](crate::SensorGraph) since the graph is built once and
//! never mutated after compilation.

use sensorgraph_log::WalkerId;
use sensorgraph_types::{DataStream, SlotIdentifier};
use std::fmt;

pub use sensorgraph_types::{Combiner, CompareOp};

/// The firing condition attached to one node input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputTrigger {
    /// Fires whenever the input has any pending reading.
    Always,
    /// Compares the input's pending count against a constant.
    Count(CompareOp, u32),
    /// Compares the input's latest value against a constant. False if the
    /// stream has never been written.
    Value(CompareOp, u32),
}

impl fmt::Display for InputTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputTrigger::Always => write!(f, "always"),
            InputTrigger::Count(op, n) => write!(f, "when count {op} {n}"),
            InputTrigger::Value(op, n) => write!(f, "when value {op} {n}"),
        }
    }
}

/// One input operand of a node: the stream it reads and the walker that
/// tracks what it has consumed.
///
/// An input with no trigger is a pure data operand: it never wakes the node
/// and takes no part in gating, it is only read by the node's function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeInput {
    pub stream: DataStream,
    pub trigger: Option<InputTrigger>,
    pub walker: WalkerId,
}

impl fmt::Display for NodeInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.trigger {
            Some(trigger) => write!(f, "{} {}", self.stream, trigger),
            None => write!(f, "{}", self.stream),
        }
    }
}

/// The processing function a node runs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFunc {
    /// Copy the latest value of input A (0 if never written).
    CopyLatestA,
    /// Copy the latest value of input B (0 if never written).
    CopyLatestB,
    /// Output input A's pending count at fire time.
    CountA,
    /// Consume and average input A's pending readings.
    AverageA,
    /// Output a fixed value.
    Constant(u32),
    /// Invoke an RPC and output its decoded response.
    CallRpc { slot: SlotIdentifier, rpc_id: u16 },
}

impl fmt::Display for NodeFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeFunc::CopyLatestA => write!(f, "copy_latest_a"),
            NodeFunc::CopyLatestB => write!(f, "copy_latest_b"),
            NodeFunc::CountA => write!(f, "count_a"),
            NodeFunc::AverageA => write!(f, "average_a"),
            NodeFunc::Constant(value) => write!(f, "constant({value})"),
            NodeFunc::CallRpc { slot, rpc_id } => write!(f, "call_rpc(0x{rpc_id:04x} on {slot})"),
        }
    }
}

/// One compiled node: up to two trigger inputs, a combiner, a function, and
/// exactly one output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub a: NodeInput,
    pub b: Option<NodeInput>,
    pub combiner: Combiner,
    pub func: NodeFunc,
    pub output: DataStream,
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.b {
            Some(b) => write!(
                f,
                "({} {} {}) => {} using {}",
                self.a, self.combiner, b, self.output, self.func
            ),
            None => write!(f, "({}) => {} using {}", self.a, self.output, self.func),
        }
    }
}
