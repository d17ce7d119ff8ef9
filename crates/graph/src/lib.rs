//! The compiled dataflow graph and its synchronous execution engine.
//!
//! A [`SensorGraph`] owns an arena of [`GraphNode`]s in topological order,
//! the [`SensorLog`](sensorgraph_log::SensorLog) those nodes read and write,
//! the streamer declarations, and the device configuration map. It is
//! populated once by the compiler and then only read.
//!
//! Execution is single-threaded and cooperative:
//! [`process_input`](SensorGraph::process_input) pushes one reading and runs
//! the whole propagation pass to completion before returning. Node evaluation
//! order is fixed by the topological sort, which makes simulation traces
//! reproducible. There is no internal locking; a graph is owned by a single
//! logical thread at a time.

mod engine;
mod graph;
mod node;
mod rpc;
mod streamer;

pub use graph::SensorGraph;
pub use node::{Combiner, CompareOp, GraphNode, InputTrigger, NodeFunc, NodeInput};
pub use rpc::{NullRpcExecutor, RpcError, RpcExecutor};
pub use streamer::DataStreamer;
