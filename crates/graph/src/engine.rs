//! The synchronous propagation engine.
//!
//! One call to [`SensorGraph::process_input`] runs a complete propagation
//! pass: the reading is pushed, every subscribed node is checked in
//! topological order, and outputs of fired nodes re-enter the same pass
//! until no more nodes fire. The graph is acyclic, so the pass always
//! terminates.

use crate::graph::SensorGraph;
use crate::node::{Combiner, GraphNode, InputTrigger, NodeFunc, NodeInput};
use crate::rpc::{decode_response, RpcExecutor};
use sensorgraph_log::SensorLog;
use sensorgraph_types::{DataStream, Reading};
use std::collections::VecDeque;
use tracing::{trace, warn};

impl SensorGraph {
    /// Push one input reading and propagate it through the graph.
    ///
    /// The reading is restamped onto `stream` and every node output produced
    /// during the pass carries the input reading's timestamp. RPC failures
    /// inside a node are caught and downgraded to a zero output, so one
    /// failing node cannot corrupt sibling evaluation.
    pub fn process_input(
        &mut self,
        stream: DataStream,
        reading: Reading,
        rpc: &mut dyn RpcExecutor,
    ) {
        let mut input = reading;
        input.stream = stream;
        let now = input.timestamp;

        self.log.push(input);

        let mut work = VecDeque::from([stream]);
        while let Some(updated) = work.pop_front() {
            let Some(subscribers) = self.subscriptions.get(&updated).cloned() else {
                continue;
            };
            for idx in subscribers {
                let node = &self.nodes[idx];
                if !node_triggered(node, &self.log) {
                    continue;
                }
                let value = evaluate(node, &mut self.log, rpc);
                consume(node, &mut self.log);
                let output = node.output;
                trace!(node = idx, stream = %output, value, tick = now, "node fired");
                self.log.push(Reading::new(output, now, value));
                work.push_back(output);
            }
        }
    }
}

/// Evaluate one input's trigger. `None` means the input is a pure data
/// operand and takes no part in gating.
fn input_triggered(input: &NodeInput, log: &SensorLog) -> Option<bool> {
    let trigger = input.trigger?;
    Some(match trigger {
        InputTrigger::Always => log.count(input.walker) > 0,
        InputTrigger::Count(op, threshold) => op.evaluate(log.count(input.walker), threshold),
        InputTrigger::Value(op, threshold) => log
            .latest_value(input.stream)
            .is_some_and(|value| op.evaluate(value, threshold)),
    })
}

fn node_triggered(node: &GraphNode, log: &SensorLog) -> bool {
    let a = input_triggered(&node.a, log);
    let b = node.b.as_ref().and_then(|b| input_triggered(b, log));
    match (a, b) {
        (Some(a), Some(b)) => match node.combiner {
            Combiner::And => a && b,
            Combiner::Or => a || b,
        },
        (Some(a), None) => a,
        (None, Some(b)) => b,
        (None, None) => false,
    }
}

/// Run the node's function. Only `AverageA` consumes readings here; the
/// trigger inputs are consumed separately after evaluation.
fn evaluate(node: &GraphNode, log: &mut SensorLog, rpc: &mut dyn RpcExecutor) -> u32 {
    match node.func {
        NodeFunc::CopyLatestA => log.latest_value(node.a.stream).unwrap_or(0),
        NodeFunc::CopyLatestB => node
            .b
            .as_ref()
            .and_then(|b| log.latest_value(b.stream))
            .unwrap_or(0),
        NodeFunc::CountA => log.count(node.a.walker),
        NodeFunc::AverageA => {
            let mut sum: u64 = 0;
            let mut popped: u64 = 0;
            while let Ok(reading) = log.pop(node.a.walker) {
                sum += u64::from(reading.value);
                popped += 1;
            }
            if popped == 0 {
                0
            } else {
                (sum / popped) as u32
            }
        }
        NodeFunc::Constant(value) => value,
        NodeFunc::CallRpc { slot, rpc_id } => match rpc.call(slot, rpc_id, &[]) {
            Ok(payload) => decode_response(&payload),
            Err(err) => {
                warn!(%err, node = %node, "rpc failed, substituting zero output");
                0
            }
        },
    }
}

/// Consume the readings that satisfied the trigger. Count and always
/// triggers reset their pending count; value triggers and data operands are
/// level conditions and stay untouched.
fn consume(node: &GraphNode, log: &mut SensorLog) {
    for input in [Some(&node.a), node.b.as_ref()].into_iter().flatten() {
        match input.trigger {
            Some(InputTrigger::Always | InputTrigger::Count(..)) => log.skip_all(input.walker),
            Some(InputTrigger::Value(..)) | None => {}
        }
    }
}
