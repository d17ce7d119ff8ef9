//! The compiled graph container.

use crate::node::GraphNode;
use crate::streamer::DataStreamer;
use sensorgraph_log::SensorLog;
use sensorgraph_types::{known, ConfigType, DataStream, Reading, SlotIdentifier};
use std::collections::BTreeMap;
use tracing::debug;

/// A fully compiled sensor graph.
///
/// Owns the node arena (in topological order, stable across runs), the
/// stream log, the streamer declarations, the `(slot, key)` configuration
/// map, and the constant-stream seeds resolved at compile time. Created
/// empty, populated once by the compiler, then read repeatedly by the
/// execution engine and simulator.
pub struct SensorGraph {
    pub(crate) nodes: Vec<GraphNode>,
    pub(crate) log: SensorLog,
    streamers: Vec<DataStreamer>,
    config: BTreeMap<(SlotIdentifier, u16), (ConfigType, u32)>,
    constants: Vec<(DataStream, u32)>,
    /// Stream -> indices of nodes with a triggered input on that stream.
    /// Built in node order, so each list is already in evaluation order.
    pub(crate) subscriptions: BTreeMap<DataStream, Vec<usize>>,
    constants_loaded: bool,
}

impl std::fmt::Debug for SensorGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SensorGraph")
            .field("nodes", &self.nodes.len())
            .field("streamers", &self.streamers.len())
            .field("constants", &self.constants.len())
            .finish_non_exhaustive()
    }
}

impl SensorGraph {
    /// Assemble a graph from compiler output. `nodes` must already be in
    /// topological order; walkers referenced by the nodes must belong to
    /// `log`.
    pub fn new(
        nodes: Vec<GraphNode>,
        log: SensorLog,
        streamers: Vec<DataStreamer>,
        config: BTreeMap<(SlotIdentifier, u16), (ConfigType, u32)>,
        constants: Vec<(DataStream, u32)>,
    ) -> Self {
        let mut subscriptions: BTreeMap<DataStream, Vec<usize>> = BTreeMap::new();
        for (idx, node) in nodes.iter().enumerate() {
            for input in [Some(&node.a), node.b.as_ref()].into_iter().flatten() {
                if input.trigger.is_some() {
                    let subscribers = subscriptions.entry(input.stream).or_default();
                    // Both inputs may watch the same stream (a range check);
                    // one evaluation per update is enough.
                    if subscribers.last() != Some(&idx) {
                        subscribers.push(idx);
                    }
                }
            }
        }
        Self {
            nodes,
            log,
            streamers,
            config,
            constants,
            subscriptions,
            constants_loaded: false,
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn log(&self) -> &SensorLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut SensorLog {
        &mut self.log
    }

    pub fn streamers(&self) -> &[DataStreamer] {
        &self.streamers
    }

    /// Look up a device configuration entry.
    pub fn get_config(&self, slot: SlotIdentifier, key: u16) -> Option<(ConfigType, u32)> {
        self.config.get(&(slot, key)).copied()
    }

    /// The configured user-tick interval in seconds; 0 disables user ticks.
    pub fn user_tick(&self) -> u32 {
        self.get_config(SlotIdentifier::Controller, known::CONFIG_USER_TICK)
            .map(|(_, value)| value)
            .unwrap_or(0)
    }

    /// Seed every constant stream with its literal value, exactly once,
    /// ahead of tick 0. Constants are pushed directly to the log without a
    /// propagation pass; nodes only observe them through value triggers and
    /// data operands.
    pub fn load_constants(&mut self) {
        if self.constants_loaded {
            return;
        }
        for (stream, value) in &self.constants {
            debug!(stream = %stream, value, "seeding constant");
            self.log.push(Reading::new(*stream, 0, *value));
        }
        self.constants_loaded = true;
    }

    /// Human-readable listing of the compiled nodes, one per line, in
    /// evaluation order.
    pub fn dump_nodes(&self) -> String {
        self.nodes
            .iter()
            .map(|node| node.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
