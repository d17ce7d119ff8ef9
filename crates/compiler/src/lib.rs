//! The SensorGraph compiler.
//!
//! [`compile`] lowers parsed statements into a [`SensorGraph`]: each
//! statement becomes zero or more binary nodes, `config` statements populate
//! the configuration map, `streamer` statements populate the streamer list,
//! and literal operands are resolved through compiler-allocated constant
//! streams seeded later by
//! [`load_constants`](sensorgraph_graph::SensorGraph::load_constants).
//!
//! Everything is validated against the supplied
//! [`DeviceModel`](sensorgraph_types::DeviceModel): stream id ranges, slot
//! numbers, config type tags, and node/streamer limits. The final node order
//! is a deterministic topological sort, which is what makes simulation
//! traces reproducible run over run.

mod error;
mod lower;
mod topo;

pub use error::CompileError;

use lower::Lowerer;
use sensorgraph_graph::SensorGraph;
use sensorgraph_lang::Statement;
use sensorgraph_types::DeviceModel;
use tracing::debug;

/// Compile parsed statements into an executable graph.
pub fn compile(statements: &[Statement], model: &DeviceModel) -> Result<SensorGraph, CompileError> {
    let mut lowerer = Lowerer::new(model);
    for statement in statements {
        lowerer.lower_top(statement)?;
    }

    let nodes = topo::topo_sort(lowerer.nodes)?;
    debug!(
        nodes = nodes.len(),
        streamers = lowerer.streamers.len(),
        constants = lowerer.constants.len(),
        "compiled graph"
    );

    Ok(SensorGraph::new(
        nodes,
        lowerer.log,
        lowerer.streamers,
        lowerer.config,
        lowerer.constants,
    ))
}
