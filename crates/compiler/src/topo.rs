//! Deterministic topological ordering of lowered nodes.

use crate::CompileError;
use sensorgraph_graph::GraphNode;
use sensorgraph_types::DataStream;
use std::collections::{BTreeMap, BTreeSet};

/// Sort nodes into a topological order over stream producer→consumer edges.
///
/// Kahn's algorithm with a lowest-lowering-index-first ready set, so the
/// resulting order is a deterministic function of the source program. A
/// cycle, including a node feeding its own input, is a fatal compile error.
pub(crate) fn topo_sort(nodes: Vec<GraphNode>) -> Result<Vec<GraphNode>, CompileError> {
    let count = nodes.len();

    let mut producers: BTreeMap<DataStream, Vec<usize>> = BTreeMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        producers.entry(node.output).or_default().push(idx);
    }

    let mut edges: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut indegree = vec![0usize; count];
    for (consumer, node) in nodes.iter().enumerate() {
        for input in [Some(&node.a), node.b.as_ref()].into_iter().flatten() {
            let Some(upstream) = producers.get(&input.stream) else {
                continue;
            };
            for &producer in upstream {
                if producer == consumer {
                    return Err(CompileError::CyclicGraph);
                }
                edges[producer].push(consumer);
                indegree[consumer] += 1;
            }
        }
    }

    let mut ready: BTreeSet<usize> = indegree
        .iter()
        .enumerate()
        .filter(|(_, deg)| **deg == 0)
        .map(|(idx, _)| idx)
        .collect();

    let mut order = Vec::with_capacity(count);
    while let Some(&next) = ready.iter().next() {
        ready.remove(&next);
        order.push(next);
        for &consumer in &edges[next] {
            indegree[consumer] -= 1;
            if indegree[consumer] == 0 {
                ready.insert(consumer);
            }
        }
    }

    if order.len() != count {
        return Err(CompileError::CyclicGraph);
    }

    // `order` is a permutation; reorder by each node's rank within it.
    let mut rank = vec![0usize; count];
    for (position, &idx) in order.iter().enumerate() {
        rank[idx] = position;
    }
    let mut ranked: Vec<(usize, GraphNode)> = nodes
        .into_iter()
        .enumerate()
        .map(|(idx, node)| (rank[idx], node))
        .collect();
    ranked.sort_by_key(|(position, _)| *position);
    Ok(ranked.into_iter().map(|(_, node)| node).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorgraph_graph::{Combiner, InputTrigger, NodeFunc, NodeInput};
    use sensorgraph_log::SensorLog;
    use sensorgraph_types::DataStreamSelector;

    fn node(log: &mut SensorLog, input: &str, output: &str) -> GraphNode {
        let stream: DataStream = input.parse().unwrap();
        GraphNode {
            a: NodeInput {
                stream,
                trigger: Some(InputTrigger::Always),
                walker: log.create_walker(DataStreamSelector::exact(stream)),
            },
            b: None,
            combiner: Combiner::And,
            func: NodeFunc::CopyLatestA,
            output: output.parse().unwrap(),
        }
    }

    #[test]
    fn orders_producers_before_consumers() {
        let mut log = SensorLog::new();
        // Listed consumer-first on purpose.
        let nodes = vec![
            node(&mut log, "unbuffered 1", "output 1"),
            node(&mut log, "input 1", "unbuffered 1"),
        ];
        let sorted = topo_sort(nodes).unwrap();
        assert_eq!(sorted[0].output, "unbuffered 1".parse().unwrap());
        assert_eq!(sorted[1].output, "output 1".parse().unwrap());
    }

    #[test]
    fn ties_break_by_lowering_index() {
        let mut log = SensorLog::new();
        let nodes = vec![
            node(&mut log, "input 3", "output 3"),
            node(&mut log, "input 1", "output 1"),
            node(&mut log, "input 2", "output 2"),
        ];
        let sorted = topo_sort(nodes).unwrap();
        let outputs: Vec<String> = sorted.iter().map(|n| n.output.to_string()).collect();
        assert_eq!(outputs, vec!["output 3", "output 1", "output 2"]);
    }

    #[test]
    fn rejects_cycles() {
        let mut log = SensorLog::new();
        let nodes = vec![
            node(&mut log, "unbuffered 1", "unbuffered 2"),
            node(&mut log, "unbuffered 2", "unbuffered 1"),
        ];
        assert_eq!(topo_sort(nodes).unwrap_err(), CompileError::CyclicGraph);
    }

    #[test]
    fn rejects_self_loops() {
        let mut log = SensorLog::new();
        let nodes = vec![node(&mut log, "unbuffered 1", "unbuffered 1")];
        assert_eq!(topo_sort(nodes).unwrap_err(), CompileError::CyclicGraph);
    }
}
