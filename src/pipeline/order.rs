//! Topological ordering of a dependency graph.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::graph::Graph;
use crate::pipeline::id::NodeId;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Linearizes a [`Graph`] so every node comes after the nodes it reads from.
pub struct TopologicalOrderer;

impl TopologicalOrderer {
    /// Order the graph using Kahn's algorithm.
    ///
    /// Among the nodes whose inputs are all placed, the one inserted into the
    /// graph first is taken next. A graph whose insertion order is already
    /// valid therefore comes back unchanged, and the same graph always yields
    /// the same order. Inputs that are not keys of the graph are external
    /// sources and impose no constraint.
    ///
    /// # Errors
    /// [`PipelineError::CycleDetected`] with the nodes that could not be
    /// placed.
    pub fn order(graph: &Graph) -> PipelineResult<Vec<NodeId>> {
        let n = graph.len();
        let ids: Vec<NodeId> = graph.ids().collect();

        // Adjacency over insertion positions
        let mut dependents = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];

        for (pos, (_, entry)) in graph.iter().enumerate() {
            for input in &entry.inputs {
                if let Some(from) = graph.position(*input) {
                    dependents[from].push(pos);
                    in_degree[pos] += 1;
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
            .filter(|&pos| in_degree[pos] == 0)
            .map(Reverse)
            .collect();
        let mut result = Vec::with_capacity(n);

        while let Some(Reverse(pos)) = ready.pop() {
            result.push(ids[pos]);

            for &dependent in &dependents[pos] {
                in_degree[dependent] -= 1;
                if in_degree[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        if result.len() != n {
            let nodes: Vec<NodeId> = (0..n)
                .filter(|&pos| in_degree[pos] > 0)
                .map(|pos| ids[pos])
                .collect();
            tracing::warn!("Cycle detected while ordering pipeline: {:?}", nodes);
            return Err(PipelineError::CycleDetected { nodes });
        }

        tracing::debug!("Ordered {} pipeline nodes", result.len());
        Ok(result)
    }
}
