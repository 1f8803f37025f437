//! Asynchronous label propagation

use itertools::Itertools;

use crate::cluster::{renumber, CommunityDetector};
use crate::config::ClusterConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;

pub struct LabelPropagation;

impl CommunityDetector for LabelPropagation {
    fn assign(&self, graph: &Graph, config: &ClusterConfig) -> EngineResult<Vec<usize>> {
        propagate(graph, config.label_propagation_max_iter)
    }
}

/// Label a node would adopt given its neighbors' current labels.
///
/// The current label wins when it is among the most frequent; otherwise the
/// lowest of the most frequent labels is taken. Without neighbors the node
/// keeps its label.
fn preferred_label(graph: &Graph, labels: &[usize], node: usize) -> usize {
    let counts = graph
        .successors(node)
        .filter(|&(neighbor, _)| neighbor != node)
        .map(|(neighbor, _)| labels[neighbor])
        .counts();

    let Some(&top) = counts.values().max() else {
        return labels[node];
    };
    if counts.get(&labels[node]) == Some(&top) {
        return labels[node];
    }

    counts
        .into_iter()
        .filter(|&(_, count)| count == top)
        .map(|(label, _)| label)
        .min()
        .unwrap_or(labels[node])
}

/// Run sweeps in node order until no label changes.
///
/// `graph` is expected to be the undirected view. Low labels spread first,
/// so a single bridge between two dense groups is enough for one label to
/// take over both.
pub fn propagate(graph: &Graph, max_iter: usize) -> EngineResult<Vec<usize>> {
    let mut labels: Vec<usize> = (0..graph.node_count()).collect();

    for sweep in 1..=max_iter {
        let mut changed = 0usize;
        for node in 0..graph.node_count() {
            let label = preferred_label(graph, &labels, node);
            if label != labels[node] {
                labels[node] = label;
                changed += 1;
            }
        }

        log::debug!("Label propagation sweep {}: {} changes", sweep, changed);
        if changed == 0 {
            return Ok(renumber(&labels));
        }
    }

    Err(EngineError::Convergence {
        algorithm: "Label Propagation",
        iterations: max_iter,
    })
}
