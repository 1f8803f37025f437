//! Betweenness centrality via Brandes' algorithm.
//!
//! For each source node a shortest-path DAG is built (BFS, or Dijkstra when
//! weighted distances are requested) and dependencies are accumulated in
//! reverse distance order. Every tied shortest path counts. Raw sums over
//! ordered pairs are divided by `(n-1)(n-2)`; for `n <= 2` no pair has an
//! intermediate node and the raw value (0) is returned.

use crate::centrality::CentralityAlgorithm;
use crate::config::CentralityConfig;
use crate::error::EngineResult;
use crate::graph::algorithms::shortest_path_dag;
use crate::graph::Graph;

pub struct Betweenness;

impl CentralityAlgorithm for Betweenness {
    fn scores(&self, graph: &Graph, config: &CentralityConfig) -> EngineResult<Vec<f64>> {
        betweenness_centrality(graph, config.weighted_distances, true)
    }
}

/// Betweenness of every node; `normalized` divides by `(n-1)(n-2)`
pub fn betweenness_centrality(graph: &Graph, weighted: bool, normalized: bool) -> EngineResult<Vec<f64>> {
    let n = graph.node_count();
    let mut cb = vec![0.0; n];

    for source in 0..n {
        let dag = shortest_path_dag(graph, source, weighted)?;
        let mut delta = vec![0.0; n];

        for &w in dag.order.iter().rev() {
            for &v in &dag.predecessors[w] {
                delta[v] += (dag.sigma[v] / dag.sigma[w]) * (1.0 + delta[w]);
            }
            if w != source {
                cb[w] += delta[w];
            }
        }
    }

    if normalized && n > 2 {
        let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
        for value in &mut cb {
            *value *= scale;
        }
    }

    Ok(cb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyMatrix;

    fn graph(labels: &[&str], edges: &[(&str, &str)]) -> Graph {
        let weighted: Vec<(&str, &str, f64)> = edges.iter().map(|&(a, b)| (a, b, 1.0)).collect();
        Graph::from_matrix(&AdjacencyMatrix::from_edges(labels, &weighted)).unwrap()
    }

    #[test]
    fn linear_chain_middle_node_has_betweenness() {
        // A → B → C: B lies on the only A→C path
        let g = graph(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
        let raw = betweenness_centrality(&g, false, false).unwrap();
        assert_eq!(raw, vec![0.0, 1.0, 0.0]);

        let normalized = betweenness_centrality(&g, false, true).unwrap();
        assert!((normalized[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn diamond_splits_credit_between_tied_paths() {
        // A → B → D, A → C → D: two shortest A→D paths
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
        );
        let raw = betweenness_centrality(&g, false, false).unwrap();

        assert!((raw[1] - 0.5).abs() < 1e-12);
        assert!((raw[2] - 0.5).abs() < 1e-12);
        assert_eq!(raw[0], 0.0);
        assert_eq!(raw[3], 0.0);
    }

    #[test]
    fn chain_of_four() {
        // B carries A→C and A→D; C carries A→D and B→D
        let g = graph(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
        let raw = betweenness_centrality(&g, false, false).unwrap();
        assert_eq!(raw, vec![0.0, 2.0, 2.0, 0.0]);
    }

    #[test]
    fn weighted_paths_avoid_heavy_edges() {
        let labels = ["A", "B", "C"];
        let matrix = AdjacencyMatrix::from_edges(
            &labels,
            &[("A", "C", 10.0), ("A", "B", 1.0), ("B", "C", 1.0)],
        );
        let g = Graph::from_matrix(&matrix).unwrap();

        assert_eq!(betweenness_centrality(&g, false, false).unwrap()[1], 0.0);
        assert_eq!(betweenness_centrality(&g, true, false).unwrap()[1], 1.0);
    }

    #[test]
    fn tiny_graphs_are_not_rescaled() {
        let g = graph(&["A", "B"], &[("A", "B")]);
        assert_eq!(betweenness_centrality(&g, false, true).unwrap(), vec![0.0, 0.0]);
    }
}
