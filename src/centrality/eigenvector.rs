//! Eigenvector centrality via power iteration.
//!
//! A node's score is the weighted sum of the scores of the nodes pointing
//! at it, so the iteration runs on the transposed adjacency matrix. Each step
//! computes `x + Aᵀx` and rescales to unit L2 norm; the added identity keeps
//! periodic graphs (cycles) from oscillating.

use crate::centrality::CentralityAlgorithm;
use crate::config::CentralityConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;
use crate::numeric::{power_iteration, IterationBudget};

pub struct Eigenvector;

impl CentralityAlgorithm for Eigenvector {
    fn scores(&self, graph: &Graph, config: &CentralityConfig) -> EngineResult<Vec<f64>> {
        eigenvector_centrality(graph, config.eigenvector_budget())
    }
}

/// Eigenvector centrality of every node.
///
/// Fails with [`EngineError::Computation`] on an empty or edgeless graph and
/// with [`EngineError::Convergence`] when the budget runs out.
pub fn eigenvector_centrality(graph: &Graph, budget: IterationBudget) -> EngineResult<Vec<f64>> {
    if graph.node_count() == 0 || graph.edge_count() == 0 {
        return Err(EngineError::Computation(
            "eigenvector centrality is undefined for a graph without edges".to_string(),
        ));
    }

    let transposed = graph.dense_adjacency().reversed_axes();
    let result = power_iteration(&transposed, budget, "eigenvector centrality")?;

    log::debug!("Eigenvector centrality converged in {} iterations", result.iterations);
    Ok(result.vector.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyMatrix;

    const BUDGET: IterationBudget = IterationBudget {
        max_iter: 100,
        tolerance: 1e-6,
    };

    #[test]
    fn cycle_scores_are_uniform() {
        let g = Graph::from_matrix(&AdjacencyMatrix::from_edges(
            &["A", "B", "C"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)],
        ))
        .unwrap();
        let scores = eigenvector_centrality(&g, BUDGET).unwrap();

        let expected = 1.0 / 3f64.sqrt();
        for score in scores {
            assert!((score - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn pointed_at_node_scores_highest() {
        // A and B both point at C, C points back at both: C = √2·A
        let g = Graph::from_matrix(&AdjacencyMatrix::from_edges(
            &["A", "B", "C"],
            &[("A", "C", 1.0), ("B", "C", 1.0), ("C", "A", 1.0), ("C", "B", 1.0)],
        ))
        .unwrap();
        let scores = eigenvector_centrality(&g, BUDGET).unwrap();

        assert!((scores[0] - scores[1]).abs() < 1e-12);
        assert!((scores[2] / scores[0] - 2f64.sqrt()).abs() < 1e-4);
        let norm: f64 = scores.iter().map(|s| s * s).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    #[test]
    fn edgeless_graph_is_a_computation_error() {
        let g = Graph::from_matrix(&AdjacencyMatrix::from_edges(&["A", "B"], &[])).unwrap();
        assert!(matches!(
            eigenvector_centrality(&g, BUDGET),
            Err(EngineError::Computation(_))
        ));
    }

    #[test]
    fn tiny_budget_is_a_convergence_error() {
        let g = Graph::from_matrix(&AdjacencyMatrix::from_edges(
            &["A", "B", "C"],
            &[("A", "C", 1.0), ("B", "C", 1.0), ("C", "A", 1.0)],
        ))
        .unwrap();
        let budget = IterationBudget {
            max_iter: 1,
            tolerance: 1e-12,
        };
        assert!(matches!(
            eigenvector_centrality(&g, budget),
            Err(EngineError::Convergence { iterations: 1, .. })
        ));
    }
}
