//! Katz centrality.
//!
//! Solves `x = α·Aᵀx + β` by fixed-point iteration from `x = 0`. The
//! iteration converges only when `α` is below the reciprocal of the largest
//! eigenvalue of `A`; otherwise the iterate grows without bound and the solve
//! fails with a convergence error.

use ndarray::Array1;

use crate::centrality::CentralityAlgorithm;
use crate::config::CentralityConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;
use crate::numeric::{fixed_point, l2_normalize, IterationBudget};

pub struct Katz;

impl CentralityAlgorithm for Katz {
    fn scores(&self, graph: &Graph, config: &CentralityConfig) -> EngineResult<Vec<f64>> {
        katz_centrality(
            graph,
            config.katz_alpha,
            config.katz_beta,
            config.katz_budget(),
            config.katz_normalized,
        )
    }
}

pub fn katz_centrality(
    graph: &Graph,
    alpha: f64,
    beta: f64,
    budget: IterationBudget,
    normalized: bool,
) -> EngineResult<Vec<f64>> {
    if graph.node_count() == 0 || graph.edge_count() == 0 {
        return Err(EngineError::Computation(
            "Katz centrality is undefined for a graph without edges".to_string(),
        ));
    }

    let transposed = graph.dense_adjacency().reversed_axes();
    let start = Array1::zeros(graph.node_count());

    let result = fixed_point(start, budget, "Katz centrality", |x| {
        transposed.dot(x) * alpha + beta
    })?;
    log::debug!("Katz centrality converged in {} iterations", result.iterations);

    let vector = if normalized {
        l2_normalize(result.vector)
    } else {
        result.vector
    };
    Ok(vector.to_vec())
}
