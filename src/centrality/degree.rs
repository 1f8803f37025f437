//! Normalized in- and out-degree centrality

use crate::centrality::CentralityAlgorithm;
use crate::config::CentralityConfig;
use crate::error::EngineResult;
use crate::graph::Graph;

pub struct InDegree;

pub struct OutDegree;

impl CentralityAlgorithm for InDegree {
    fn scores(&self, graph: &Graph, _config: &CentralityConfig) -> EngineResult<Vec<f64>> {
        Ok(in_degree_centrality(graph))
    }
}

impl CentralityAlgorithm for OutDegree {
    fn scores(&self, graph: &Graph, _config: &CentralityConfig) -> EngineResult<Vec<f64>> {
        Ok(out_degree_centrality(graph))
    }
}

/// Incoming edge count divided by `n - 1`
pub fn in_degree_centrality(graph: &Graph) -> Vec<f64> {
    normalized_degrees(graph, |node| graph.in_degree(node))
}

/// Outgoing edge count divided by `n - 1`
pub fn out_degree_centrality(graph: &Graph) -> Vec<f64> {
    normalized_degrees(graph, |node| graph.out_degree(node))
}

fn normalized_degrees<F>(graph: &Graph, degree: F) -> Vec<f64>
where
    F: Fn(usize) -> usize,
{
    let n = graph.node_count();
    if n <= 1 {
        // no other node to connect to; only a self-loop counts
        return (0..n).map(|node| if degree(node) > 0 { 1.0 } else { 0.0 }).collect();
    }

    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|node| degree(node) as f64 * scale).collect()
}
