//! Weighted undirected network and Newman modularity.
//!
//! Louvain and Fast-Greedy both work on a [`WeightedNetwork`]: neighbor
//! lists without self-loops, a separate self-loop weight per node, and
//! weighted degrees where a self-loop counts twice. Aggregating a network by
//! a partition turns each community into one node whose internal edges
//! become its self-loop.

use std::collections::HashMap;

use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedNetwork {
    pub neighbors: Vec<Vec<(usize, f64)>>,
    pub self_loops: Vec<f64>,
    pub degrees: Vec<f64>,
    /// Sum of edge weights, each undirected edge and self-loop counted once
    pub total_weight: f64,
    pub edge_count: usize,
}

impl WeightedNetwork {
    /// Network over the undirected view of `graph`
    pub fn from_graph(graph: &Graph) -> Self {
        let undirected = graph.to_undirected();
        Self::from_edges(undirected.node_count(), undirected.edges())
    }

    /// Network from undirected edges; parallel edges accumulate
    pub fn from_edges<I>(node_count: usize, edges: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut weights: Vec<HashMap<usize, f64>> = vec![HashMap::new(); node_count];
        let mut self_loops = vec![0.0; node_count];
        let mut total_weight = 0.0;
        let mut edge_count = 0;

        for (u, v, w) in edges {
            total_weight += w;
            edge_count += 1;
            if u == v {
                self_loops[u] += w;
            } else {
                *weights[u].entry(v).or_default() += w;
                *weights[v].entry(u).or_default() += w;
            }
        }

        let neighbors: Vec<Vec<(usize, f64)>> = weights
            .into_iter()
            .map(|map| {
                let mut list: Vec<(usize, f64)> = map.into_iter().collect();
                list.sort_by_key(|&(n, _)| n);
                list
            })
            .collect();

        let degrees = neighbors
            .iter()
            .zip(&self_loops)
            .map(|(list, &loop_weight)| list.iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * loop_weight)
            .collect();

        Self {
            neighbors,
            self_loops,
            degrees,
            total_weight,
            edge_count,
        }
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Modularity is only meaningful with positive total weight
    pub fn check_weight(&self, algorithm: &str) -> EngineResult<()> {
        if self.edge_count > 0 && self.total_weight <= 0.0 {
            return Err(EngineError::Computation(format!(
                "{algorithm} needs a positive total edge weight, got {}",
                self.total_weight
            )));
        }
        Ok(())
    }

    /// Collapse each community of `assignment` (ids `0..k`) into one node
    pub fn aggregate(&self, assignment: &[usize]) -> Self {
        let community_count = assignment.iter().max().map_or(0, |&c| c + 1);

        let mut edges = Vec::new();
        for (u, list) in self.neighbors.iter().enumerate() {
            for &(v, w) in list {
                if u < v {
                    edges.push((assignment[u], assignment[v], w));
                }
            }
            if self.self_loops[u] != 0.0 {
                edges.push((assignment[u], assignment[u], self.self_loops[u]));
            }
        }

        let mut aggregated = Self::from_edges(community_count, edges);
        aggregated.edge_count = self.edge_count;
        aggregated
    }

    /// Newman modularity of `assignment` with the given resolution
    pub fn modularity(&self, assignment: &[usize], resolution: f64) -> f64 {
        if self.total_weight == 0.0 {
            return 0.0;
        }

        let mut internal: HashMap<usize, f64> = HashMap::new();
        let mut degree: HashMap<usize, f64> = HashMap::new();
        for u in 0..self.node_count() {
            let cu = assignment[u];
            *degree.entry(cu).or_default() += self.degrees[u];
            *internal.entry(cu).or_default() += self.self_loops[u];
            for &(v, w) in &self.neighbors[u] {
                if u < v && assignment[v] == cu {
                    *internal.entry(cu).or_default() += w;
                }
            }
        }

        let m = self.total_weight;
        degree
            .iter()
            .map(|(c, &d)| {
                let inside = internal.get(c).copied().unwrap_or(0.0);
                inside / m - resolution * (d / (2.0 * m)).powi(2)
            })
            .sum()
    }
}

/// Modularity of a node assignment over the undirected view of `graph`
pub fn modularity(graph: &Graph, assignment: &[usize], resolution: f64) -> f64 {
    WeightedNetwork::from_graph(graph).modularity(assignment, resolution)
}
