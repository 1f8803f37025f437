//! Girvan-Newman divisive clustering.
//!
//! Repeatedly removes the edge with the highest shortest-path betweenness
//! until the graph falls apart into more connected components than it
//! started with. The components at that point are the communities.

use std::collections::{BTreeMap, BTreeSet};

use crate::cluster::detection::connected_components;
use crate::cluster::CommunityDetector;
use crate::config::ClusterConfig;
use crate::error::EngineResult;
use crate::graph::algorithms::shortest_path_dag_with;
use crate::graph::Graph;

pub struct GirvanNewman;

impl CommunityDetector for GirvanNewman {
    fn assign(&self, graph: &Graph, _config: &ClusterConfig) -> EngineResult<Vec<usize>> {
        Ok(first_split(graph))
    }
}

/// Simple undirected adjacency; edges are removed as the split proceeds
struct SplitGraph {
    adjacency: Vec<BTreeSet<usize>>,
}

impl SplitGraph {
    fn from_graph(graph: &Graph) -> Self {
        let mut adjacency = vec![BTreeSet::new(); graph.node_count()];
        for (src, dst, _) in graph.edges() {
            if src != dst {
                adjacency[src].insert(dst);
                adjacency[dst].insert(src);
            }
        }
        Self { adjacency }
    }

    fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(u, set)| set.iter().filter(move |&&v| u < v).map(move |&v| (u, v)))
    }

    fn has_edges(&self) -> bool {
        self.adjacency.iter().any(|set| !set.is_empty())
    }

    fn components(&self) -> Vec<Vec<usize>> {
        connected_components(self.node_count(), self.edges())
    }

    fn remove(&mut self, u: usize, v: usize) {
        self.adjacency[u].remove(&v);
        self.adjacency[v].remove(&u);
    }

    /// Unnormalized edge betweenness, keyed by `(u, v)` with `u < v`
    fn edge_betweenness(&self) -> BTreeMap<(usize, usize), f64> {
        let n = self.node_count();
        let mut betweenness: BTreeMap<(usize, usize), f64> =
            self.edges().map(|edge| (edge, 0.0)).collect();

        for source in 0..n {
            let dag = shortest_path_dag_with(n, source, |v| self.adjacency[v].iter().copied());
            let mut delta = vec![0.0; n];
            for &w in dag.order.iter().rev() {
                for &v in &dag.predecessors[w] {
                    let credit = dag.sigma[v] / dag.sigma[w] * (1.0 + delta[w]);
                    *betweenness.entry((v.min(w), v.max(w))).or_default() += credit;
                    delta[v] += credit;
                }
            }
        }

        betweenness
    }

    /// Edge with maximal betweenness; ties go to the smallest `(u, v)`
    fn most_central_edge(&self) -> Option<(usize, usize)> {
        let mut best: Option<((usize, usize), f64)> = None;
        for (edge, score) in self.edge_betweenness() {
            match best {
                Some((_, top)) if score <= top + 1e-12 => {}
                _ => best = Some((edge, score)),
            }
        }
        best.map(|(edge, _)| edge)
    }
}

/// Components after the first Girvan-Newman split, as community ids.
///
/// A graph without edges yields its components unchanged.
pub fn first_split(graph: &Graph) -> Vec<usize> {
    let mut split = SplitGraph::from_graph(&graph.to_undirected());
    let mut components = split.components();
    let initial = components.len();
    let mut removed = 0usize;

    while split.has_edges() {
        let Some((u, v)) = split.most_central_edge() else {
            break;
        };
        split.remove(u, v);
        removed += 1;

        components = split.components();
        if components.len() > initial {
            break;
        }
    }

    log::debug!(
        "Girvan-Newman removed {} edges: {} -> {} components",
        removed,
        initial,
        components.len()
    );

    let mut assignment = vec![0; split.node_count()];
    for (community, members) in components.iter().enumerate() {
        for &node in members {
            assignment[node] = community;
        }
    }
    assignment
}
