//! Graph representation and algorithms module

pub mod algorithms;
pub mod builder;
pub mod compressed;
pub mod matrix;

use std::collections::HashMap;

use ndarray::Array2;
use petgraph::Direction;

pub use builder::GraphBuilder;
pub use compressed::CompressedAdjacency;
pub use matrix::{AdjacencyMatrix, Cell};

/// Immutable weighted graph with string-labelled nodes.
///
/// Nodes are indexed `0..node_count()` in the row order of the source
/// matrix. Undirected graphs store every edge in both adjacency directions,
/// so `successors` and `predecessors` both yield all neighbors.
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) labels: Vec<String>,
    pub(crate) index: HashMap<String, u32>,
    pub(crate) outgoing: CompressedAdjacency,
    pub(crate) incoming: CompressedAdjacency,
    pub(crate) directed: bool,
    pub(crate) edge_count: usize,
}

impl Graph {
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of edges; an undirected edge counts once
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn label(&self, node: usize) -> &str {
        &self.labels[node]
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).map(|&i| i as usize)
    }

    /// Out-neighbors with edge weights (all neighbors when undirected)
    pub fn successors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.outgoing.neighbors(node)
    }

    /// In-neighbors with edge weights (all neighbors when undirected)
    pub fn predecessors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.incoming.neighbors(node)
    }

    pub fn neighbors_directed(
        &self,
        node: usize,
        direction: Direction,
    ) -> impl Iterator<Item = (usize, f64)> + '_ {
        match direction {
            Direction::Outgoing => self.outgoing.neighbors(node),
            Direction::Incoming => self.incoming.neighbors(node),
        }
    }

    pub fn out_degree(&self, node: usize) -> usize {
        self.outgoing.degree(node)
    }

    pub fn in_degree(&self, node: usize) -> usize {
        self.incoming.degree(node)
    }

    pub fn weight(&self, src: usize, dst: usize) -> Option<f64> {
        self.outgoing.weight(src, dst)
    }

    pub fn has_self_loop(&self, node: usize) -> bool {
        self.outgoing.has_edge(node, node)
    }

    /// Iterate edges as `(source, target, weight)`; undirected edges are
    /// reported once with `source <= target`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let directed = self.directed;
        (0..self.node_count()).flat_map(move |src| {
            self.outgoing
                .neighbors(src)
                .filter(move |&(dst, _)| directed || src <= dst)
                .map(move |(dst, weight)| (src, dst, weight))
        })
    }

    /// Dense weighted adjacency matrix, `a[[src, dst]] = weight`
    pub fn dense_adjacency(&self) -> Array2<f64> {
        let n = self.node_count();
        let mut dense = Array2::zeros((n, n));
        for src in 0..n {
            for (dst, weight) in self.outgoing.neighbors(src) {
                dense[[src, dst]] = weight;
            }
        }
        dense
    }

    /// Undirected view of this graph; see [`algorithms::to_undirected`]
    pub fn to_undirected(&self) -> Graph {
        algorithms::to_undirected(self)
    }
}
