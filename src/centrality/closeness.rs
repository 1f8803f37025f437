//! Closeness centrality.
//!
//! For a node `v` that reaches `r - 1` other nodes at total distance `S`:
//!
//! ```text
//! closeness(v) = (r - 1) / S * (r - 1) / (n - 1)
//! ```
//!
//! The second factor scales the score by the fraction of the graph that is
//! reachable, so nodes in small components get reduced rather than undefined
//! scores. Nodes that reach nothing score 0.

use petgraph::Direction;

use crate::centrality::CentralityAlgorithm;
use crate::config::{CentralityConfig, ClosenessDirection};
use crate::error::EngineResult;
use crate::graph::algorithms::{bfs_distances, dijkstra_distances};
use crate::graph::Graph;

pub struct Closeness;

impl CentralityAlgorithm for Closeness {
    fn scores(&self, graph: &Graph, config: &CentralityConfig) -> EngineResult<Vec<f64>> {
        closeness_centrality(graph, config.closeness_direction, config.weighted_distances)
    }
}

/// Closeness of every node, by hop count or by edge weight
pub fn closeness_centrality(
    graph: &Graph,
    direction: ClosenessDirection,
    weighted: bool,
) -> EngineResult<Vec<f64>> {
    let n = graph.node_count();
    let direction = match direction {
        ClosenessDirection::Outgoing => Direction::Outgoing,
        ClosenessDirection::Incoming => Direction::Incoming,
    };

    let mut scores = Vec::with_capacity(n);
    for source in 0..n {
        let (reachable, total) = if weighted {
            dijkstra_distances(graph, source, direction)?
                .into_iter()
                .flatten()
                .fold((0usize, 0.0), |(r, s), d| (r + 1, s + d))
        } else {
            bfs_distances(graph, source, direction)
                .into_iter()
                .flatten()
                .fold((0usize, 0.0), |(r, s), d| (r + 1, s + d as f64))
        };

        let score = if total > 0.0 && n > 1 {
            let others = (reachable - 1) as f64;
            (others / total) * (others / (n - 1) as f64)
        } else {
            0.0
        };
        scores.push(score);
    }

    Ok(scores)
}
