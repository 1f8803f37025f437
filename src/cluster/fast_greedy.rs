//! Fast-Greedy (Clauset-Newman-Moore) agglomerative clustering.
//!
//! Starts from singleton communities and repeatedly merges the pair of
//! adjacent communities whose union increases modularity the most, while
//! any merge still increases it. Each merge is recorded as one dendrogram
//! level; the detected partition is the root level.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cluster::modularity::WeightedNetwork;
use crate::cluster::{CommunityDetector, Dendrogram};
use crate::config::ClusterConfig;
use crate::error::EngineResult;
use crate::graph::Graph;

/// Gains closer than this are treated as ties
const GAIN_EPSILON: f64 = 1e-12;

pub struct FastGreedy;

impl CommunityDetector for FastGreedy {
    fn assign(&self, graph: &Graph, config: &ClusterConfig) -> EngineResult<Vec<usize>> {
        Ok(dendrogram(graph, config)?.final_partition())
    }
}

/// Merge state; communities keep the id of their lowest original node
struct Agglomeration {
    /// `links[i][j]` is the fraction of edge ends joining `i` and `j`
    links: BTreeMap<usize, BTreeMap<usize, f64>>,
    /// Fraction of all edge ends attached to each community
    ends: BTreeMap<usize, f64>,
    resolution: f64,
}

impl Agglomeration {
    fn new(network: &WeightedNetwork, resolution: f64) -> Self {
        let two_m = 2.0 * network.total_weight;
        let links = network
            .neighbors
            .iter()
            .enumerate()
            .map(|(u, list)| {
                let row = list.iter().map(|&(v, w)| (v, w / two_m)).collect();
                (u, row)
            })
            .collect();
        let ends = network
            .degrees
            .iter()
            .enumerate()
            .map(|(u, &k)| (u, k / two_m))
            .collect();

        Self {
            links,
            ends,
            resolution,
        }
    }

    fn gain(&self, i: usize, j: usize, link: f64) -> f64 {
        2.0 * (link - self.resolution * self.ends[&i] * self.ends[&j])
    }

    /// Adjacent pairs `(i, j)`, `i < j`, sharing the best positive gain
    fn best_merges(&self) -> Vec<(usize, usize)> {
        let mut best_gain = 0.0;
        let mut best = Vec::new();

        for (&i, row) in &self.links {
            for (&j, &link) in row.range(i + 1..) {
                let gain = self.gain(i, j, link);
                if gain > best_gain + GAIN_EPSILON {
                    best_gain = gain;
                    best.clear();
                    best.push((i, j));
                } else if best_gain > 0.0 && (gain - best_gain).abs() <= GAIN_EPSILON {
                    best.push((i, j));
                }
            }
        }
        best
    }

    /// Fold community `j` into community `i`
    fn merge(&mut self, i: usize, j: usize) {
        let absorbed = self.links.remove(&j).unwrap_or_default();
        for (&k, &link) in &absorbed {
            if k == i {
                continue;
            }
            *self.links.entry(i).or_default().entry(k).or_default() += link;
            if let Some(row) = self.links.get_mut(&k) {
                row.remove(&j);
                *row.entry(i).or_default() += link;
            }
        }
        if let Some(row) = self.links.get_mut(&i) {
            row.remove(&j);
        }

        let absorbed_ends = self.ends.remove(&j).unwrap_or_default();
        *self.ends.entry(i).or_default() += absorbed_ends;
    }
}

/// Dendrogram of Fast-Greedy merges over the undirected view of `graph`.
///
/// Level 0 is the singleton partition; every later level records one merge.
pub fn dendrogram(graph: &Graph, config: &ClusterConfig) -> EngineResult<Dendrogram> {
    let network = WeightedNetwork::from_graph(graph);
    network.check_weight("Fast Greedy")?;

    let n = network.node_count();
    if network.edge_count == 0 {
        return Ok(Dendrogram::singletons(n));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut state = Agglomeration::new(&network, config.resolution);
    let mut active: Vec<usize> = (0..n).collect();
    let mut levels = vec![(0..n).collect::<Vec<_>>()];

    loop {
        let candidates = state.best_merges();
        if candidates.is_empty() {
            break;
        }
        let (i, j) = if candidates.len() == 1 {
            candidates[0]
        } else {
            candidates[rng.gen_range(0..candidates.len())]
        };

        state.merge(i, j);

        // compact ids of the previous level -> compact ids after the merge
        let next_active: Vec<usize> = active.iter().copied().filter(|&c| c != j).collect();
        let mapping = active
            .iter()
            .map(|&c| {
                let survivor = if c == j { i } else { c };
                next_active.binary_search(&survivor).unwrap_or_default()
            })
            .collect();
        levels.push(mapping);
        active = next_active;
    }

    log::info!(
        "Fast Greedy merged {} times into {} communities",
        levels.len() - 1,
        active.len()
    );
    Ok(Dendrogram::from_levels(levels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::modularity::modularity;
    use crate::graph::AdjacencyMatrix;

    fn undirected(labels: &[&str], edges: &[(&str, &str)]) -> Graph {
        let weighted: Vec<(&str, &str, f64)> = edges.iter().map(|&(a, b)| (a, b, 1.0)).collect();
        Graph::from_matrix(&AdjacencyMatrix::from_edges(labels, &weighted))
            .unwrap()
            .to_undirected()
    }

    fn two_triangles() -> Graph {
        undirected(
            &["A", "B", "C", "D", "E", "F"],
            &[("A", "B"), ("B", "C"), ("C", "A"), ("D", "E"), ("E", "F"), ("F", "D"), ("C", "D")],
        )
    }

    #[test]
    fn triangles_end_up_separate() {
        let partition = FastGreedy.assign(&two_triangles(), &ClusterConfig::default()).unwrap();
        assert_eq!(partition, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn every_merge_raises_modularity() {
        let g = two_triangles();
        let dendrogram = dendrogram(&g, &ClusterConfig::default()).unwrap();

        assert_eq!(dendrogram.depth(), 5);
        let mut previous = f64::NEG_INFINITY;
        for level in 0..dendrogram.depth() {
            let q = modularity(&g, &dendrogram.partition_at_level(level), 1.0);
            assert!(q > previous);
            previous = q;
        }
    }

    #[test]
    fn seeded_runs_agree() {
        let g = undirected(
            &["A", "B", "C", "D", "E", "F"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "E"), ("E", "F"), ("F", "A")],
        );
        let config = ClusterConfig {
            seed: 3,
            ..ClusterConfig::default()
        };
        assert_eq!(
            dendrogram(&g, &config).unwrap(),
            dendrogram(&g, &config).unwrap()
        );
    }

    #[test]
    fn edgeless_graph_gives_singletons() {
        let g = undirected(&["A", "B"], &[]);
        assert_eq!(FastGreedy.assign(&g, &ClusterConfig::default()).unwrap(), vec![0, 1]);
    }
}
