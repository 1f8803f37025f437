//! Louvain modularity optimization.
//!
//! Each level starts from singleton communities and repeatedly sweeps the
//! nodes in a seeded random order, moving each node to the neighboring
//! community with the largest strictly positive modularity gain:
//!
//! ```text
//! ΔQ ∝ k_i,C − γ·Σ_tot(C)·k_i / 2m  −  (k_i,old − γ·Σ_tot(old \ i)·k_i / 2m)
//! ```
//!
//! A level ends once a sweep improves modularity by less than
//! [`MIN_IMPROVEMENT`]. The communities are then collapsed into nodes and the
//! next level runs on the aggregated network, until a level brings no
//! improvement. Every level is kept in a [`Dendrogram`]; the detected
//! partition is the last level.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::cluster::modularity::WeightedNetwork;
use crate::cluster::{renumber, CommunityDetector, Dendrogram};
use crate::config::ClusterConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;

/// Smallest modularity gain that counts as progress
pub const MIN_IMPROVEMENT: f64 = 1e-7;

pub struct Louvain;

impl CommunityDetector for Louvain {
    fn assign(&self, graph: &Graph, config: &ClusterConfig) -> EngineResult<Vec<usize>> {
        Ok(dendrogram(graph, config)?.final_partition())
    }
}

/// Per-community bookkeeping for one level
struct LevelState<'a> {
    network: &'a WeightedNetwork,
    resolution: f64,
    community: Vec<usize>,
    community_degree: Vec<f64>,
    community_internal: Vec<f64>,
}

impl<'a> LevelState<'a> {
    fn new(network: &'a WeightedNetwork, resolution: f64) -> Self {
        Self {
            network,
            resolution,
            community: (0..network.node_count()).collect(),
            community_degree: network.degrees.clone(),
            community_internal: network.self_loops.clone(),
        }
    }

    fn modularity(&self) -> f64 {
        let m = self.network.total_weight;
        self.community_internal
            .iter()
            .zip(&self.community_degree)
            .map(|(&inside, &degree)| inside / m - self.resolution * (degree / (2.0 * m)).powi(2))
            .sum()
    }

    /// Weight from `node` to each neighboring community, in first-seen order
    fn neighbor_communities(&self, node: usize) -> Vec<(usize, f64)> {
        let mut position: HashMap<usize, usize> = HashMap::new();
        let mut weights: Vec<(usize, f64)> = Vec::new();
        for &(neighbor, weight) in &self.network.neighbors[node] {
            let community = self.community[neighbor];
            match position.get(&community) {
                Some(&p) => weights[p].1 += weight,
                None => {
                    position.insert(community, weights.len());
                    weights.push((community, weight));
                }
            }
        }
        weights
    }

    fn remove(&mut self, node: usize, community: usize, link_weight: f64) {
        self.community_degree[community] -= self.network.degrees[node];
        self.community_internal[community] -= link_weight + self.network.self_loops[node];
    }

    fn insert(&mut self, node: usize, community: usize, link_weight: f64) {
        self.community[node] = community;
        self.community_degree[community] += self.network.degrees[node];
        self.community_internal[community] += link_weight + self.network.self_loops[node];
    }

    /// Try to move one node; returns whether it changed community
    fn move_node(&mut self, node: usize, rng: &mut StdRng) -> bool {
        let old = self.community[node];
        let mut candidates = self.neighbor_communities(node);
        let weight_to = |candidates: &[(usize, f64)], community: usize| {
            candidates
                .iter()
                .find(|&&(c, _)| c == community)
                .map_or(0.0, |&(_, w)| w)
        };

        let degree_share = self.network.degrees[node] / (2.0 * self.network.total_weight);
        let old_weight = weight_to(&candidates, old);
        let remove_cost = -old_weight
            + self.resolution * (self.community_degree[old] - self.network.degrees[node]) * degree_share;
        self.remove(node, old, old_weight);

        candidates.shuffle(rng);
        let mut best = old;
        let mut best_gain = 0.0;
        for &(community, weight) in &candidates {
            let gain =
                remove_cost + weight - self.resolution * self.community_degree[community] * degree_share;
            if gain > best_gain {
                best_gain = gain;
                best = community;
            }
        }

        self.insert(node, best, weight_to(&candidates, best));
        best != old
    }
}

/// Run local moving on one level; returns the node assignment
fn one_level(
    network: &WeightedNetwork,
    config: &ClusterConfig,
    rng: &mut StdRng,
) -> EngineResult<Vec<usize>> {
    let mut state = LevelState::new(network, config.resolution);
    let mut order: Vec<usize> = (0..network.node_count()).collect();
    let mut current = state.modularity();

    for pass in 1..=config.louvain_max_passes {
        order.shuffle(rng);
        let mut moved = false;
        for &node in &order {
            moved |= state.move_node(node, rng);
        }

        let next = state.modularity();
        log::debug!("Louvain pass {}: modularity {:.6} -> {:.6}", pass, current, next);
        if !moved || next - current < MIN_IMPROVEMENT {
            return Ok(state.community);
        }
        current = next;
    }

    Err(EngineError::Convergence {
        algorithm: "Louvain local moving",
        iterations: config.louvain_max_passes,
    })
}

/// All Louvain levels for the undirected view of `graph`
pub fn dendrogram(graph: &Graph, config: &ClusterConfig) -> EngineResult<Dendrogram> {
    let network = WeightedNetwork::from_graph(graph);
    network.check_weight("Louvain")?;

    if network.edge_count == 0 {
        return Ok(Dendrogram::singletons(network.node_count()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut levels = Vec::new();

    let level_budget_exceeded = || EngineError::Convergence {
        algorithm: "Louvain aggregation",
        iterations: config.louvain_max_levels,
    };

    let assignment = renumber(&one_level(&network, config, &mut rng)?);
    if config.louvain_max_levels == 0 {
        return Err(level_budget_exceeded());
    }
    let mut modularity = network.modularity(&assignment, config.resolution);
    let mut current = network.aggregate(&assignment);
    levels.push(assignment);

    loop {
        let assignment = renumber(&one_level(&current, config, &mut rng)?);
        let next = current.modularity(&assignment, config.resolution);
        if next - modularity < MIN_IMPROVEMENT {
            break;
        }
        // only a level that still improves needs room in the budget
        if levels.len() >= config.louvain_max_levels {
            return Err(level_budget_exceeded());
        }

        log::debug!(
            "Louvain level {}: {} communities, modularity {:.6}",
            levels.len(),
            assignment.iter().max().map_or(0, |&c| c + 1),
            next
        );
        modularity = next;
        current = current.aggregate(&assignment);
        levels.push(assignment);
    }

    log::info!(
        "Louvain finished with {} levels, modularity {:.6}",
        levels.len(),
        modularity
    );
    Ok(Dendrogram::from_levels(levels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyMatrix;

    fn undirected(labels: &[&str], edges: &[(&str, &str)]) -> Graph {
        let weighted: Vec<(&str, &str, f64)> = edges.iter().map(|&(a, b)| (a, b, 1.0)).collect();
        Graph::from_matrix(&AdjacencyMatrix::from_edges(labels, &weighted))
            .unwrap()
            .to_undirected()
    }

    #[test]
    fn two_cliques_with_a_bridge_split_in_two() {
        let g = undirected(
            &["A", "B", "C", "D", "E", "F", "G", "H"],
            &[
                ("A", "B"), ("A", "C"), ("A", "D"), ("B", "C"), ("B", "D"), ("C", "D"),
                ("E", "F"), ("E", "G"), ("E", "H"), ("F", "G"), ("F", "H"), ("G", "H"),
                ("D", "E"),
            ],
        );
        let partition = Louvain.assign(&g, &ClusterConfig::default()).unwrap();

        assert_eq!(partition[0..4], [partition[0]; 4]);
        assert_eq!(partition[4..8], [partition[4]; 4]);
        assert_ne!(partition[0], partition[4]);
    }

    #[test]
    fn same_seed_same_partition() {
        let g = undirected(
            &["A", "B", "C", "D", "E", "F"],
            &[("A", "B"), ("B", "C"), ("C", "D"), ("D", "E"), ("E", "F"), ("F", "A"), ("A", "D")],
        );
        let config = ClusterConfig {
            seed: 9,
            ..ClusterConfig::default()
        };

        let first = dendrogram(&g, &config).unwrap();
        let second = dendrogram(&g, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn edgeless_graph_gives_singletons() {
        let g = undirected(&["A", "B", "C"], &[]);
        assert_eq!(Louvain.assign(&g, &ClusterConfig::default()).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn levels_never_lower_modularity() {
        let g = undirected(
            &["A", "B", "C", "D", "E", "F"],
            &[("A", "B"), ("B", "C"), ("A", "C"), ("D", "E"), ("E", "F"), ("D", "F"), ("C", "D")],
        );
        let config = ClusterConfig::default();
        let dendrogram = dendrogram(&g, &config).unwrap();
        let network = WeightedNetwork::from_graph(&g);

        let mut previous = f64::NEG_INFINITY;
        for level in 0..dendrogram.depth() {
            let q = network.modularity(&dendrogram.partition_at_level(level), config.resolution);
            assert!(q >= previous - 1e-12);
            previous = q;
        }
        assert!(previous > 0.3);
    }

    fn bridged_triangles() -> Graph {
        undirected(
            &["A", "B", "C", "D", "E", "F"],
            &[("A", "B"), ("B", "C"), ("A", "C"), ("D", "E"), ("E", "F"), ("D", "F"), ("C", "D")],
        )
    }

    /// Twelve triangles, each joined to the next by one edge, closed into a ring
    fn ring_of_triangles() -> Graph {
        let labels: Vec<String> = (0..36).map(|i| format!("n{i}")).collect();
        let mut edges = Vec::new();
        for t in 0..12 {
            let (a, b, c) = (3 * t, 3 * t + 1, 3 * t + 2);
            edges.extend([(a, b), (b, c), (a, c), (c, (c + 1) % 36)]);
        }

        let labels: Vec<&str> = labels.iter().map(String::as_str).collect();
        let edges: Vec<(&str, &str)> = edges.iter().map(|&(u, v)| (labels[u], labels[v])).collect();
        undirected(&labels, &edges)
    }

    #[test]
    fn single_pass_budget_is_reported() {
        let config = ClusterConfig {
            louvain_max_passes: 1,
            ..ClusterConfig::default()
        };
        assert!(matches!(
            dendrogram(&bridged_triangles(), &config),
            Err(EngineError::Convergence {
                algorithm: "Louvain local moving",
                iterations: 1
            })
        ));
    }

    #[test]
    fn level_budget_equal_to_depth_is_enough() {
        let g = bridged_triangles();
        let unbounded = dendrogram(&g, &ClusterConfig::default()).unwrap();
        assert_eq!(unbounded.depth(), 1);

        let config = ClusterConfig {
            louvain_max_levels: 1,
            ..ClusterConfig::default()
        };
        assert_eq!(dendrogram(&g, &config).unwrap(), unbounded);

        let ring = ring_of_triangles();
        let unbounded = dendrogram(&ring, &ClusterConfig::default()).unwrap();
        assert_eq!(unbounded.depth(), 2);
        let config = ClusterConfig {
            louvain_max_levels: 2,
            ..ClusterConfig::default()
        };
        assert_eq!(dendrogram(&ring, &config).unwrap(), unbounded);
    }

    #[test]
    fn level_budget_below_depth_is_reported() {
        let config = ClusterConfig {
            louvain_max_levels: 1,
            ..ClusterConfig::default()
        };
        assert!(matches!(
            dendrogram(&ring_of_triangles(), &config),
            Err(EngineError::Convergence {
                algorithm: "Louvain aggregation",
                iterations: 1
            })
        ));
    }
}
