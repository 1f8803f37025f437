//! Community statistics and metrics

use std::collections::HashSet;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cluster::modularity::modularity;
use crate::cluster::Partition;
use crate::graph::Graph;

/// Number of central members reported per community
pub const CENTRAL_MEMBERS: usize = 5;

/// Summary of a single community
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunitySummary {
    pub id: usize,
    pub size: usize,
    pub members: Vec<String>,
    /// Internal edges over possible internal edges
    pub density: f64,
    /// Members with the most links inside the community, highest first
    pub central_members: Vec<String>,
}

/// Summary of a whole partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionSummary {
    pub community_count: usize,
    pub modularity: f64,
    pub communities: Vec<CommunitySummary>,
}

/// Calculate density (actual edges / potential edges)
pub fn calculate_density(graph: &Graph, members: &[usize]) -> f64 {
    let n = members.len();
    if n <= 1 {
        return 1.0; // By convention, singleton communities have density 1
    }

    // undirected graphs store both directions, so n * (n - 1) fits both cases
    let potential_edges = n * (n - 1);
    let member_set: HashSet<usize> = members.iter().copied().collect();

    let actual_edges = members
        .iter()
        .flat_map(|&src| graph.successors(src).map(move |(dst, _)| (src, dst)))
        .filter(|&(src, dst)| src != dst && member_set.contains(&dst))
        .count();

    actual_edges as f64 / potential_edges as f64
}

/// Members ranked by in + out links inside the community
pub fn central_members(graph: &Graph, members: &[usize], top_n: usize) -> Vec<usize> {
    let member_set: HashSet<usize> = members.iter().copied().collect();
    let internal_links = |node: usize| {
        graph
            .successors(node)
            .chain(graph.predecessors(node))
            .filter(|&(other, _)| other != node && member_set.contains(&other))
            .count()
    };

    members
        .iter()
        .map(|&node| (node, internal_links(node)))
        .sorted_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)))
        .take(top_n)
        .map(|(node, _)| node)
        .collect()
}

/// Size, density and central members of every community in `partition`
pub fn summarize(graph: &Graph, partition: &Partition) -> PartitionSummary {
    let assignment = partition.assignment(graph);
    let groups = assignment
        .iter()
        .enumerate()
        .map(|(node, &community)| (community, node))
        .into_group_map();

    let communities: Vec<CommunitySummary> = groups
        .into_iter()
        .sorted_by_key(|(id, _)| *id)
        .map(|(id, members)| CommunitySummary {
            id,
            size: members.len(),
            density: calculate_density(graph, &members),
            central_members: central_members(graph, &members, CENTRAL_MEMBERS)
                .into_iter()
                .map(|node| graph.label(node).to_string())
                .collect(),
            members: members.iter().map(|&node| graph.label(node).to_string()).collect(),
        })
        .collect();

    let summary = PartitionSummary {
        community_count: communities.len(),
        modularity: modularity(graph, &assignment, 1.0),
        communities,
    };
    log::debug!(
        "Partition summary: {} communities, modularity {:.4}",
        summary.community_count,
        summary.modularity
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterMethod;
    use crate::graph::AdjacencyMatrix;

    fn graph() -> Graph {
        // triangle A B C (directed both ways between A and B), pendant D
        Graph::from_matrix(&AdjacencyMatrix::from_edges(
            &["A", "B", "C", "D"],
            &[
                ("A", "B", 1.0),
                ("B", "A", 1.0),
                ("B", "C", 1.0),
                ("C", "A", 1.0),
                ("C", "D", 1.0),
            ],
        ))
        .unwrap()
    }

    #[test]
    fn density_counts_directed_links() {
        let g = graph();
        assert!((calculate_density(&g, &[0, 1, 2]) - 4.0 / 6.0).abs() < 1e-12);
        assert_eq!(calculate_density(&g, &[3]), 1.0);
        assert_eq!(calculate_density(&g, &[0, 3]), 0.0);
    }

    #[test]
    fn central_members_ranked_by_internal_links() {
        let g = graph();
        assert_eq!(central_members(&g, &[0, 1, 2], 2), vec![0, 1]);
    }

    #[test]
    fn summary_lists_every_community() {
        let g = graph();
        let partition = Partition::from_assignment(&g, ClusterMethod::Louvain, &[0, 0, 0, 1]);
        let summary = summarize(&g, &partition);

        assert_eq!(summary.community_count, 2);
        assert_eq!(summary.communities[0].members, vec!["A", "B", "C"]);
        assert_eq!(summary.communities[1].size, 1);
        assert!((summary.modularity - modularity(&g, &[0, 0, 0, 1], 1.0)).abs() < 1e-12);
    }
}
