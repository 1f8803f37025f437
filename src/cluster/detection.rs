//! Connected component detection

use std::collections::HashMap;

use crate::graph::Graph;

/// Union-Find data structure for connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set (for union by size)
    rank: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            rank: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let px = self.parent[x as usize];
        if px != x {
            self.parent[x as usize] = self.find(px);
        }
        self.parent[x as usize]
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // attach smaller tree under root of larger tree
        if self.rank[root_x as usize] > self.rank[root_y as usize] {
            self.parent[root_y as usize] = root_x;
            self.rank[root_x as usize] += self.rank[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.rank[root_y as usize] += self.rank[root_x as usize];
        }
    }

    /// Get the size of the set containing x
    pub fn size(&mut self, x: u32) -> u32 {
        let root = self.find(x);
        self.rank[root as usize]
    }
}

/// Connected components of the edge set, ignoring direction.
///
/// Components are ordered by their lowest node index and list their members
/// in ascending order.
pub fn connected_components<I>(node_count: usize, edges: I) -> Vec<Vec<usize>>
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut sets = DisjointSets::new(node_count);
    for (src, dst) in edges {
        sets.union(src as u32, dst as u32);
    }

    let mut root_to_component: HashMap<u32, usize> = HashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for node in 0..node_count {
        let root = sets.find(node as u32);
        let component = *root_to_component.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[component].push(node);
    }

    components
}

/// Weakly connected components of a graph
pub fn graph_components(graph: &Graph) -> Vec<Vec<usize>> {
    connected_components(graph.node_count(), graph.edges().map(|(s, d, _)| (s, d)))
}
