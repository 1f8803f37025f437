//! Compressed sparse row adjacency

/// Compressed sparse representation of one direction of a graph's edges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressedAdjacency {
    /// Offset array: index where each node's edges begin
    /// offsets[i] to offsets[i+1] defines the edge range for node i
    offsets: Vec<u32>,

    /// Edge array: concatenated, sorted lists of neighbor nodes
    targets: Vec<u32>,

    /// Edge weights, parallel to `targets`
    weights: Vec<f64>,
}

impl CompressedAdjacency {
    /// Create an empty adjacency with pre-allocated capacity
    pub fn with_capacity(node_count: usize, edge_count: usize) -> Self {
        Self {
            offsets: Vec::with_capacity(node_count + 1),
            targets: Vec::with_capacity(edge_count),
            weights: Vec::with_capacity(edge_count),
        }
    }

    /// Pack per-node neighbor lists; each list is sorted by target
    pub fn from_lists(lists: &[Vec<(u32, f64)>]) -> Self {
        let edge_count = lists.iter().map(Vec::len).sum();
        let mut adjacency = Self::with_capacity(lists.len(), edge_count);

        adjacency.offsets.push(0);
        let mut offset = 0u32;
        for list in lists {
            let mut sorted = list.clone();
            sorted.sort_by_key(|&(target, _)| target);
            for (target, weight) in sorted {
                adjacency.targets.push(target);
                adjacency.weights.push(weight);
                offset += 1;
            }
            adjacency.offsets.push(offset);
        }

        adjacency
    }

    pub fn node_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Number of stored (node, neighbor) entries
    pub fn entry_count(&self) -> usize {
        self.targets.len()
    }

    fn range(&self, node: usize) -> std::ops::Range<usize> {
        self.offsets[node] as usize..self.offsets[node + 1] as usize
    }

    /// Neighbor indices of a node, sorted ascending
    pub fn targets(&self, node: usize) -> &[u32] {
        &self.targets[self.range(node)]
    }

    /// Neighbors of a node together with the edge weight
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.range(node);
        self.targets[range.clone()]
            .iter()
            .zip(&self.weights[range])
            .map(|(&t, &w)| (t as usize, w))
    }

    /// Weight of the entry `src -> dst`, if any
    pub fn weight(&self, src: usize, dst: usize) -> Option<f64> {
        let range = self.range(src);
        self.targets[range.clone()]
            .binary_search(&(dst as u32))
            .ok()
            .map(|pos| self.weights[range.start + pos])
    }

    pub fn has_edge(&self, src: usize, dst: usize) -> bool {
        self.targets(src).binary_search(&(dst as u32)).is_ok()
    }

    pub fn degree(&self, node: usize) -> usize {
        let range = self.range(node);
        range.end - range.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_sorted_and_searchable() {
        let adjacency = CompressedAdjacency::from_lists(&[
            vec![(2, 1.5), (1, 2.0)],
            vec![],
            vec![(0, 3.0)],
        ]);

        assert_eq!(adjacency.node_count(), 3);
        assert_eq!(adjacency.entry_count(), 3);
        assert_eq!(adjacency.targets(0), &[1, 2]);
        assert_eq!(adjacency.weight(0, 2), Some(1.5));
        assert_eq!(adjacency.weight(1, 0), None);
        assert!(adjacency.has_edge(2, 0));
        assert_eq!(adjacency.degree(1), 0);
    }
}
