//! Hierarchical community levels

use serde::{Deserialize, Serialize};

/// Levels of a hierarchical clustering.
///
/// Level 0 maps nodes to communities; each later level maps the
/// communities of the level before it to coarser communities. Ids within a
/// level are contiguous from 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    levels: Vec<Vec<usize>>,
}

impl Dendrogram {
    /// Dendrogram with the single all-singleton level
    pub fn singletons(node_count: usize) -> Self {
        Self {
            levels: vec![(0..node_count).collect()],
        }
    }

    pub fn from_levels(levels: Vec<Vec<usize>>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Node assignment obtained by composing levels `0..=level`
    pub fn partition_at_level(&self, level: usize) -> Vec<usize> {
        let Some(first) = self.levels.first() else {
            return Vec::new();
        };

        let mut partition = first.clone();
        for mapping in self.levels.iter().take(level + 1).skip(1) {
            for community in &mut partition {
                *community = mapping[*community];
            }
        }
        partition
    }

    /// Assignment at the coarsest (last) level
    pub fn final_partition(&self) -> Vec<usize> {
        self.partition_at_level(self.levels.len().saturating_sub(1))
    }
}
