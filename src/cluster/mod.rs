//! Community detection module

pub mod dendrogram;
pub mod detection;
pub mod fast_greedy;
pub mod girvan_newman;
pub mod label_propagation;
pub mod louvain;
pub mod metrics;
pub mod modularity;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ClusterConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;

pub use dendrogram::Dendrogram;

/// Recognized clustering methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterMethod {
    Louvain,
    GirvanNewman,
    FastGreedy,
    LabelPropagation,
    /// Recognized but not implemented
    SpectralClustering,
    /// Recognized but not implemented
    Infomap,
}

impl ClusterMethod {
    pub const ALL: [ClusterMethod; 6] = [
        ClusterMethod::Louvain,
        ClusterMethod::GirvanNewman,
        ClusterMethod::FastGreedy,
        ClusterMethod::LabelPropagation,
        ClusterMethod::SpectralClustering,
        ClusterMethod::Infomap,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ClusterMethod::Louvain => "louvain",
            ClusterMethod::GirvanNewman => "girvan-newman",
            ClusterMethod::FastGreedy => "fast-greedy",
            ClusterMethod::LabelPropagation => "label-propagation",
            ClusterMethod::SpectralClustering => "spectral-clustering",
            ClusterMethod::Infomap => "infomap",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ClusterMethod::Louvain => "Louvain method",
            ClusterMethod::GirvanNewman => "Girvan-Newman method",
            ClusterMethod::FastGreedy => "Fast Greedy method",
            ClusterMethod::LabelPropagation => "Label Propagation method",
            ClusterMethod::SpectralClustering => "Spectral Clustering method",
            ClusterMethod::Infomap => "Infomap method",
        }
    }

    /// Whether detection runs on the undirected view of the graph
    pub fn requires_undirected(self) -> bool {
        matches!(
            self,
            ClusterMethod::Louvain | ClusterMethod::FastGreedy | ClusterMethod::LabelPropagation
        )
    }

    fn detector(self) -> EngineResult<&'static dyn CommunityDetector> {
        match self {
            ClusterMethod::Louvain => Ok(&louvain::Louvain),
            ClusterMethod::GirvanNewman => Ok(&girvan_newman::GirvanNewman),
            ClusterMethod::FastGreedy => Ok(&fast_greedy::FastGreedy),
            ClusterMethod::LabelPropagation => Ok(&label_propagation::LabelPropagation),
            ClusterMethod::SpectralClustering => {
                Err(EngineError::NotImplemented("Spectral Clustering method"))
            }
            ClusterMethod::Infomap => Err(EngineError::NotImplemented("Infomap method")),
        }
    }
}

impl fmt::Display for ClusterMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ClusterMethod {
    type Err = EngineError;

    /// Accepts the identifiers (`fast-greedy`) and titles
    /// (`Fast Greedy method`), case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let normalized = normalized.strip_suffix("-method").unwrap_or(&normalized);

        ClusterMethod::ALL
            .into_iter()
            .find(|m| m.id() == normalized)
            .ok_or_else(|| EngineError::UnknownMethod(s.to_string()))
    }
}

/// One community detection algorithm; returns a community id per node index
pub trait CommunityDetector {
    fn assign(&self, graph: &Graph, config: &ClusterConfig) -> EngineResult<Vec<usize>>;
}

/// Community id for every node of one graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub method: ClusterMethod,
    pub communities: BTreeMap<String, usize>,
}

impl Partition {
    pub fn from_assignment(graph: &Graph, method: ClusterMethod, assignment: &[usize]) -> Self {
        let communities = graph
            .labels()
            .iter()
            .cloned()
            .zip(assignment.iter().copied())
            .collect();
        Self {
            method,
            communities,
        }
    }

    pub fn community_of(&self, label: &str) -> Option<usize> {
        self.communities.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Members of each community, keyed by community id
    pub fn groups(&self) -> BTreeMap<usize, Vec<String>> {
        let mut groups: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for (label, &community) in &self.communities {
            groups.entry(community).or_default().push(label.clone());
        }
        groups
    }

    pub fn community_count(&self) -> usize {
        self.groups().len()
    }

    /// Community ids in node index order of `graph`
    pub fn assignment(&self, graph: &Graph) -> Vec<usize> {
        graph
            .labels()
            .iter()
            .map(|label| self.communities.get(label).copied().unwrap_or_default())
            .collect()
    }
}

/// Relabel communities `0..k` in order of first appearance
pub fn renumber(assignment: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    assignment
        .iter()
        .map(|&c| {
            let next = mapping.len();
            *mapping.entry(c).or_insert(next)
        })
        .collect()
}

/// Partition `graph` into communities with the selected method.
///
/// Louvain, Fast-Greedy and Label-Propagation run on the undirected view.
/// Spectral-Clustering and Infomap fail with
/// [`EngineError::NotImplemented`].
pub fn detect(graph: &Graph, method: ClusterMethod, config: &ClusterConfig) -> EngineResult<Partition> {
    let detector = method.detector()?;

    log::info!(
        "Detecting communities with {} on {} nodes",
        method.title(),
        graph.node_count()
    );

    let assignment = if method.requires_undirected() {
        detector.assign(&graph.to_undirected(), config)?
    } else {
        detector.assign(graph, config)?
    };

    let partition = Partition::from_assignment(graph, method, &assignment);
    log::info!("Found {} communities", partition.community_count());

    Ok(partition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyMatrix;

    #[test]
    fn parses_identifiers_and_titles() {
        for method in ClusterMethod::ALL {
            assert_eq!(method.id().parse::<ClusterMethod>().unwrap(), method);
            assert_eq!(method.title().parse::<ClusterMethod>().unwrap(), method);
        }
        assert_eq!(
            "Label_Propagation".parse::<ClusterMethod>().unwrap(),
            ClusterMethod::LabelPropagation
        );
        assert!(matches!(
            "k-means".parse::<ClusterMethod>(),
            Err(EngineError::UnknownMethod(_))
        ));
    }

    #[test]
    fn unsupported_methods_fail_without_a_partition() {
        let g = Graph::from_matrix(&AdjacencyMatrix::from_edges(&["A", "B"], &[("A", "B", 1.0)])).unwrap();
        let config = ClusterConfig::default();

        assert_eq!(
            detect(&g, ClusterMethod::SpectralClustering, &config),
            Err(EngineError::NotImplemented("Spectral Clustering method"))
        );
        assert_eq!(
            detect(&g, ClusterMethod::Infomap, &config),
            Err(EngineError::NotImplemented("Infomap method"))
        );
    }

    #[test]
    fn renumber_is_first_appearance() {
        assert_eq!(renumber(&[7, 7, 3, 9, 3]), vec![0, 0, 1, 2, 1]);
        assert!(renumber(&[]).is_empty());
    }
}
