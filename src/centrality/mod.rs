//! Centrality measures.
//!
//! Each measure assigns a real score to every node of a [`Graph`]:
//!
//! - **Closeness** (`closeness`): how near a node is to the nodes it reaches.
//! - **Betweenness** (`betweenness`): how often a node lies on shortest paths
//!   between other pairs (Brandes' algorithm).
//! - **Eigenvector** (`eigenvector`): importance inherited from important
//!   in-neighbors, by power iteration.
//! - **In-degree / Out-degree** (`degree`): normalized edge counts.
//! - **Katz** (`katz`): attenuated count of all incoming walks.
//!
//! All measures read the graph as given; none converts it to undirected.
//! [`compute`] selects a measure by [`CentralityMethod`] and returns a
//! [`CentralityResult`] keyed by node label.

pub mod betweenness;
pub mod closeness;
pub mod degree;
pub mod eigenvector;
pub mod katz;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CentralityConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;

/// Recognized centrality measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CentralityMethod {
    Closeness,
    Betweenness,
    Eigenvector,
    InDegree,
    OutDegree,
    Katz,
}

impl CentralityMethod {
    pub const ALL: [CentralityMethod; 6] = [
        CentralityMethod::Closeness,
        CentralityMethod::Betweenness,
        CentralityMethod::Eigenvector,
        CentralityMethod::InDegree,
        CentralityMethod::OutDegree,
        CentralityMethod::Katz,
    ];

    /// Machine identifier, as accepted by `FromStr`
    pub fn id(self) -> &'static str {
        match self {
            CentralityMethod::Closeness => "closeness",
            CentralityMethod::Betweenness => "betweenness",
            CentralityMethod::Eigenvector => "eigenvector",
            CentralityMethod::InDegree => "in-degree",
            CentralityMethod::OutDegree => "out-degree",
            CentralityMethod::Katz => "katz",
        }
    }

    /// Human-readable title used on charts
    pub fn title(self) -> &'static str {
        match self {
            CentralityMethod::Closeness => "Closeness Centrality",
            CentralityMethod::Betweenness => "Betweenness Centrality",
            CentralityMethod::Eigenvector => "Eigenvector Centrality",
            CentralityMethod::InDegree => "In-degree Centrality",
            CentralityMethod::OutDegree => "Out-degree Centrality",
            CentralityMethod::Katz => "Katz Centrality",
        }
    }

    fn algorithm(self) -> &'static dyn CentralityAlgorithm {
        match self {
            CentralityMethod::Closeness => &closeness::Closeness,
            CentralityMethod::Betweenness => &betweenness::Betweenness,
            CentralityMethod::Eigenvector => &eigenvector::Eigenvector,
            CentralityMethod::InDegree => &degree::InDegree,
            CentralityMethod::OutDegree => &degree::OutDegree,
            CentralityMethod::Katz => &katz::Katz,
        }
    }
}

impl fmt::Display for CentralityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for CentralityMethod {
    type Err = EngineError;

    /// Accepts the identifiers (`in-degree`) and chart titles
    /// (`In-degree Centrality`), case-insensitively
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let normalized = normalized.strip_suffix("-centrality").unwrap_or(&normalized);
        let normalized = match normalized {
            "indegree" => "in-degree",
            "outdegree" => "out-degree",
            other => other,
        };

        CentralityMethod::ALL
            .into_iter()
            .find(|m| m.id() == normalized)
            .ok_or_else(|| EngineError::UnknownMethod(s.to_string()))
    }
}

/// One centrality measure; scores are returned in node index order
pub trait CentralityAlgorithm {
    fn scores(&self, graph: &Graph, config: &CentralityConfig) -> EngineResult<Vec<f64>>;
}

/// Scores for every node of one graph under one measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityResult {
    pub method: CentralityMethod,
    pub scores: BTreeMap<String, f64>,
}

impl CentralityResult {
    fn from_scores(graph: &Graph, method: CentralityMethod, scores: Vec<f64>) -> Self {
        let scores = graph.labels().iter().cloned().zip(scores).collect();
        Self { method, scores }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.scores.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Labels ordered by descending score, ties by label
    pub fn ranking(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> =
            self.scores.iter().map(|(l, &s)| (l.as_str(), s)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Compute one centrality measure over `graph`
pub fn compute(
    graph: &Graph,
    method: CentralityMethod,
    config: &CentralityConfig,
) -> EngineResult<CentralityResult> {
    log::info!(
        "Computing {} for {} nodes and {} edges",
        method.title(),
        graph.node_count(),
        graph.edge_count()
    );

    let scores = method.algorithm().scores(graph, config)?;
    debug_assert_eq!(scores.len(), graph.node_count());

    Ok(CentralityResult::from_scores(graph, method, scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identifiers_and_titles() {
        assert_eq!("katz".parse::<CentralityMethod>().unwrap(), CentralityMethod::Katz);
        assert_eq!(
            "In-degree Centrality".parse::<CentralityMethod>().unwrap(),
            CentralityMethod::InDegree
        );
        assert_eq!(
            "out_degree".parse::<CentralityMethod>().unwrap(),
            CentralityMethod::OutDegree
        );
        for method in CentralityMethod::ALL {
            assert_eq!(method.title().parse::<CentralityMethod>().unwrap(), method);
            assert_eq!(method.to_string().parse::<CentralityMethod>().unwrap(), method);
        }
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert_eq!(
            "pagerank".parse::<CentralityMethod>(),
            Err(EngineError::UnknownMethod("pagerank".to_string()))
        );
    }

    #[test]
    fn ranking_orders_by_score_then_label() {
        let result = CentralityResult {
            method: CentralityMethod::Closeness,
            scores: [("b", 0.5), ("a", 0.5), ("c", 0.9)]
                .into_iter()
                .map(|(l, s)| (l.to_string(), s))
                .collect(),
        };
        let order: Vec<&str> = result.ranking().into_iter().map(|(l, _)| l).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }
}
