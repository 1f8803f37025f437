//! Configuration management for the analytics engine

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::numeric::IterationBudget;

/// Which way distances run for closeness centrality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClosenessDirection {
    /// Distances from the node to the nodes it reaches
    Outgoing,
    /// Distances to the node from the nodes that reach it
    Incoming,
}

/// Parameters for the centrality measures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CentralityConfig {
    pub closeness_direction: ClosenessDirection,

    /// Use edge weights as distances for closeness and betweenness
    pub weighted_distances: bool,

    pub eigenvector_max_iter: usize,
    pub eigenvector_tolerance: f64,

    /// Attenuation factor; must stay below 1 / spectral radius
    pub katz_alpha: f64,
    pub katz_beta: f64,
    pub katz_max_iter: usize,
    pub katz_tolerance: f64,
    pub katz_normalized: bool,
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            closeness_direction: ClosenessDirection::Outgoing,
            weighted_distances: false,
            eigenvector_max_iter: 100,
            eigenvector_tolerance: 1e-6,
            katz_alpha: 0.1,
            katz_beta: 1.0,
            katz_max_iter: 1000,
            katz_tolerance: 1e-6,
            katz_normalized: true,
        }
    }
}

impl CentralityConfig {
    pub fn eigenvector_budget(&self) -> IterationBudget {
        IterationBudget {
            max_iter: self.eigenvector_max_iter,
            tolerance: self.eigenvector_tolerance,
        }
    }

    pub fn katz_budget(&self) -> IterationBudget {
        IterationBudget {
            max_iter: self.katz_max_iter,
            tolerance: self.katz_tolerance,
        }
    }
}

/// Parameters for community detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Seed for node ordering and tie-breaking
    pub seed: u64,

    /// Modularity resolution (1.0 = classic Newman modularity)
    pub resolution: f64,

    /// Local-moving passes allowed per Louvain level
    pub louvain_max_passes: usize,

    /// Aggregation levels allowed for Louvain
    pub louvain_max_levels: usize,

    /// Sweeps allowed for label propagation
    pub label_propagation_max_iter: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            resolution: 1.0,
            louvain_max_passes: 1000,
            louvain_max_levels: 100,
            label_propagation_max_iter: 100,
        }
    }
}

/// Parameters for the force-directed layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub seed: u64,
    pub iterations: usize,

    /// Stop once the mean step length falls below this value
    pub threshold: f64,

    /// Optimal edge length; `1/sqrt(n)` when unset
    pub k: Option<f64>,

    /// Largest absolute coordinate after rescaling
    pub scale: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            iterations: 50,
            threshold: 1e-4,
            k: None,
            scale: 1.0,
        }
    }
}

/// Default configuration for the analytics engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub centrality: CentralityConfig,
    pub cluster: ClusterConfig,
    pub layout: LayoutConfig,
}

impl Config {
    /// Read a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Use one seed for every randomized step
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.cluster.seed = seed;
        self.layout.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"centrality": {"katz_alpha": 0.05}, "layout": {"iterations": 10}}"#)
                .unwrap();

        assert_eq!(config.centrality.katz_alpha, 0.05);
        assert_eq!(config.centrality.katz_max_iter, 1000);
        assert_eq!(config.layout.iterations, 10);
        assert_eq!(config.cluster, ClusterConfig::default());
    }

    #[test]
    fn seed_applies_everywhere() {
        let config = Config::default().with_seed(7);
        assert_eq!(config.cluster.seed, 7);
        assert_eq!(config.layout.seed, 7);
    }

    #[test]
    fn closeness_direction_uses_kebab_case() {
        let json = serde_json::to_string(&ClosenessDirection::Incoming).unwrap();
        assert_eq!(json, "\"incoming\"");
    }
}
