//! Results persistence module

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, to_string_pretty};
use statrs::statistics::{Data, Median, Statistics};

use crate::centrality::CentralityResult;
use crate::cluster::metrics::{summarize, PartitionSummary};
use crate::cluster::Partition;
use crate::graph::Graph;
use crate::layout::Layout;

/// Descriptive statistics of one score map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; absent for fewer than two scores
    pub std_dev: Option<f64>,
}

impl ScoreStats {
    /// Statistics of `scores`; `None` when there are none
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }

        let std_dev = if scores.len() > 1 {
            Some(Statistics::std_dev(scores.iter()))
        } else {
            None
        };

        Some(Self {
            count: scores.len(),
            min: Statistics::min(scores.iter()),
            max: Statistics::max(scores.iter()),
            mean: Statistics::mean(scores.iter()),
            median: Data::new(scores.to_vec()).median(),
            std_dev,
        })
    }
}

/// Everything one run produced, as passed to [`save_results`]
pub struct AnalysisResults<'a> {
    pub graph: &'a Graph,
    pub centrality: &'a CentralityResult,
    pub partition: &'a Partition,
    pub layout: &'a Layout,
}

/// Save analysis results to the specified directory
pub fn save_results(results: &AnalysisResults<'_>, output_dir: &Path) -> Result<()> {
    log::info!("Saving results to {}", output_dir.display());

    // Ensure output directory exists
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    write_json(&output_dir.join("centrality.json"), results.centrality)?;
    write_json(&output_dir.join("layout.json"), results.layout)?;

    let communities = summarize(results.graph, results.partition);
    save_partition(results.partition, &communities, output_dir)?;
    save_summary(results, &communities, output_dir)?;

    log::info!("Results saved successfully");

    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    file.write_all(to_string_pretty(value)?.as_bytes())?;
    Ok(())
}

/// Save the node assignment together with per-community metrics
fn save_partition(
    partition: &Partition,
    communities: &PartitionSummary,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving {} communities", communities.community_count);

    let partition_json = json!({
        "method": partition.method,
        "communities": partition.communities,
        "summary": communities,
    });

    write_json(&output_dir.join("partition.json"), &partition_json)
}

/// Save summary information
fn save_summary(
    results: &AnalysisResults<'_>,
    communities: &PartitionSummary,
    output_dir: &Path,
) -> Result<()> {
    log::info!("Saving summary information");

    let graph = results.graph;
    let scores: Vec<f64> = results.centrality.scores.values().copied().collect();
    let sizes: Vec<usize> = communities.communities.iter().map(|c| c.size).collect();
    let top_nodes: Vec<_> = results
        .centrality
        .ranking()
        .into_iter()
        .take(10)
        .map(|(label, score)| json!({ "node": label, "score": score }))
        .collect();

    let summary = json!({
        "graph_stats": {
            "node_count": graph.node_count(),
            "edge_count": graph.edge_count(),
            "undirected_edge_count": graph.to_undirected().edge_count(),
            "avg_out_degree": if graph.node_count() == 0 {
                0.0
            } else {
                graph.edge_count() as f64 / graph.node_count() as f64
            },
        },
        "centrality": {
            "method": results.centrality.method,
            "stats": ScoreStats::from_scores(&scores),
            "top_nodes": top_nodes,
        },
        "communities": {
            "method": results.partition.method,
            "community_count": communities.community_count,
            "modularity": communities.modularity,
            "largest_community_size": sizes.iter().max().copied().unwrap_or(0),
            "smallest_community_size": sizes.iter().min().copied().unwrap_or(0),
        },
        "layout": {
            "iterations": results.layout.iterations,
            "converged": results.layout.converged,
        },
    });

    write_json(&output_dir.join("summary.json"), &summary)
}
