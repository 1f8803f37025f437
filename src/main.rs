use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use graph_analytics_engine::centrality::{self, CentralityMethod};
use graph_analytics_engine::cluster::{self, ClusterMethod};
use graph_analytics_engine::config::Config;
use graph_analytics_engine::graph::Graph;
use graph_analytics_engine::storage::{self, AnalysisResults};
use graph_analytics_engine::{data, layout, viz};

#[derive(Parser, Debug)]
#[clap(
    name = "graph-analytics",
    about = "Centrality, community detection and layout for adjacency matrices"
)]
struct Cli {
    /// Path to input CSV or Parquet adjacency matrix
    #[clap(long)]
    input: PathBuf,

    /// Centrality measure (closeness, betweenness, eigenvector, in-degree, out-degree, katz)
    #[clap(long, default_value = "closeness")]
    centrality: CentralityMethod,

    /// Clustering method (louvain, girvan-newman, fast-greedy, label-propagation)
    #[clap(long, default_value = "louvain")]
    clustering: ClusterMethod,

    /// Seed for clustering and layout; overrides the config file
    #[clap(long)]
    seed: Option<u64>,

    /// Layout iterations; overrides the config file
    #[clap(long)]
    layout_iterations: Option<usize>,

    /// JSON configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Output directory for results
    #[clap(long, default_value = "analysis_results")]
    output_dir: PathBuf,

    /// Skip visualizations
    #[clap(long)]
    skip_viz: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn load_config(args: &Cli) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(iterations) = args.layout_iterations {
        config.layout.iterations = iterations;
    }
    Ok(config)
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        // If threads = 0, use all available cores
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let config = load_config(&args)?;

    log::info!("Starting graph analysis");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    // 1. Load data
    let matrix = data::load_matrix(&args.input)?;
    let graph = Graph::from_matrix(&matrix)
        .with_context(|| format!("building graph from {}", args.input.display()))?;

    log::info!(
        "Loaded graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    // 2. The three analyses share nothing but the graph
    let (centrality, (partition, layout)) = rayon::join(
        || centrality::compute(&graph, args.centrality, &config.centrality),
        || {
            rayon::join(
                || cluster::detect(&graph, args.clustering, &config.cluster),
                || layout::layout(&graph, &config.layout),
            )
        },
    );
    let centrality = centrality.context("centrality computation failed")?;
    let partition = partition.context("community detection failed")?;
    let layout = layout.context("layout failed")?;

    log::info!(
        "Found {} communities with {}",
        partition.community_count(),
        args.clustering.title()
    );

    // 3. Save results
    let results = AnalysisResults {
        graph: &graph,
        centrality: &centrality,
        partition: &partition,
        layout: &layout,
    };
    storage::save_results(&results, &args.output_dir)?;

    // 4. Generate visualizations if requested
    if !args.skip_viz {
        viz::generate_visualizations(&graph, &centrality, &partition, &layout, &args.output_dir)?;
    }

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}
