//! Graph analytics engine: centrality, community detection and layout for
//! weighted graphs given as labelled adjacency matrices

pub mod centrality;
pub mod cluster;
pub mod config;
pub mod data;
pub mod error;
pub mod graph;
pub mod layout;
pub mod numeric;
pub mod storage;
pub mod viz;

pub use anyhow::{anyhow, Result};

pub use centrality::{compute, CentralityMethod, CentralityResult};
pub use cluster::{detect, ClusterMethod, Partition};
pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use graph::{AdjacencyMatrix, Cell, Graph};
pub use layout::{layout, Layout};
