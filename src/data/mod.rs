//! Input loading for adjacency matrices

pub mod loader;

pub use loader::{load_matrix, MatrixFormat};
