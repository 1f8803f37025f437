//! Fruchterman-Reingold force-directed layout.
//!
//! Every pair of nodes repels with force `k² / d`, and every edge attracts
//! its endpoints with force `w · d² / k`. Each step moves a node along its
//! net displacement by the current temperature, which cools linearly to zero
//! over the iteration budget. Edge direction is ignored.

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;
use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;

/// Distances and displacements are clamped to this to avoid blow-ups
const MIN_DISTANCE: f64 = 0.01;

/// 2D node positions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub positions: BTreeMap<String, [f64; 2]>,
    /// Iterations actually run
    pub iterations: usize,
    /// Whether the step length dropped below the threshold before the budget ran out
    pub converged: bool,
}

impl Layout {
    pub fn position(&self, label: &str) -> Option<[f64; 2]> {
        self.positions.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Compute a layout for `graph`
pub fn layout(graph: &Graph, config: &LayoutConfig) -> EngineResult<Layout> {
    log::info!(
        "Computing Fruchterman-Reingold layout for {} nodes ({} iterations, seed {})",
        graph.node_count(),
        config.iterations,
        config.seed
    );

    let (positions, iterations, converged) = fruchterman_reingold(graph, config)?;
    let positions = graph
        .labels()
        .iter()
        .cloned()
        .zip(positions.outer_iter().map(|row| [row[0], row[1]]))
        .collect();

    log::debug!("Layout finished after {} iterations (converged: {})", iterations, converged);
    Ok(Layout {
        positions,
        iterations,
        converged,
    })
}

/// Raw positions in node index order, plus iterations run and convergence
pub fn fruchterman_reingold(
    graph: &Graph,
    config: &LayoutConfig,
) -> EngineResult<(Array2<f64>, usize, bool)> {
    let n = graph.node_count();
    match n {
        0 => return Ok((Array2::zeros((0, 2)), 0, true)),
        1 => return Ok((Array2::zeros((1, 2)), 0, true)),
        _ => {}
    }

    let k = match config.k {
        Some(k) if k > 0.0 && k.is_finite() => k,
        Some(k) => {
            return Err(EngineError::Computation(format!(
                "layout spring length must be positive, got {k}"
            )))
        }
        None => (1.0 / n as f64).sqrt(),
    };

    let adjacency = graph.to_undirected().dense_adjacency();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut pos = Array2::from_shape_fn((n, 2), |_| rng.gen::<f64>());

    let extent = |axis: usize| {
        let column = pos.column(axis);
        let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = column.iter().copied().fold(f64::INFINITY, f64::min);
        max - min
    };
    let mut temperature = 0.1 * extent(0).max(extent(1));
    let cooling = temperature / (config.iterations as f64 + 1.0);

    let mut iterations = 0;
    let mut converged = false;
    while iterations < config.iterations {
        iterations += 1;
        let mut step = Array2::<f64>::zeros((n, 2));

        for i in 0..n {
            let mut displacement = Array1::<f64>::zeros(2);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let delta = &pos.row(i) - &pos.row(j);
                let distance = delta.dot(&delta).sqrt().max(MIN_DISTANCE);
                let force = k * k / (distance * distance) - adjacency[[i, j]] * distance / k;
                displacement.scaled_add(force, &delta);
            }

            let length = displacement.dot(&displacement).sqrt();
            let length = if length < MIN_DISTANCE { 0.1 } else { length };
            step.row_mut(i).assign(&(displacement * (temperature / length)));
        }

        pos += &step;
        temperature -= cooling;

        let step_norm = step.iter().map(|v| v * v).sum::<f64>().sqrt();
        if step_norm / (n as f64) < config.threshold {
            converged = true;
            break;
        }
    }

    rescale(&mut pos, config.scale);
    Ok((pos, iterations, converged))
}

/// Centre positions on the origin and scale the largest coordinate to `scale`
fn rescale(pos: &mut Array2<f64>, scale: f64) {
    if let Some(mean) = pos.mean_axis(Axis(0)) {
        *pos -= &mean;
    }
    let limit = pos.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if limit > 0.0 {
        *pos *= scale / limit;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyMatrix;

    fn graph(labels: &[&str], edges: &[(&str, &str, f64)]) -> Graph {
        Graph::from_matrix(&AdjacencyMatrix::from_edges(labels, edges)).unwrap()
    }

    fn square() -> Graph {
        graph(
            &["A", "B", "C", "D"],
            &[("A", "B", 1.0), ("B", "C", 1.0), ("C", "D", 1.0), ("D", "A", 1.0)],
        )
    }

    #[test]
    fn same_seed_same_positions() {
        let config = LayoutConfig::default();
        let first = layout(&square(), &config).unwrap();
        let second = layout(&square(), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn positions_are_centred_and_scaled() {
        let config = LayoutConfig {
            scale: 2.0,
            ..LayoutConfig::default()
        };
        let (pos, _, _) = fruchterman_reingold(&square(), &config).unwrap();

        let mean = pos.mean_axis(Axis(0)).unwrap();
        assert!(mean.iter().all(|m| m.abs() < 1e-12));
        let limit = pos.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        assert!((limit - 2.0).abs() < 1e-12);
    }

    #[test]
    fn connected_nodes_end_closer_than_strangers() {
        // two tight pairs with no link between them
        let g = graph(
            &["A", "B", "C", "D"],
            &[("A", "B", 1.0), ("C", "D", 1.0)],
        );
        let result = layout(&g, &LayoutConfig { iterations: 200, ..LayoutConfig::default() }).unwrap();
        let dist = |a: &str, b: &str| {
            let (p, q) = (result.position(a).unwrap(), result.position(b).unwrap());
            ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2)).sqrt()
        };

        assert!(dist("A", "B") < dist("A", "C"));
        assert!(dist("C", "D") < dist("B", "D"));
    }

    #[test]
    fn tiny_graphs() {
        let empty = Graph::from_matrix(&AdjacencyMatrix::from_rows::<&str>(&[], Vec::new())).unwrap();
        assert!(layout(&empty, &LayoutConfig::default()).unwrap().is_empty());

        let single = graph(&["A"], &[]);
        let result = layout(&single, &LayoutConfig::default()).unwrap();
        assert_eq!(result.position("A"), Some([0.0, 0.0]));
    }

    #[test]
    fn every_node_gets_a_position() {
        let g = square();
        let result = layout(&g, &LayoutConfig::default()).unwrap();
        assert_eq!(result.len(), g.node_count());
        assert!(result
            .positions
            .values()
            .all(|p| p[0].is_finite() && p[1].is_finite()));
    }
}
