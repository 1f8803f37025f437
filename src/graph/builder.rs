//! Graph construction module

use std::collections::{HashMap, HashSet};

use crate::error::{EngineError, EngineResult};
use crate::graph::compressed::CompressedAdjacency;
use crate::graph::matrix::AdjacencyMatrix;
use crate::graph::Graph;

/// Builder for incrementally constructing a [`Graph`]
pub struct GraphBuilder {
    /// Mapping from labels to node indices
    id_to_index: HashMap<String, u32>,

    /// Node labels in insertion order
    node_ids: Vec<String>,

    /// Outgoing adjacency lists; for undirected graphs each edge is kept
    /// once under its lower endpoint
    adjacency_lists: Vec<Vec<(u32, f64)>>,

    directed: bool,
}

impl GraphBuilder {
    /// Create a new graph builder with the given capacity
    pub fn with_capacity(capacity: usize, directed: bool) -> Self {
        Self {
            id_to_index: HashMap::with_capacity(capacity),
            node_ids: Vec::with_capacity(capacity),
            adjacency_lists: Vec::with_capacity(capacity),
            directed,
        }
    }

    /// Register a node; labels must be unique
    pub fn add_node(&mut self, label: &str) -> EngineResult<u32> {
        if self.id_to_index.contains_key(label) {
            return Err(EngineError::Shape(format!("duplicate node label {label:?}")));
        }

        let idx = self.node_ids.len() as u32;
        self.id_to_index.insert(label.to_string(), idx);
        self.node_ids.push(label.to_string());
        self.adjacency_lists.push(Vec::new());

        Ok(idx)
    }

    pub fn node_index(&self, label: &str) -> Option<u32> {
        self.id_to_index.get(label).copied()
    }

    /// Add an edge between two registered nodes.
    ///
    /// Repeated edges between the same endpoints are merged on build, keeping
    /// the larger weight.
    pub fn add_edge(&mut self, src: u32, dst: u32, weight: f64) {
        let (src, dst) = if self.directed {
            (src, dst)
        } else {
            (src.min(dst), src.max(dst))
        };
        self.adjacency_lists[src as usize].push((dst, weight));
    }

    /// Build the graph
    pub fn build(mut self) -> Graph {
        let node_count = self.node_ids.len();

        for list in &mut self.adjacency_lists {
            merge_parallel_edges(list);
        }
        let edge_count = self.adjacency_lists.iter().map(Vec::len).sum();

        let (outgoing, incoming) = if self.directed {
            let mut reversed: Vec<Vec<(u32, f64)>> = vec![Vec::new(); node_count];
            for (src, list) in self.adjacency_lists.iter().enumerate() {
                for &(dst, weight) in list {
                    reversed[dst as usize].push((src as u32, weight));
                }
            }
            (
                CompressedAdjacency::from_lists(&self.adjacency_lists),
                CompressedAdjacency::from_lists(&reversed),
            )
        } else {
            let mut symmetric = self.adjacency_lists.clone();
            for (src, list) in self.adjacency_lists.iter().enumerate() {
                for &(dst, weight) in list {
                    if dst as usize != src {
                        symmetric[dst as usize].push((src as u32, weight));
                    }
                }
            }
            let adjacency = CompressedAdjacency::from_lists(&symmetric);
            (adjacency.clone(), adjacency)
        };

        Graph {
            labels: self.node_ids,
            index: self.id_to_index,
            outgoing,
            incoming,
            directed: self.directed,
            edge_count,
        }
    }
}

fn merge_parallel_edges(list: &mut Vec<(u32, f64)>) {
    list.sort_by_key(|&(target, _)| target);
    list.dedup_by(|next, kept| {
        if next.0 == kept.0 {
            kept.1 = kept.1.max(next.1);
            true
        } else {
            false
        }
    });
}

impl Graph {
    /// Build a directed graph from a labelled adjacency matrix.
    ///
    /// A non-zero cell `[r, c]` becomes the edge `r -> c`. Columns may be in a
    /// different order from the rows; they are matched by label.
    pub fn from_matrix(matrix: &AdjacencyMatrix) -> EngineResult<Graph> {
        let n = matrix.row_labels.len();

        if matrix.row_count() != n {
            return Err(EngineError::Shape(format!(
                "{} row labels for {} rows",
                n,
                matrix.row_count()
            )));
        }
        if matrix.column_labels.len() != n {
            return Err(EngineError::Shape(format!(
                "matrix is not square: {} rows x {} columns",
                n,
                matrix.column_labels.len()
            )));
        }
        if let Some((r, row)) = matrix.cells.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(EngineError::Shape(format!(
                "row {:?} has {} cells, expected {}",
                matrix.row_labels[r],
                row.len(),
                n
            )));
        }

        let mut column_position: HashMap<&str, usize> = HashMap::with_capacity(n);
        for (c, label) in matrix.column_labels.iter().enumerate() {
            if column_position.insert(label.as_str(), c).is_some() {
                return Err(EngineError::Shape(format!("duplicate column label {label:?}")));
            }
        }
        let row_set: HashSet<&str> = matrix.row_labels.iter().map(String::as_str).collect();
        if let Some(missing) = matrix
            .column_labels
            .iter()
            .find(|label| !row_set.contains(label.as_str()))
        {
            return Err(EngineError::Shape(format!(
                "column label {missing:?} has no matching row"
            )));
        }

        let mut builder = GraphBuilder::with_capacity(n, true);
        for label in &matrix.row_labels {
            builder.add_node(label)?;
        }

        for (r, row) in matrix.cells.iter().enumerate() {
            for (target, label) in matrix.row_labels.iter().enumerate() {
                let cell = &row[column_position[label.as_str()]];
                let weight = match cell.as_number() {
                    Some(value) if value.is_finite() => value,
                    _ => {
                        return Err(EngineError::Type {
                            row: matrix.row_labels[r].clone(),
                            column: label.clone(),
                            value: cell.describe(),
                        })
                    }
                };
                if weight != 0.0 {
                    builder.add_edge(r as u32, target as u32, weight);
                }
            }
        }

        let graph = builder.build();
        log::debug!(
            "Built graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::matrix::Cell;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn zero_cells_are_not_edges() {
        let matrix = AdjacencyMatrix::from_rows(
            &["A", "B", "C"],
            vec![
                vec![0.0, 1.0, 0.0],
                vec![0.0, 0.0, 2.5],
                vec![0.0, 0.0, 0.0],
            ],
        );
        let graph = Graph::from_matrix(&matrix).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.weight(1, 2), Some(2.5));
        assert_eq!(graph.weight(2, 1), None);
    }

    #[test]
    fn self_loops_come_from_the_diagonal() {
        let matrix = AdjacencyMatrix::from_rows(&["A", "B"], vec![vec![3.0, 0.0], vec![1.0, 0.0]]);
        let graph = Graph::from_matrix(&matrix).unwrap();

        assert_eq!(graph.weight(0, 0), Some(3.0));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn columns_are_matched_by_label() {
        let matrix = AdjacencyMatrix::new(
            labels(&["A", "B"]),
            labels(&["B", "A"]),
            vec![
                vec![Cell::Number(5.0), Cell::Number(0.0)],
                vec![Cell::Number(0.0), Cell::Number(7.0)],
            ],
        );
        let graph = Graph::from_matrix(&matrix).unwrap();

        assert_eq!(graph.weight(0, 1), Some(5.0));
        assert_eq!(graph.weight(1, 0), Some(7.0));
    }

    #[test]
    fn non_square_matrix_is_a_shape_error() {
        let matrix = AdjacencyMatrix::new(
            labels(&["A", "B"]),
            labels(&["A", "B", "C"]),
            vec![vec![Cell::Number(0.0); 3], vec![Cell::Number(0.0); 3]],
        );
        assert!(matches!(Graph::from_matrix(&matrix), Err(EngineError::Shape(_))));
    }

    #[test]
    fn mismatched_labels_are_a_shape_error() {
        let matrix = AdjacencyMatrix::new(
            labels(&["A", "B"]),
            labels(&["A", "C"]),
            vec![vec![Cell::Number(0.0); 2]; 2],
        );
        assert!(matches!(Graph::from_matrix(&matrix), Err(EngineError::Shape(_))));
    }

    #[test]
    fn duplicate_labels_are_a_shape_error() {
        let matrix = AdjacencyMatrix::from_rows(&["A", "A"], vec![vec![0.0; 2]; 2]);
        assert!(matches!(Graph::from_matrix(&matrix), Err(EngineError::Shape(_))));
    }

    #[test]
    fn text_cells_must_parse_as_numbers() {
        let mut matrix = AdjacencyMatrix::from_rows(&["A", "B"], vec![vec![0.0; 2]; 2]);
        matrix.cells[0][1] = Cell::from(" 4 ");
        let graph = Graph::from_matrix(&matrix).unwrap();
        assert_eq!(graph.weight(0, 1), Some(4.0));

        matrix.cells[1][0] = Cell::from("heavy");
        match Graph::from_matrix(&matrix) {
            Err(EngineError::Type { row, column, value }) => {
                assert_eq!(row, "B");
                assert_eq!(column, "A");
                assert_eq!(value, "heavy");
            }
            other => panic!("expected type error, got {other:?}"),
        }
    }

    #[test]
    fn missing_cells_are_type_errors() {
        let mut matrix = AdjacencyMatrix::from_rows(&["A", "B"], vec![vec![0.0; 2]; 2]);
        matrix.cells[1][1] = Cell::Missing;
        assert!(matches!(Graph::from_matrix(&matrix), Err(EngineError::Type { .. })));
    }

    #[test]
    fn undirected_builder_merges_with_max_weight() {
        let mut builder = GraphBuilder::with_capacity(2, false);
        let a = builder.add_node("A").unwrap();
        let b = builder.add_node("B").unwrap();
        builder.add_edge(a, b, 1.0);
        builder.add_edge(b, a, 4.0);
        let graph = builder.build();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.weight(0, 1), Some(4.0));
        assert_eq!(graph.weight(1, 0), Some(4.0));
    }
}
