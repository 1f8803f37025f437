//! Labelled adjacency matrix as handed over by the loader

use serde::{Deserialize, Serialize};

/// A single matrix cell before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Numeric value of the cell; text is accepted when it parses as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            Cell::Text(text) => text.trim().parse::<f64>().ok(),
            Cell::Missing => None,
        }
    }

    /// Printable form used in error messages
    pub fn describe(&self) -> String {
        match self {
            Cell::Number(value) => value.to_string(),
            Cell::Text(text) => text.clone(),
            Cell::Missing => "<missing>".to_string(),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// Square table of cells with row and column headers.
///
/// `cells[r][c]` is the weight of the edge from `row_labels[r]` to
/// `column_labels[c]`. Nothing is validated here; see
/// [`Graph::from_matrix`](crate::graph::Graph::from_matrix).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyMatrix {
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub cells: Vec<Vec<Cell>>,
}

impl AdjacencyMatrix {
    pub fn new(row_labels: Vec<String>, column_labels: Vec<String>, cells: Vec<Vec<Cell>>) -> Self {
        Self {
            row_labels,
            column_labels,
            cells,
        }
    }

    /// Build a matrix whose rows and columns share the same labels
    pub fn from_rows<S: ToString>(labels: &[S], rows: Vec<Vec<f64>>) -> Self {
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let cells = rows
            .into_iter()
            .map(|row| row.into_iter().map(Cell::Number).collect())
            .collect();
        Self::new(labels.clone(), labels, cells)
    }

    /// Build a zero-filled matrix over `labels` and set the listed weights
    pub fn from_edges<S: ToString>(labels: &[S], edges: &[(&str, &str, f64)]) -> Self {
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        let n = labels.len();
        let mut rows = vec![vec![0.0; n]; n];
        for &(src, dst, weight) in edges {
            let r = labels.iter().position(|l| l == src);
            let c = labels.iter().position(|l| l == dst);
            if let (Some(r), Some(c)) = (r, c) {
                rows[r][c] = weight;
            }
        }
        Self::from_rows(&labels, rows)
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }
}
