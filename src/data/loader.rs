//! CSV and Parquet adjacency matrix loading

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use polars::prelude::*;

use crate::graph::{AdjacencyMatrix, Cell};

/// Supported input formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixFormat {
    Csv,
    Parquet,
}

impl MatrixFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        match extension.as_deref() {
            Some("csv") | Some("txt") => Ok(MatrixFormat::Csv),
            Some("parquet") | Some("pq") => Ok(MatrixFormat::Parquet),
            _ => Err(anyhow!(
                "Unsupported matrix file {} (expected .csv or .parquet)",
                path.display()
            )),
        }
    }
}

/// Read a labelled adjacency matrix from `path`.
///
/// The first column holds the row labels and the header row holds the
/// column labels. Labels are read as strings whatever their type in the
/// file. Cells are not validated here; see `Graph::from_matrix`.
pub fn load_matrix<P: AsRef<Path>>(path: P) -> Result<AdjacencyMatrix> {
    let path = path.as_ref();
    log::info!("Reading adjacency matrix: {}", path.display());

    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    let df = match MatrixFormat::from_path(path)? {
        MatrixFormat::Csv => read_csv(path)?,
        MatrixFormat::Parquet => LazyFrame::scan_parquet(path, Default::default())?
            .collect()
            .with_context(|| format!("reading parquet file {}", path.display()))?,
    };

    log::debug!("File schema: {:?}", df.schema());
    let matrix = frame_to_matrix(&df)?;
    log::info!(
        "Loaded {} x {} matrix",
        matrix.row_count(),
        matrix.column_labels.len()
    );
    Ok(matrix)
}

fn read_csv(path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .with_context(|| format!("reading csv file {}", path.display()))?;
    Ok(df)
}

/// Convert a loaded frame (label column first) into an adjacency matrix
pub fn frame_to_matrix(df: &DataFrame) -> Result<AdjacencyMatrix> {
    let columns = df.get_columns();
    let Some((label_column, value_columns)) = columns.split_first() else {
        return Ok(AdjacencyMatrix::new(Vec::new(), Vec::new(), Vec::new()));
    };

    let labels = label_column.cast(&DataType::String)?;
    let row_labels = labels
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, label)| {
            label
                .map(str::to_string)
                .ok_or_else(|| anyhow!("Row {} has no label", row + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let column_labels: Vec<String> = value_columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<Cell>> = vec![Vec::with_capacity(value_columns.len()); df.height()];
    for column in value_columns {
        let values = column_cells(column)
            .with_context(|| format!("reading column {:?}", column.name().as_str()))?;
        for (row, cell) in cells.iter_mut().zip(values) {
            row.push(cell);
        }
    }

    Ok(AdjacencyMatrix::new(row_labels, column_labels, cells))
}

/// Cells of one column; text columns stay text so that bad values can be
/// reported by the graph builder
fn column_cells(column: &Column) -> Result<Vec<Cell>> {
    if matches!(column.dtype(), DataType::String) {
        return Ok(column
            .str()?
            .into_iter()
            .map(|value| value.map_or(Cell::Missing, Cell::from))
            .collect());
    }

    let numbers = column.cast(&DataType::Float64)?;
    Ok(numbers
        .f64()?
        .into_iter()
        .map(|value| value.map_or(Cell::Missing, Cell::Number))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            MatrixFormat::from_path(Path::new("m.CSV")).unwrap(),
            MatrixFormat::Csv
        );
        assert_eq!(
            MatrixFormat::from_path(Path::new("m.parquet")).unwrap(),
            MatrixFormat::Parquet
        );
        assert!(MatrixFormat::from_path(Path::new("m.xlsx")).is_err());
    }

    #[test]
    fn frame_columns_become_cells() {
        let df = df!(
            "" => ["A", "B"],
            "A" => [0.0, 1.0],
            "B" => ["2", "x"],
        )
        .unwrap();
        let matrix = frame_to_matrix(&df).unwrap();

        assert_eq!(matrix.row_labels, vec!["A", "B"]);
        assert_eq!(matrix.column_labels, vec!["A", "B"]);
        assert_eq!(matrix.cells[0], vec![Cell::Number(0.0), Cell::Text("2".into())]);
        assert_eq!(matrix.cells[1], vec![Cell::Number(1.0), Cell::Text("x".into())]);
    }
}
