//! Wide measurement table: one row per entity, one column per sample.

use crate::data::table::DelimitedTable;
use crate::error::{EstimationError, Result};
use std::collections::HashSet;
use std::path::Path;

/// Tokens read as a missing measurement (compared case-insensitively).
const MISSING_TOKENS: &[&str] = &["", "na", "nan", "n/a", "null", "none", "-nan"];

/// A single parsed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// A numeric measurement.
    Number(f64),
    /// An empty or NA-like cell.
    Missing,
    /// Text that is neither numeric nor a missing token.
    Text(String),
}

impl Cell {
    /// Parse a raw text cell.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_TOKENS
            .iter()
            .any(|token| trimmed.eq_ignore_ascii_case(token))
        {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_nan() => Cell::Missing,
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed.to_string()),
        }
    }

    /// The numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if !v.is_nan() => Cell::Number(v),
            _ => Cell::Missing,
        }
    }
}

/// Measurements keyed by an entity identifier column.
///
/// Every column other than the index column is a candidate sample column;
/// which of them take part in an analysis is decided by the sample
/// annotation. Identifiers need not be unique.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    index_column: String,
    entity_ids: Vec<String>,
    sample_ids: Vec<String>,
    /// Row-major cells (entities × samples).
    cells: Vec<Vec<Cell>>,
}

impl MeasurementTable {
    /// Build a table from identifiers and per-row values.
    pub fn new(
        index_column: &str,
        sample_ids: Vec<String>,
        rows: Vec<(String, Vec<Cell>)>,
    ) -> Result<Self> {
        let n_samples = sample_ids.len();
        let mut entity_ids = Vec::with_capacity(rows.len());
        let mut cells = Vec::with_capacity(rows.len());
        for (entity, row) in rows {
            if row.len() != n_samples {
                return Err(EstimationError::InvalidParameter(format!(
                    "Row '{}' has {} values, expected {}",
                    entity,
                    row.len(),
                    n_samples
                )));
            }
            entity_ids.push(entity);
            cells.push(row);
        }
        Ok(Self {
            index_column: index_column.to_string(),
            entity_ids,
            sample_ids,
            cells,
        })
    }

    /// Convenience constructor from optional numeric values.
    pub fn from_values(
        index_column: &str,
        sample_ids: &[&str],
        rows: Vec<(&str, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        Self::new(
            index_column,
            sample_ids.iter().map(|s| s.to_string()).collect(),
            rows.into_iter()
                .map(|(entity, values)| {
                    (
                        entity.to_string(),
                        values.into_iter().map(Cell::from).collect(),
                    )
                })
                .collect(),
        )
    }

    /// Interpret a delimited table, using `index_column` as the identifier.
    pub fn from_table(table: &DelimitedTable, index_column: &str) -> Result<Self> {
        let index_pos = table
            .column_index(index_column)
            .ok_or_else(|| EstimationError::MissingColumn(index_column.to_string()))?;

        let sample_positions: Vec<usize> =
            (0..table.n_columns()).filter(|&i| i != index_pos).collect();
        let sample_ids = sample_positions
            .iter()
            .map(|&i| table.headers()[i].clone())
            .collect();

        let rows = table
            .rows()
            .iter()
            .map(|row| {
                let entity = row[index_pos].clone();
                let values = sample_positions.iter().map(|&i| Cell::parse(&row[i])).collect();
                (entity, values)
            })
            .collect();

        Self::new(index_column, sample_ids, rows)
    }

    /// Load from a `.txt`, `.tsv` or `.csv` file.
    pub fn from_path<P: AsRef<Path>>(path: P, index_column: &str) -> Result<Self> {
        let table = DelimitedTable::from_path(path)?;
        Self::from_table(&table, index_column)
    }

    /// Name of the identifier column.
    pub fn index_column(&self) -> &str {
        &self.index_column
    }

    /// Identifier of every row, in file order.
    pub fn entity_ids(&self) -> &[String] {
        &self.entity_ids
    }

    /// Non-index column names, in file order.
    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    /// Number of rows.
    pub fn n_entities(&self) -> usize {
        self.entity_ids.len()
    }

    /// Number of non-index columns.
    pub fn n_samples(&self) -> usize {
        self.sample_ids.len()
    }

    /// Number of distinct identifiers.
    pub fn n_unique_entities(&self) -> usize {
        self.entity_ids
            .iter()
            .filter(|id| !id.is_empty())
            .collect::<HashSet<_>>()
            .len()
    }

    /// The first `n` identifiers, for diagnostics.
    pub fn head_ids(&self, n: usize) -> Vec<String> {
        self.entity_ids.iter().take(n).cloned().collect()
    }

    /// Position of a sample column.
    pub fn sample_position(&self, sample: &str) -> Option<usize> {
        self.sample_ids.iter().position(|s| s == sample)
    }

    /// Cell at (row, sample column).
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[row][col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::DelimitedFormat;

    #[test]
    fn test_cell_parsing() {
        assert_eq!(Cell::parse("1.5"), Cell::Number(1.5));
        assert_eq!(Cell::parse(" 2e3 "), Cell::Number(2000.0));
        assert_eq!(Cell::parse(""), Cell::Missing);
        assert_eq!(Cell::parse("NA"), Cell::Missing);
        assert_eq!(Cell::parse("NaN"), Cell::Missing);
        assert_eq!(Cell::parse("n/a"), Cell::Missing);
        assert_eq!(Cell::parse("high"), Cell::Text("high".to_string()));
    }

    #[test]
    fn test_index_column_anywhere() {
        let data = "Gene\tS1\tProtein\tS2\nG1\t1\tP1\t2\nG2\t3\tP2\tNA\n";
        let table = DelimitedTable::from_reader(data.as_bytes(), DelimitedFormat::Tab).unwrap();
        let mt = MeasurementTable::from_table(&table, "Protein").unwrap();

        assert_eq!(mt.entity_ids(), &["P1", "P2"]);
        assert_eq!(mt.sample_ids(), &["Gene", "S1", "S2"]);
        let s2 = mt.sample_position("S2").unwrap();
        assert_eq!(mt.cell(0, s2), &Cell::Number(2.0));
        assert_eq!(mt.cell(1, s2), &Cell::Missing);
    }

    #[test]
    fn test_entity_ids_are_kept_verbatim() {
        let data = "Protein,S1\n P1,1\nP2 ,2\n";
        let table = DelimitedTable::from_reader(data.as_bytes(), DelimitedFormat::Comma).unwrap();
        let mt = MeasurementTable::from_table(&table, "Protein").unwrap();
        assert_eq!(mt.entity_ids(), &[" P1", "P2 "]);
    }

    #[test]
    fn test_missing_index_column() {
        let data = "A,B\n1,2\n";
        let table = DelimitedTable::from_reader(data.as_bytes(), DelimitedFormat::Comma).unwrap();
        let result = MeasurementTable::from_table(&table, "Protein");
        assert!(matches!(result, Err(EstimationError::MissingColumn(c)) if c == "Protein"));
    }

    #[test]
    fn test_unique_and_head() {
        let mt = MeasurementTable::from_values(
            "Protein",
            &["S1"],
            vec![
                ("P1", vec![Some(1.0)]),
                ("P1", vec![Some(2.0)]),
                ("P2", vec![None]),
            ],
        )
        .unwrap();
        assert_eq!(mt.n_unique_entities(), 2);
        assert_eq!(mt.head_ids(2), vec!["P1", "P1"]);
    }
}
