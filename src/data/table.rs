//! Delimited text tables with the delimiter chosen by file extension.

use crate::error::{EstimationError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Supported delimited text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelimitedFormat {
    /// Tab-separated (`.txt`, `.tsv`).
    Tab,
    /// Comma-separated (`.csv`).
    Comma,
}

impl DelimitedFormat {
    /// Pick the format from a path's extension.
    ///
    /// `.txt` and `.tsv` are tab-delimited, `.csv` is comma-delimited.
    /// Anything else is rejected with [`EstimationError::UnsupportedFormat`].
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("txt") | Some("tsv") => Ok(Self::Tab),
            Some("csv") => Ok(Self::Comma),
            _ => Err(EstimationError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// The field delimiter byte.
    pub fn delimiter(&self) -> u8 {
        match self {
            Self::Tab => b'\t',
            Self::Comma => b',',
        }
    }
}

/// A rectangular table of text cells with a header row.
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl DelimitedTable {
    /// Create a table from a header and rows, checking that every row has
    /// one cell per header column.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(EstimationError::EmptyData("Table has no header".to_string()));
        }
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(EstimationError::InvalidParameter(format!(
                "Row {} has {} fields, expected {}",
                idx + 1,
                row.len(),
                headers.len()
            )));
        }
        Ok(Self { headers, rows })
    }

    /// Load a table from a `.txt`, `.tsv` or `.csv` file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = DelimitedFormat::from_path(&path)?;
        let file = File::open(path)?;
        Self::from_reader(file, format)
    }

    /// Read a table from any reader using the given format.
    pub fn from_reader<R: Read>(reader: R, format: DelimitedFormat) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter())
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(EstimationError::EmptyData("Table has no header".to_string()));
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        Self::new(headers, rows)
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All data rows.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.headers.len()
    }

    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of a named column, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| EstimationError::MissingColumn(name.to_string()))?;
        Ok(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }
}
