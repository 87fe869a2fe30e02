//! Error types for the estimation-stats library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum EstimationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File format not supported: {} (expected .txt, .tsv or .csv)", path.display())]
    UnsupportedFormat { path: PathBuf },

    #[error("Missing column '{0}'")]
    MissingColumn(String),

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(
        "None of the requested entities {requested:?} were found in the '{index_column}' column"
    )]
    NoMatch {
        index_column: String,
        requested: Vec<String>,
        /// Leading identifier values of the index column, for diagnostics.
        observed_sample: Vec<String>,
    },

    #[error("Entity '{entity}' has {found} usable condition(s) {conditions:?}, need at least 2")]
    InsufficientConditions {
        entity: String,
        found: usize,
        conditions: Vec<String>,
    },

    #[error("Condition '{condition}' of entity '{entity}' has {n} observation(s), need at least 2")]
    InsufficientSample {
        entity: String,
        condition: String,
        n: usize,
    },

    #[error(
        "Non-finite value {value} for entity '{entity}', condition '{condition}', sample '{sample}'"
    )]
    NonFiniteValue {
        entity: String,
        condition: String,
        sample: String,
        value: f64,
    },

    #[error("No comparison could be estimated for entity '{entity}'")]
    NoEstimates { entity: String },

    #[error("Rendering failed for entity '{entity}': {reason}")]
    Render { entity: String, reason: String },

    #[error("Writing {} failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Box<EstimationError>,
    },
}

impl EstimationError {
    /// Whether this error stops the whole run rather than a single entity.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            EstimationError::NoMatch { .. }
                | EstimationError::InsufficientConditions { .. }
                | EstimationError::InsufficientSample { .. }
                | EstimationError::NonFiniteValue { .. }
                | EstimationError::NoEstimates { .. }
                | EstimationError::Render { .. }
                | EstimationError::Write { .. }
        )
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: EstimationError) -> Self {
        EstimationError::Write {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, EstimationError>;
