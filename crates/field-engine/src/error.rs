use thiserror::Error;

/// A recognition record that could not be turned into a `TextSpan`.
///
/// Recoverable: the record is dropped and the rest of the batch continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("record {index}: expected a 3-element tuple or an object, found {found}")]
    Shape { index: usize, found: String },

    #[error("record {index}: text is missing or not a string")]
    MissingText { index: usize },

    #[error("record {index}: text is empty")]
    EmptyText { index: usize },

    #[error("record {index}: confidence is not numeric (found {found})")]
    NonNumericConfidence { index: usize, found: String },

    #[error("record {index}: confidence {value} is outside [0, 1]")]
    ConfidenceOutOfRange { index: usize, value: f64 },

    #[error("record {index}: polygon has {found} points, expected 4")]
    PolygonPoints { index: usize, found: usize },

    #[error("record {index}: polygon point {point} is not an (x, y) pair")]
    MalformedPoint { index: usize, point: usize },

    #[error("record {index}: coordinate {found} is not a finite number in pixel range")]
    BadCoordinate { index: usize, found: String },
}

impl NormalizationError {
    /// Position of the offending record in the input batch
    pub fn index(&self) -> usize {
        match self {
            NormalizationError::Shape { index, .. }
            | NormalizationError::MissingText { index }
            | NormalizationError::EmptyText { index }
            | NormalizationError::NonNumericConfidence { index, .. }
            | NormalizationError::ConfidenceOutOfRange { index, .. }
            | NormalizationError::PolygonPoints { index, .. }
            | NormalizationError::MalformedPoint { index, .. }
            | NormalizationError::BadCoordinate { index, .. } => *index,
        }
    }
}

/// Field catalog configuration fault. Raised at load time, never mid-request.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("duplicate field name '{0}'")]
    DuplicateField(String),

    #[error("field name must not be empty")]
    EmptyName,

    #[error("field '{field}': unknown data type '{data_type}'")]
    UnknownDataType { field: String, data_type: String },

    #[error("field '{field}': invalid pattern: {message}")]
    InvalidPattern { field: String, message: String },

    #[error("field '{field}': min_length {min} exceeds max_length {max}")]
    InvalidLength { field: String, min: usize, max: usize },

    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {message}")]
    Parse { path: String, message: String },
}
