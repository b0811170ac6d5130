use thiserror::Error;

/// Failures of the data layer.
#[derive(Debug, Error)]
pub enum DataError {
    /// The source could not be read at all (missing file, network failure,
    /// non-success HTTP status).
    #[error("data source '{origin}' is unavailable: {reason}")]
    Unavailable { origin: String, reason: String },

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

impl DataError {
    pub fn unavailable(origin: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        DataError::Unavailable {
            origin: origin.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(row: usize, reason: impl std::fmt::Display) -> Self {
        DataError::MalformedRow {
            row,
            reason: reason.to_string(),
        }
    }
}
