use thiserror::Error;

/// Result type for resolution operations.
pub type Result<T> = std::result::Result<T, ResolutionError>;

/// Errors raised by the resolution core.
///
/// Configuration and data-shape errors are fatal to a run: no partial result
/// is returned. Undefined metrics are normally reported as `None` and only
/// surface here through the checked accessors on `ConfusionCounts`.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// Unknown method name, threshold outside [0,1], zero workers, etc.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Input data does not have the shape the core requires.
    #[error("data shape error in {dataset} (row {row}): {message}")]
    DataShape {
        dataset: String,
        row: usize,
        message: String,
    },

    /// A metric was requested whose denominator is zero.
    #[error("metric undefined: {0}")]
    UndefinedMetric(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ResolutionError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        ResolutionError::Configuration(msg.into())
    }

    pub fn data_shape(dataset: impl Into<String>, row: usize, message: impl Into<String>) -> Self {
        ResolutionError::DataShape {
            dataset: dataset.into(),
            row,
            message: message.into(),
        }
    }
}
