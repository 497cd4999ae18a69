use std::error::Error;
use std::fmt;

/// Errors raised by the feature pipeline and model wrappers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictorError {
    /// `predict` was called on an orchestrator that has not been trained.
    NotTrained,
    /// A transform was requested before the feature pipeline was fitted.
    NotFitted,
    /// The input table contains no rows.
    EmptyDataset,
    /// A matrix or label vector does not have the expected length.
    LengthMismatch { expected: usize, actual: usize },
    /// The training labels contain a single outcome class.
    SingleClass,
    /// The training table is missing the outcome column on some rows.
    MissingTarget,
}

impl fmt::Display for PredictorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PredictorError::NotTrained => write!(f, "model is not trained"),
            PredictorError::NotFitted => write!(f, "feature pipeline is not fitted"),
            PredictorError::EmptyDataset => write!(f, "input table contains no rows"),
            PredictorError::LengthMismatch { expected, actual } => {
                write!(f, "length mismatch: expected {}, got {}", expected, actual)
            }
            PredictorError::SingleClass => {
                write!(f, "training labels contain a single outcome class")
            }
            PredictorError::MissingTarget => {
                write!(f, "the employed outcome is missing on some training rows")
            }
        }
    }
}

impl Error for PredictorError {}
