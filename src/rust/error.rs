use ort::Error as OrtError;
use std::fmt;

/// Represents the different types of errors that can occur in the doodle pipeline.
#[derive(Debug)]
pub enum DoodleError {
    /// No model has finished loading yet, or the load failed
    ModelUnavailable,
    /// The drawing surface could not be turned into an input tensor
    PreprocessError(String),
    /// Error occurred while loading or running the ONNX model
    ModelError(String),
    /// Error occurred while interpreting the model output
    PredictionError(String),
    /// Error occurred due to invalid input parameters
    ValidationError(String),
}

impl fmt::Display for DoodleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelUnavailable => write!(f, "Model unavailable: no model has been loaded"),
            Self::PreprocessError(msg) => write!(f, "Preprocess error: {}", msg),
            Self::ModelError(msg) => write!(f, "Model error: {}", msg),
            Self::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for DoodleError {}

impl From<OrtError> for DoodleError {
    fn from(err: OrtError) -> Self {
        DoodleError::ModelError(err.to_string())
    }
}
