use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::model::InferenceModel;
use super::tensor::{InputTensor, TensorLedger};
use super::utils::argmax;
use super::vocabulary::ClassVocabulary;
use crate::error::DoodleError;

/// The outcome of one inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// One probability per class, in vocabulary order, exactly as the model returned them
    pub probabilities: Vec<f32>,
    /// Index of the highest probability (lowest index on ties)
    pub index: usize,
}

impl PredictionResult {
    pub fn from_probabilities(probabilities: Vec<f32>) -> Result<Self, DoodleError> {
        let index = argmax(&probabilities).ok_or_else(|| {
            DoodleError::PredictionError("Model returned no comparable probabilities".into())
        })?;
        Ok(Self { probabilities, index })
    }

    /// Probability of the winning class, or `None` if `index` is out of range
    pub fn confidence(&self) -> Option<f32> {
        self.probabilities.get(self.index).copied()
    }

    pub fn label<'a>(&self, vocabulary: &'a ClassVocabulary) -> Option<&'a str> {
        vocabulary.get(self.index)
    }
}

/// Runs a loaded model over input tensors and interprets the output.
///
/// Every tensor allocated for a call is leased from the predictor's
/// [`TensorLedger`] and released when the call returns, on success and on
/// every error path alike.
///
/// ```rust
/// # use std::sync::Arc;
/// # use doodle::{ClassVocabulary, DoodleError, InferenceModel, InputTensor, Predictor};
/// #[derive(Debug)]
/// struct Fixed;
///
/// impl InferenceModel for Fixed {
///     fn infer(&self, _input: &InputTensor) -> Result<Vec<f32>, DoodleError> {
///         Ok(vec![0.2, 0.8])
///     }
/// }
///
/// # fn main() -> Result<(), DoodleError> {
/// let predictor = Predictor::new(Arc::new(Fixed), ClassVocabulary::new(vec!["a", "b"])?);
/// let result = predictor.predict(InputTensor::from_vec(vec![0.0; 784])?)?;
/// assert_eq!(result.index, 1);
/// assert_eq!(predictor.live_tensors(), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Predictor {
    model: Arc<dyn InferenceModel>,
    vocabulary: ClassVocabulary,
    ledger: TensorLedger,
}

impl Predictor {
    pub fn new(model: Arc<dyn InferenceModel>, vocabulary: ClassVocabulary) -> Self {
        Self {
            model,
            vocabulary,
            ledger: TensorLedger::new(),
        }
    }

    pub fn vocabulary(&self) -> &ClassVocabulary {
        &self.vocabulary
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Number of tensors currently allocated by in-flight calls
    pub fn live_tensors(&self) -> usize {
        self.ledger.live()
    }

    pub fn ledger(&self) -> &TensorLedger {
        &self.ledger
    }

    /// Runs inference on `tensor` and returns the probabilities with their arg-max.
    ///
    /// # Errors
    /// - Any error from the model's inference entry point
    /// - `PredictionError` if the output width differs from the vocabulary length
    /// - `PredictionError` if no output value is comparable
    pub fn predict(&self, tensor: InputTensor) -> Result<PredictionResult, DoodleError> {
        let input = self.ledger.track("input", tensor);
        let output = self.ledger.track("output", self.model.infer(&input)?);

        if output.len() != self.vocabulary.len() {
            return Err(DoodleError::PredictionError(format!(
                "Model returned {} values but the vocabulary has {} classes",
                output.len(),
                self.vocabulary.len()
            )));
        }

        PredictionResult::from_probabilities(output.to_vec())
    }
}
