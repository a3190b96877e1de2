//! Preprocessing and inference: surface to tensor to class probabilities.

pub mod model;
pub mod predictor;
pub mod preprocess;
pub mod tensor;
mod utils;
pub mod vocabulary;

pub use model::{load_model, InferenceModel, OnnxModel};
pub use predictor::{PredictionResult, Predictor};
pub use preprocess::{preprocess, Preprocessor, ResizeFilter};
pub use tensor::{InputTensor, Leased, TensorLease, TensorLedger, INPUT_SHAPE, INPUT_SIZE};
pub use vocabulary::{ClassVocabulary, DEFAULT_CLASS_NAMES};
