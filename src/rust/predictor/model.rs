use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use ort::session::Session;
use ort::value::Tensor;

use super::tensor::InputTensor;
use crate::error::DoodleError;
use crate::model_manager::{ModelManager, ModelSource};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// The inference entry point of a loaded model.
///
/// Implementations take a (1, 28, 28, 1) input and return the flattened first
/// output, which is expected to be one probability per class.
pub trait InferenceModel: Send + Sync + fmt::Debug {
    fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, DoodleError>;

    /// Short human-readable identifier used in log lines
    fn name(&self) -> &str {
        "model"
    }
}

/// An ONNX graph model executed by ONNX Runtime.
///
/// The model is expected to:
/// - Accept one `f32` input of shape [1, 28, 28, 1]
/// - Produce a first output holding one probability per class
#[derive(Debug)]
pub struct OnnxModel {
    model_path: String,
    input_name: String,
    session: Session,
}

impl OnnxModel {
    /// Loads and validates an ONNX model from disk
    pub fn load(path: impl AsRef<Path>, config: &RuntimeConfig) -> Result<Self, DoodleError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DoodleError::ModelError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = create_session_builder(config)?
            .commit_from_file(path)
            .map_err(|e| {
                error!("Failed to load model from {}: {}", path.display(), e);
                DoodleError::ModelError(format!("Failed to load model: {}", e))
            })?;

        Self::validate_model(&session)?;
        let input_name = session.inputs[0].name.clone();
        info!("Model loaded from {} (input '{}')", path.display(), input_name);

        Ok(Self {
            model_path: path.to_string_lossy().to_string(),
            input_name,
            session,
        })
    }

    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// Checks that the graph has an input to feed and an output to read
    fn validate_model(session: &Session) -> Result<(), DoodleError> {
        if session.inputs.is_empty() {
            return Err(DoodleError::ModelError("Model must have at least 1 input".to_string()));
        }
        if session.outputs.is_empty() {
            return Err(DoodleError::ModelError(
                "Model must have at least 1 output for class probabilities".to_string(),
            ));
        }
        Ok(())
    }
}

impl InferenceModel for OnnxModel {
    fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, DoodleError> {
        let input_dyn = input.as_array().view().into_dyn();
        let input_values = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input_values).map_err(|e| {
                DoodleError::ModelError(format!("Failed to create input tensor: {}", e))
            })?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| DoodleError::ModelError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| {
                DoodleError::ModelError(format!("Failed to extract output tensor: {}", e))
            })?;

        Ok(output_tensor.iter().copied().collect())
    }

    fn name(&self) -> &str {
        &self.model_path
    }
}

/// Resolves `source` to a local file and loads it off the async executor.
///
/// This is the single model load a widget host performs at start-up.
pub async fn load_model(
    source: &ModelSource,
    manager: &ModelManager,
    config: &RuntimeConfig,
) -> Result<Arc<dyn InferenceModel>, DoodleError> {
    info!("Loading model from {}", source);
    let path = manager.resolve(source).await?;
    let config = config.clone();

    let model = tokio::task::spawn_blocking(move || OnnxModel::load(path, &config))
        .await
        .map_err(|e| DoodleError::ModelError(format!("Model loading task failed: {}", e)))??;

    Ok(Arc::new(model))
}
