use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DoodleError;
use crate::model_manager::ModelSource;
use crate::predictor::{ClassVocabulary, ResizeFilter};
use crate::runtime::RuntimeConfig;

/// Settings for one widget instance.
///
/// Every field has a default, so a config file only needs the keys it changes:
///
/// ```json
/// {
///   "model": { "kind": "path", "path": "model/model.onnx" },
///   "vocabulary": ["cat", "dog", "apple", "banana", "car",
///                  "house", "tree", "bicycle", "fish", "chair"],
///   "resize_filter": "lanczos3",
///   "runtime": { "intra_threads": 2 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub model: ModelSource,
    pub vocabulary: ClassVocabulary,
    pub resize_filter: ResizeFilter,
    pub runtime: RuntimeConfig,
}

impl WidgetConfig {
    /// Reads a JSON config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DoodleError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            DoodleError::ValidationError(format!("Cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, DoodleError> {
        serde_json::from_str(text)
            .map_err(|e| DoodleError::ValidationError(format!("Invalid config: {}", e)))
    }
}
