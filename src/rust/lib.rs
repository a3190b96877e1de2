//! A draw-and-guess widget: freehand strokes on a 280×280 canvas are reduced to a
//! 28×28 grayscale tensor and classified by a pre-trained ONNX model.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use doodle::{preprocess, DrawingSurface, StrokeCapture, StrokePoint};
//!
//! let mut surface = DrawingSurface::new();
//! let mut capture = StrokeCapture::new();
//!
//! capture.on_pointer_down(&mut surface, StrokePoint::new(100.0, 100.0));
//! capture.on_pointer_move(&mut surface, StrokePoint::new(180.0, 100.0), true);
//! capture.on_pointer_move(&mut surface, StrokePoint::new(180.0, 180.0), false);
//!
//! let tensor = preprocess(&surface)?;
//! assert_eq!(tensor.shape(), &[1, 28, 28, 1]);
//! # Ok(())
//! # }
//! ```
//!
//! # Widget
//!
//! [`DoodleWidget`] ties capture, preprocessing and prediction together. It
//! stays inert until a model is attached, and ignores predict requests while
//! one is already running:
//!
//! ```rust
//! # use std::sync::Arc;
//! # use doodle::{DoodleError, InferenceModel, InputTensor};
//! use doodle::{DoodleWidget, PredictOutcome, SkipReason, StrokePoint};
//!
//! # #[derive(Debug)]
//! # struct AlwaysApple;
//! # impl InferenceModel for AlwaysApple {
//! #     fn infer(&self, _: &InputTensor) -> Result<Vec<f32>, DoodleError> {
//! #         let mut p = vec![0.0; 10];
//! #         p[2] = 1.0;
//! #         Ok(p)
//! #     }
//! # }
//! let mut widget = DoodleWidget::default();
//! widget.on_pointer_down(StrokePoint::new(140.0, 140.0));
//!
//! let outcome = widget.predict_blocking();
//! assert_eq!(outcome, PredictOutcome::Skipped(SkipReason::ModelUnavailable));
//!
//! widget.attach_model(Arc::new(AlwaysApple));
//! widget.predict_blocking();
//! assert_eq!(widget.view().results.unwrap().label, "apple");
//! ```

pub mod canvas;
pub mod config;
mod error;
pub mod host;
pub mod model_manager;
pub mod predictor;
pub mod presentation;
mod runtime;
pub mod widget;

pub use canvas::{DrawingSurface, StrokeCapture, StrokePoint, StrokeStyle};
pub use config::WidgetConfig;
pub use error::DoodleError;
pub use host::{run_event_loop, HostEvent};
pub use model_manager::{ModelManager, ModelManagerError, ModelSource};
pub use predictor::{
    load_model, preprocess, ClassVocabulary, InferenceModel, InputTensor, OnnxModel,
    PredictionResult, Predictor, Preprocessor, ResizeFilter,
};
pub use presentation::{ClassBar, ResultsPanel, WidgetView};
pub use runtime::{create_session_builder, OptimizationLevel, RuntimeConfig};
pub use widget::{
    DoodleWidget, PredictOutcome, PredictStart, PredictionJob, SkipReason, WidgetEvent,
};

pub fn init_logger() {
    env_logger::init();
}
