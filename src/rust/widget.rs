use std::sync::Arc;

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::canvas::{DrawingSurface, StrokeCapture, StrokePoint};
use crate::config::WidgetConfig;
use crate::error::DoodleError;
use crate::predictor::{
    ClassVocabulary, InferenceModel, InputTensor, PredictionResult, Predictor, Preprocessor,
};
use crate::presentation::WidgetView;

/// A user or host event delivered to the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove {
        x: f32,
        y: f32,
        #[serde(default = "default_primary")]
        primary: bool,
    },
    Predict,
    Clear,
}

fn default_primary() -> bool {
    true
}

/// Why a predict request did not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ModelUnavailable,
    InFlight,
}

/// What a predict request did to the displayed state
#[derive(Debug, Clone, PartialEq)]
pub enum PredictOutcome {
    /// Inference succeeded and the result replaced the previous one
    Updated(PredictionResult),
    /// The request was inert; nothing changed
    Skipped(SkipReason),
    /// Preprocessing failed before inference was invoked
    Aborted(String),
    /// Inference failed; the previous result is still displayed
    Failed(String),
}

/// Result of [`DoodleWidget::begin_predict`]
#[derive(Debug)]
pub enum PredictStart {
    /// Inference should run; hand the outcome back to `complete_predict`
    Started(PredictionJob),
    /// Nothing to run; the request already finished with this outcome
    Finished(PredictOutcome),
}

/// One inference call detached from the widget so it can run off the event loop.
#[derive(Debug)]
pub struct PredictionJob {
    predictor: Predictor,
    tensor: InputTensor,
}

impl PredictionJob {
    pub fn tensor(&self) -> &InputTensor {
        &self.tensor
    }

    pub fn run(self) -> Result<PredictionResult, DoodleError> {
        self.predictor.predict(self.tensor)
    }

    /// Runs inference on the blocking pool so the caller's executor stays free
    pub async fn run_async(self) -> Result<PredictionResult, DoodleError> {
        tokio::task::spawn_blocking(move || self.run())
            .await
            .map_err(|e| DoodleError::PredictionError(format!("Inference task failed: {}", e)))?
    }
}

/// The draw-and-guess widget.
///
/// Owns the drawing surface and all per-instance state. Model readiness is the
/// presence of a predictor, and `loading` guards against overlapping
/// predictions. Every failure inside predict is logged and swallowed; the
/// previous result stays on display until the next successful prediction.
#[derive(Debug)]
pub struct DoodleWidget {
    surface: DrawingSurface,
    capture: StrokeCapture,
    preprocessor: Preprocessor,
    vocabulary: ClassVocabulary,
    predictor: Option<Predictor>,
    model_error: Option<String>,
    loading: bool,
    last_result: Option<PredictionResult>,
}

impl Default for DoodleWidget {
    fn default() -> Self {
        Self::new(&WidgetConfig::default())
    }
}

impl DoodleWidget {
    /// Mounts a widget with a blank canvas and no model
    pub fn new(config: &WidgetConfig) -> Self {
        let mut widget = Self {
            surface: DrawingSurface::new(),
            capture: StrokeCapture::new(),
            preprocessor: Preprocessor::new(config.resize_filter),
            vocabulary: config.vocabulary.clone(),
            predictor: None,
            model_error: None,
            loading: false,
            last_result: None,
        };
        widget.clear();
        widget
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn vocabulary(&self) -> &ClassVocabulary {
        &self.vocabulary
    }

    pub fn predictor(&self) -> Option<&Predictor> {
        self.predictor.as_ref()
    }

    pub fn require_predictor(&self) -> Result<&Predictor, DoodleError> {
        self.predictor.as_ref().ok_or(DoodleError::ModelUnavailable)
    }

    pub fn is_ready(&self) -> bool {
        self.predictor.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Why the model could not be loaded, if it failed
    pub fn model_error(&self) -> Option<&str> {
        self.model_error.as_deref()
    }

    /// True until a model is attached or its load has failed
    pub fn is_model_pending(&self) -> bool {
        self.predictor.is_none() && self.model_error.is_none()
    }

    pub fn last_result(&self) -> Option<&PredictionResult> {
        self.last_result.as_ref()
    }

    /// Makes a loaded model available for prediction
    pub fn attach_model(&mut self, model: Arc<dyn InferenceModel>) {
        info!("Model '{}' ready", model.name());
        self.model_error = None;
        self.predictor = Some(Predictor::new(model, self.vocabulary.clone()));
    }

    /// Records a failed model load. The widget stays inert until a model is attached.
    pub fn model_failed(&mut self, err: &DoodleError) {
        error!("Model failed to load: {}", err);
        self.model_error = Some(err.to_string());
    }

    pub fn on_pointer_down(&mut self, point: StrokePoint) {
        self.capture.on_pointer_down(&mut self.surface, point);
    }

    pub fn on_pointer_move(&mut self, point: StrokePoint, primary_held: bool) {
        self.capture.on_pointer_move(&mut self.surface, point, primary_held);
    }

    /// Blanks the canvas. The last prediction stays displayed.
    pub fn clear(&mut self) {
        self.capture.clear(&mut self.surface);
    }

    /// Applies a pointer or clear event. Returns false for `Predict`, which
    /// needs [`predict`](Self::predict) instead.
    pub fn apply(&mut self, event: &WidgetEvent) -> bool {
        match *event {
            WidgetEvent::PointerDown { x, y } => self.on_pointer_down(StrokePoint::new(x, y)),
            WidgetEvent::PointerMove { x, y, primary } => {
                self.on_pointer_move(StrokePoint::new(x, y), primary)
            }
            WidgetEvent::Clear => self.clear(),
            WidgetEvent::Predict => return false,
        }
        true
    }

    /// Starts a prediction: checks readiness and the in-flight guard, then
    /// snapshots the surface into a tensor.
    pub fn begin_predict(&mut self) -> PredictStart {
        let predictor = match self.require_predictor() {
            Ok(predictor) => predictor.clone(),
            Err(e) => {
                debug!("Predict ignored: {}", e);
                let outcome = PredictOutcome::Skipped(SkipReason::ModelUnavailable);
                return PredictStart::Finished(outcome);
            }
        };
        if self.loading {
            debug!("Predict ignored: a prediction is already in flight");
            return PredictStart::Finished(PredictOutcome::Skipped(SkipReason::InFlight));
        }

        self.loading = true;
        match self.preprocessor.preprocess(&self.surface) {
            Ok(tensor) => PredictStart::Started(PredictionJob { predictor, tensor }),
            Err(e) => {
                warn!("Predict aborted: {}", e);
                self.loading = false;
                PredictStart::Finished(PredictOutcome::Aborted(e.to_string()))
            }
        }
    }

    /// Finishes a prediction started with [`begin_predict`](Self::begin_predict)
    pub fn complete_predict(
        &mut self,
        result: Result<PredictionResult, DoodleError>,
    ) -> PredictOutcome {
        self.loading = false;
        match result {
            Ok(result) => {
                if let (Some(label), Some(confidence)) =
                    (result.label(&self.vocabulary), result.confidence())
                {
                    info!("Prediction: {} ({:.1}%)", label, confidence * 100.0);
                }
                self.last_result = Some(result.clone());
                PredictOutcome::Updated(result)
            }
            Err(e) => {
                error!("Prediction error: {}", e);
                PredictOutcome::Failed(e.to_string())
            }
        }
    }

    /// Runs a whole prediction, with inference on the blocking pool
    pub async fn predict(&mut self) -> PredictOutcome {
        match self.begin_predict() {
            PredictStart::Started(job) => {
                let result = job.run_async().await;
                self.complete_predict(result)
            }
            PredictStart::Finished(outcome) => outcome,
        }
    }

    /// Runs a whole prediction on the current thread
    pub fn predict_blocking(&mut self) -> PredictOutcome {
        match self.begin_predict() {
            PredictStart::Started(job) => {
                let result = job.run();
                self.complete_predict(result)
            }
            PredictStart::Finished(outcome) => outcome,
        }
    }

    /// Snapshot of what the presentation layer should show
    pub fn view(&self) -> WidgetView {
        WidgetView::new(
            self.loading,
            self.is_ready(),
            self.last_result.as_ref(),
            &self.vocabulary,
        )
        .with_model_error(self.model_error.clone())
    }
}
