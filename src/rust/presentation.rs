//! View models and text rendering for the widget's results panel.

use std::fmt::Write as _;
use std::path::Path;

use image::ImageFormat;

use crate::canvas::DrawingSurface;
use crate::error::DoodleError;
use crate::predictor::{ClassVocabulary, PredictionResult};

/// Caption of the predict button while idle
pub const PREDICT_CAPTION: &str = "Predict Drawing";
/// Caption of the predict button while a prediction is in flight
pub const LOADING_CAPTION: &str = "Predicting...";

/// One confidence bar of the results panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBar {
    pub label: String,
    pub probability: f32,
}

impl ClassBar {
    /// Probability as a percentage
    pub fn percent(&self) -> f32 {
        self.probability * 100.0
    }

    /// Percentage with one decimal, e.g. `60.0%`
    pub fn percent_label(&self) -> String {
        format!("{:.1}%", self.percent())
    }

    /// Bar fill in percent of the full track, limited to `0..=100`
    pub fn width_percent(&self) -> f32 {
        if self.percent().is_nan() {
            0.0
        } else {
            self.percent().clamp(0.0, 100.0)
        }
    }
}

/// The predicted label plus one bar per class, in vocabulary order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsPanel {
    pub label: String,
    pub index: usize,
    pub bars: Vec<ClassBar>,
}

impl ResultsPanel {
    /// Builds the panel, or `None` if the result does not index into the vocabulary
    pub fn new(result: &PredictionResult, vocabulary: &ClassVocabulary) -> Option<Self> {
        let label = result.label(vocabulary)?.to_string();
        let bars = vocabulary
            .iter()
            .zip(&result.probabilities)
            .map(|(label, &probability)| ClassBar {
                label: label.to_string(),
                probability,
            })
            .collect();
        Some(Self {
            label,
            index: result.index,
            bars,
        })
    }

    pub fn headline(&self) -> String {
        format!("I think it's a {}!", self.label.to_uppercase())
    }

    pub fn bar(&self, label: &str) -> Option<&ClassBar> {
        self.bars.iter().find(|b| b.label == label)
    }

    /// Renders the headline and a `#`-filled bar per class, `track_width` cells wide
    pub fn render_text(&self, track_width: usize) -> String {
        let name_width = self.bars.iter().map(|b| b.label.len()).max().unwrap_or(0);
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.headline());
        let _ = writeln!(out, "Confidence Levels");
        for bar in &self.bars {
            let filled = ((bar.width_percent() / 100.0) * track_width as f32).round() as usize;
            let filled = filled.min(track_width);
            let _ = writeln!(
                out,
                "  {:<name_width$}  [{}{}] {:>6}",
                capitalize(&bar.label),
                "#".repeat(filled),
                " ".repeat(track_width - filled),
                bar.percent_label(),
            );
        }
        out
    }
}

/// Everything the presentation layer needs to draw the widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView {
    pub loading: bool,
    pub predict_enabled: bool,
    pub results: Option<ResultsPanel>,
    /// Set when the model failed to load, so the host can tell that apart from loading
    pub model_error: Option<String>,
}

impl WidgetView {
    pub fn new(
        loading: bool,
        model_ready: bool,
        last_result: Option<&PredictionResult>,
        vocabulary: &ClassVocabulary,
    ) -> Self {
        Self {
            loading,
            predict_enabled: model_ready && !loading,
            results: last_result.and_then(|r| ResultsPanel::new(r, vocabulary)),
            model_error: None,
        }
    }

    pub fn with_model_error(mut self, model_error: Option<String>) -> Self {
        self.model_error = model_error;
        self
    }

    pub fn predict_caption(&self) -> &'static str {
        if self.loading {
            LOADING_CAPTION
        } else {
            PREDICT_CAPTION
        }
    }
}

/// One-line list of the categories the model knows
pub fn render_categories(vocabulary: &ClassVocabulary) -> String {
    let names: Vec<String> = vocabulary.iter().map(capitalize).collect();
    format!("Available Categories: {}", names.join(", "))
}

/// Writes the drawing surface to a PNG file
pub fn save_surface_png(
    surface: &DrawingSurface,
    path: impl AsRef<Path>,
) -> Result<(), DoodleError> {
    let path = path.as_ref();
    surface
        .pixels()
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| {
            DoodleError::ValidationError(format!("Cannot write {}: {}", path.display(), e))
        })
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
