//! Channel-driven event loop shared by hosts embedding the widget.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, info};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::DoodleError;
use crate::predictor::InferenceModel;
use crate::widget::{DoodleWidget, PredictOutcome, WidgetEvent};

/// Everything a host feeds into the widget's event loop.
#[derive(Debug)]
pub enum HostEvent {
    Widget(WidgetEvent),
    /// The single model load started at mount has finished
    ModelLoaded(Result<Arc<dyn InferenceModel>, DoodleError>),
}

/// Drives `widget` until every sender of `events` is dropped.
///
/// Pointer and clear events are applied as they arrive. A predict that
/// arrives while the model load is still pending is held, together with every
/// event after it, until `ModelLoaded` is received, so events keep their
/// order. If the channel closes before the load resolves, held events are
/// replayed anyway and their predicts are skipped.
///
/// `on_predict` is called with the outcome of every predict request.
pub async fn run_event_loop<F>(
    widget: &mut DoodleWidget,
    events: &mut UnboundedReceiver<HostEvent>,
    mut on_predict: F,
) where
    F: FnMut(&DoodleWidget, &PredictOutcome),
{
    let mut held = VecDeque::new();

    while let Some(event) = events.recv().await {
        match event {
            HostEvent::ModelLoaded(loaded) => {
                match loaded {
                    Ok(model) => widget.attach_model(model),
                    Err(e) => widget.model_failed(&e),
                }
                if !held.is_empty() {
                    debug!("Replaying {} events held for the model", held.len());
                }
                while let Some(event) = held.pop_front() {
                    dispatch(widget, event, &mut on_predict).await;
                }
            }
            HostEvent::Widget(event)
                if !held.is_empty()
                    || (event == WidgetEvent::Predict && widget.is_model_pending()) =>
            {
                held.push_back(event);
            }
            HostEvent::Widget(event) => dispatch(widget, event, &mut on_predict).await,
        }
    }

    if !held.is_empty() {
        info!("Event channel closed before the model loaded");
    }
    while let Some(event) = held.pop_front() {
        dispatch(widget, event, &mut on_predict).await;
    }
}

async fn dispatch<F>(widget: &mut DoodleWidget, event: WidgetEvent, on_predict: &mut F)
where
    F: FnMut(&DoodleWidget, &PredictOutcome),
{
    if widget.apply(&event) {
        return;
    }

    let start = Instant::now();
    let outcome = widget.predict().await;
    debug!("Predict finished in {:.2?}", start.elapsed());
    on_predict(widget, &outcome);
}
