mod common;

use common::{MockModel, APPLE_PROBABILITIES, VOCABULARY};
use doodle::{
    run_event_loop, ClassVocabulary, DoodleError, DoodleWidget, HostEvent, PredictOutcome,
    SkipReason, WidgetConfig, WidgetEvent,
};
use tokio::sync::mpsc;

fn widget_with_vocabulary() -> DoodleWidget {
    let config = WidgetConfig {
        vocabulary: ClassVocabulary::new(VOCABULARY.to_vec()).unwrap(),
        ..Default::default()
    };
    DoodleWidget::new(&config)
}

fn stroke_then_predict() -> Vec<WidgetEvent> {
    vec![
        WidgetEvent::PointerDown { x: 100.0, y: 100.0 },
        WidgetEvent::PointerMove { x: 180.0, y: 180.0, primary: true },
        WidgetEvent::Predict,
    ]
}

async fn drive(widget: &mut DoodleWidget, events: Vec<HostEvent>) -> Vec<PredictOutcome> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    for event in events {
        tx.send(event).unwrap();
    }
    drop(tx);

    let mut outcomes = Vec::new();
    run_event_loop(widget, &mut rx, |_, outcome| outcomes.push(outcome.clone())).await;
    outcomes
}

#[tokio::test]
async fn test_predict_queued_before_model_load_runs_after_it() {
    let model = MockModel::returning(&APPLE_PROBABILITIES);
    let mut widget = widget_with_vocabulary();

    let mut events: Vec<HostEvent> = stroke_then_predict()
        .into_iter()
        .map(HostEvent::Widget)
        .collect();
    events.push(HostEvent::ModelLoaded(Ok(model.clone())));

    let outcomes = drive(&mut widget, events).await;

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], PredictOutcome::Updated(ref r) if r.index == 2));
    assert_eq!(model.calls(), 1);
    assert_eq!(widget.view().results.unwrap().label, "apple");
}

#[tokio::test]
async fn test_model_loaded_from_another_task() {
    let model = MockModel::returning(&APPLE_PROBABILITIES);
    let mut widget = widget_with_vocabulary();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let model_tx = tx.clone();
    let loader = tokio::spawn(async move {
        tokio::task::yield_now().await;
        model_tx.send(HostEvent::ModelLoaded(Ok(model))).unwrap();
    });
    for event in stroke_then_predict() {
        tx.send(HostEvent::Widget(event)).unwrap();
    }
    drop(tx);

    let mut outcomes = Vec::new();
    run_event_loop(&mut widget, &mut rx, |_, outcome| outcomes.push(outcome.clone())).await;
    loader.await.unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], PredictOutcome::Updated(_)));
}

#[tokio::test]
async fn test_pointer_events_apply_before_model_load() {
    let mut widget = widget_with_vocabulary();
    let events = vec![HostEvent::Widget(WidgetEvent::PointerDown { x: 140.0, y: 140.0 })];

    let outcomes = drive(&mut widget, events).await;

    assert!(!widget.surface().is_blank());
    assert!(outcomes.is_empty());
    assert!(widget.is_model_pending());
}

#[tokio::test]
async fn test_held_events_keep_their_order() {
    let model = MockModel::returning(&APPLE_PROBABILITIES);
    let mut widget = widget_with_vocabulary();

    let events = vec![
        HostEvent::Widget(WidgetEvent::PointerDown { x: 60.0, y: 60.0 }),
        HostEvent::Widget(WidgetEvent::Predict),
        HostEvent::Widget(WidgetEvent::Clear),
        HostEvent::Widget(WidgetEvent::Predict),
        HostEvent::ModelLoaded(Ok(model.clone())),
    ];
    let outcomes = drive(&mut widget, events).await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| matches!(o, PredictOutcome::Updated(_))));
    assert!(widget.surface().is_blank());
    assert_eq!(model.calls(), 2);
}

#[tokio::test]
async fn test_failed_load_skips_held_predict() {
    let mut widget = widget_with_vocabulary();

    let mut events: Vec<HostEvent> = stroke_then_predict()
        .into_iter()
        .map(HostEvent::Widget)
        .collect();
    events.push(HostEvent::ModelLoaded(Err(DoodleError::ModelError(
        "Model not found".into(),
    ))));

    let outcomes = drive(&mut widget, events).await;

    assert_eq!(outcomes, vec![PredictOutcome::Skipped(SkipReason::ModelUnavailable)]);
    assert_eq!(widget.model_error(), Some("Model error: Model not found"));
    assert_eq!(
        widget.view().model_error.as_deref(),
        Some("Model error: Model not found")
    );
}

#[tokio::test]
async fn test_channel_closed_before_load_releases_held_events() {
    let mut widget = widget_with_vocabulary();
    let events = stroke_then_predict().into_iter().map(HostEvent::Widget).collect();

    let outcomes = drive(&mut widget, events).await;

    assert_eq!(outcomes, vec![PredictOutcome::Skipped(SkipReason::ModelUnavailable)]);
    assert!(widget.last_result().is_none());
}
