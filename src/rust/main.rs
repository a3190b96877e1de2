use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use doodle::presentation::{render_categories, save_surface_png};
use doodle::{
    load_model, run_event_loop, DoodleWidget, HostEvent, ModelManager, ModelSource,
    PredictOutcome, SkipReason, WidgetConfig, WidgetEvent,
};
use log::{info, warn};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file (model source, vocabulary, resize filter, runtime)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path of a local ONNX model, overriding the config
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// URL to fetch the model from once, overriding the config
    #[arg(long, conflicts_with = "model")]
    model_url: Option<String>,

    /// Expected SHA-256 of the model fetched from --model-url
    #[arg(long, requires = "model_url")]
    sha256: Option<String>,

    /// JSON array of pointer/predict/clear events to replay
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Write the final canvas to this PNG file
    #[arg(long)]
    save_png: Option<PathBuf>,

    /// Finish loading the model before any event is replayed
    #[arg(short, long)]
    wait_for_model: bool,
}

/// Draws a rough apple: a closed loop with a stalk
fn demo_script() -> Vec<WidgetEvent> {
    let mut events = Vec::new();
    let (cx, cy, r) = (140.0f32, 150.0f32, 80.0f32);
    events.push(WidgetEvent::PointerDown { x: cx + r, y: cy });
    for step in 1..=48 {
        let angle = step as f32 / 48.0 * std::f32::consts::TAU;
        events.push(WidgetEvent::PointerMove {
            x: cx + r * angle.cos(),
            y: cy + r * angle.sin(),
            primary: true,
        });
    }
    events.push(WidgetEvent::PointerMove { x: 0.0, y: 0.0, primary: false });
    events.push(WidgetEvent::PointerDown { x: 140.0, y: 70.0 });
    events.push(WidgetEvent::PointerMove { x: 150.0, y: 40.0, primary: true });
    events.push(WidgetEvent::PointerMove { x: 0.0, y: 0.0, primary: false });
    events.push(WidgetEvent::Predict);
    events
}

fn load_config(args: &Args) -> anyhow::Result<WidgetConfig> {
    let mut config = match &args.config {
        Some(path) => WidgetConfig::from_file(path)?,
        None => WidgetConfig::default(),
    };
    if let Some(path) = &args.model {
        config.model = ModelSource::Path { path: path.clone() };
    }
    if let Some(url) = &args.model_url {
        config.model = ModelSource::Url {
            name: "doodle".to_string(),
            url: url.clone(),
            sha256: args.sha256.clone(),
        };
    }
    Ok(config)
}

fn load_script(args: &Args) -> anyhow::Result<Vec<WidgetEvent>> {
    match &args.script {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading script {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing script {}", path.display()))
        }
        None => Ok(demo_script()),
    }
}

fn report(widget: &DoodleWidget, outcome: &PredictOutcome) {
    match outcome {
        PredictOutcome::Updated(_) => {
            if let Some(panel) = &widget.view().results {
                println!("\n{}", panel.render_text(40));
            }
        }
        PredictOutcome::Skipped(SkipReason::ModelUnavailable) => match widget.model_error() {
            Some(reason) => println!("\nPrediction unavailable: {}", reason),
            None => warn!("Predict skipped: model not loaded"),
        },
        PredictOutcome::Skipped(reason) => warn!("Predict skipped: {:?}", reason),
        PredictOutcome::Aborted(_) | PredictOutcome::Failed(_) => {
            println!("\nPrediction unavailable; previous result kept.");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("=== Starting Doodle Predictor ===");

    let config = load_config(&args)?;
    let script = load_script(&args)?;
    let manager = ModelManager::new_default().context("creating model cache directory")?;

    let mut widget = DoodleWidget::new(&config);
    println!("{}", render_categories(widget.vocabulary()));

    let (tx, mut rx) = mpsc::unbounded_channel();

    // Exactly one model load, started at mount
    let source = config.model.clone();
    let runtime = config.runtime.clone();
    if args.wait_for_model {
        let loaded = load_model(&source, &manager, &runtime).await;
        let _ = tx.send(HostEvent::ModelLoaded(loaded));
    } else {
        let model_tx = tx.clone();
        tokio::spawn(async move {
            let loaded = load_model(&source, &manager, &runtime).await;
            let _ = model_tx.send(HostEvent::ModelLoaded(loaded));
        });
    }

    info!("Replaying {} events", script.len());
    for event in script {
        let _ = tx.send(HostEvent::Widget(event));
    }
    drop(tx);

    run_event_loop(&mut widget, &mut rx, report).await;

    if let Some(path) = &args.save_png {
        save_surface_png(widget.surface(), path)?;
        info!("Canvas written to {}", path.display());
    }

    info!("=== Done ===");
    Ok(())
}
