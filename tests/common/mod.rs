#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use doodle::{DoodleError, InferenceModel, InputTensor};

pub const VOCABULARY: [&str; 10] = [
    "cat", "dog", "apple", "banana", "car", "house", "tree", "bicycle", "fish", "chair",
];

pub const APPLE_PROBABILITIES: [f32; 10] = [
    0.05, 0.05, 0.6, 0.05, 0.05, 0.05, 0.05, 0.05, 0.025, 0.025,
];

/// Stands in for a loaded model: returns a scripted output and counts calls
#[derive(Debug)]
pub struct MockModel {
    output: Mutex<Result<Vec<f32>, String>>,
    calls: AtomicUsize,
}

impl MockModel {
    pub fn returning(output: &[f32]) -> Arc<Self> {
        Arc::new(Self {
            output: Mutex::new(Ok(output.to_vec())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            output: Mutex::new(Err(message.to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_output(&self, output: Result<Vec<f32>, String>) {
        *self.output.lock().unwrap() = output;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl InferenceModel for MockModel {
    fn infer(&self, input: &InputTensor) -> Result<Vec<f32>, DoodleError> {
        assert_eq!(input.shape(), &[1, 28, 28, 1]);
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.output
            .lock()
            .unwrap()
            .clone()
            .map_err(DoodleError::ModelError)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Deterministic pseudo-random pointer events
pub fn scribble(seed: u64, count: usize) -> Vec<doodle::WidgetEvent> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };
    (0..count)
        .map(|_| {
            let x = (next() % 320) as f32 - 20.0;
            let y = (next() % 320) as f32 - 20.0;
            match next() % 4 {
                0 => doodle::WidgetEvent::PointerDown { x, y },
                1 => doodle::WidgetEvent::PointerMove { x, y, primary: false },
                _ => doodle::WidgetEvent::PointerMove { x, y, primary: true },
            }
        })
        .collect()
}
