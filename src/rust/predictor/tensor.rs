use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::Array4;

use crate::error::DoodleError;

/// Side length of the model input grid
pub const INPUT_SIZE: usize = 28;

/// Model input shape: batch, rows, columns, channels
pub const INPUT_SHAPE: [usize; 4] = [1, INPUT_SIZE, INPUT_SIZE, 1];

/// A single-image batch of normalized grayscale intensities, shape (1, 28, 28, 1).
#[derive(Debug, Clone, PartialEq)]
pub struct InputTensor {
    data: Array4<f32>,
}

impl InputTensor {
    /// Builds a tensor from `28 * 28` values in row-major order
    pub fn from_vec(values: Vec<f32>) -> Result<Self, DoodleError> {
        let len = values.len();
        let data = Array4::from_shape_vec(INPUT_SHAPE, values).map_err(|e| {
            DoodleError::PreprocessError(format!(
                "Cannot shape {} values into {:?}: {}",
                len, INPUT_SHAPE, e
            ))
        })?;
        Ok(Self { data })
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn as_array(&self) -> &Array4<f32> {
        &self.data
    }

    /// Intensity at `(row, col)` of the single image in the batch
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        self.data.get([0, row, col, 0]).copied()
    }

    /// All values in row-major order
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied()
    }
}

/// Counts tensors allocated for inference and not yet released.
///
/// Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct TensorLedger {
    live: Arc<AtomicUsize>,
    allocated: Arc<AtomicUsize>,
}

impl TensorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `value` and registers it as a live tensor until the
    /// returned handle is dropped.
    pub fn track<T>(&self, kind: &'static str, value: T) -> Leased<T> {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.allocated.fetch_add(1, Ordering::SeqCst);
        log::trace!("Leased {} tensor ({} live)", kind, self.live());
        Leased {
            value,
            _lease: TensorLease {
                live: Arc::clone(&self.live),
                kind,
            },
        }
    }

    /// Number of tensors currently held
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Number of tensors ever leased
    pub fn total_allocated(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }
}

/// Releases one ledger slot when dropped.
#[derive(Debug)]
pub struct TensorLease {
    live: Arc<AtomicUsize>,
    kind: &'static str,
}

impl Drop for TensorLease {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        log::trace!("Released {} tensor", self.kind);
    }
}

/// A tensor value bound to its lease; both go away together.
#[derive(Debug)]
pub struct Leased<T> {
    value: T,
    _lease: TensorLease,
}

impl<T> Deref for Leased<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}
