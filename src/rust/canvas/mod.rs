//! Freehand stroke capture onto a fixed-size bitmap.

pub mod capture;
pub mod surface;

pub use capture::{StrokeCapture, StrokeStyle, DOT_RADIUS, STROKE_WIDTH};
pub use surface::{DrawingSurface, StrokePoint, BACKGROUND, FOREGROUND, SURFACE_SIZE};
