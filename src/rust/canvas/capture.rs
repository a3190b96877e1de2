use log::debug;

use super::surface::{DrawingSurface, StrokePoint};

/// Radius of the dot painted on pointer-down
pub const DOT_RADIUS: f32 = 2.0;

/// Width of line segments drawn while the primary button is held
pub const STROKE_WIDTH: f32 = 4.0;

/// Pen geometry used by [`StrokeCapture`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub dot_radius: f32,
    pub line_width: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            dot_radius: DOT_RADIUS,
            line_width: STROKE_WIDTH,
        }
    }
}

/// Turns pointer events into strokes on a [`DrawingSurface`].
///
/// The only state kept between events is the last pointer position of the
/// current gesture. It is cleared on pointer-up (a move without the primary
/// button held) and on [`clear`](Self::clear), which breaks continuity so no
/// segment joins two separate gestures.
#[derive(Debug, Default, Clone)]
pub struct StrokeCapture {
    last_position: Option<StrokePoint>,
    style: StrokeStyle,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(style: StrokeStyle) -> Self {
        Self {
            last_position: None,
            style,
        }
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn last_position(&self) -> Option<StrokePoint> {
        self.last_position
    }

    /// Begins a stroke: paints a dot so single taps stay visible
    pub fn on_pointer_down(&mut self, surface: &mut DrawingSurface, point: StrokePoint) {
        if !point.is_finite() {
            debug!("Ignoring pointer-down at non-finite position {:?}", point);
            return;
        }
        surface.fill_disc(point, self.style.dot_radius);
        self.last_position = Some(point);
    }

    /// Extends the current stroke, or ends it when the primary button is up
    pub fn on_pointer_move(
        &mut self,
        surface: &mut DrawingSurface,
        point: StrokePoint,
        primary_held: bool,
    ) {
        if !primary_held {
            self.last_position = None;
            return;
        }
        if !point.is_finite() {
            debug!("Ignoring pointer-move to non-finite position {:?}", point);
            return;
        }
        if let Some(last) = self.last_position {
            surface.stroke_segment(last, point, self.style.line_width);
        }
        self.last_position = Some(point);
    }

    pub fn clear(&mut self, surface: &mut DrawingSurface) {
        surface.fill_background();
        self.last_position = None;
    }
}
