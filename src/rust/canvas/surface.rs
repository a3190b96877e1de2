use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

/// Side length of the square drawing surface, in pixels
pub const SURFACE_SIZE: u32 = 280;

/// Persistent background color of the surface (opaque black)
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Stroke color (opaque white)
pub const FOREGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A coordinate in surface-local space.
///
/// Coordinates are continuous: pixel `(x, y)` covers the square
/// `[x, x + 1) × [y, y + 1)` and its center sits at `(x + 0.5, y + 0.5)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance from this point to the closed segment `a..b`
    pub(crate) fn distance_to_segment(&self, a: StrokePoint, b: StrokePoint) -> f32 {
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq > 0.0 {
            (((self.x - a.x) * dx + (self.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (px, py) = (a.x + t * dx, a.y + t * dy);
        (self.x - px).hypot(self.y - py)
    }
}

/// A fixed-size RGBA bitmap that strokes are rasterized onto.
///
/// Shapes are anti-aliased by analytic coverage: a pixel whose center lies at
/// distance `d` from the ideal shape edge of radius `r` receives coverage
/// `clamp(r + 0.5 - d, 0, 1)` and is blended source-over with the foreground.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingSurface {
    pixels: RgbaImage,
    background: Rgba<u8>,
    foreground: Rgba<u8>,
}

impl Default for DrawingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface {
    /// Creates a blank 280×280 surface, white on black
    pub fn new() -> Self {
        Self::with_colors(SURFACE_SIZE, SURFACE_SIZE, BACKGROUND, FOREGROUND)
    }

    pub fn with_colors(
        width: u32,
        height: u32,
        background: Rgba<u8>,
        foreground: Rgba<u8>,
    ) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, background),
            background,
            foreground,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn background(&self) -> Rgba<u8> {
        self.background
    }

    pub fn foreground(&self) -> Rgba<u8> {
        self.foreground
    }

    /// Read-only view of the underlying bitmap
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` when out of bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    /// Resets every pixel to the background color
    pub fn fill_background(&mut self) {
        let background = self.background;
        self.pixels.pixels_mut().for_each(|p| *p = background);
    }

    /// True when no pixel differs from the background
    pub fn is_blank(&self) -> bool {
        self.pixels.pixels().all(|p| *p == self.background)
    }

    /// Paints a filled, anti-aliased disc in the foreground color
    pub fn fill_disc(&mut self, center: StrokePoint, radius: f32) {
        let bounds = (center.x, center.y, center.x, center.y);
        self.paint_shape(bounds, radius, |px, py| (px - center.x).hypot(py - center.y));
    }

    /// Strokes a segment of the given width with round caps.
    ///
    /// Consecutive segments sharing an endpoint therefore meet in a round join.
    pub fn stroke_segment(&mut self, from: StrokePoint, to: StrokePoint, width: f32) {
        let bounds = (from.x.min(to.x), from.y.min(to.y), from.x.max(to.x), from.y.max(to.y));
        self.paint_shape(bounds, width / 2.0, |px, py| {
            StrokePoint::new(px, py).distance_to_segment(from, to)
        });
    }

    fn paint_shape(
        &mut self,
        (min_x, min_y, max_x, max_y): (f32, f32, f32, f32),
        radius: f32,
        distance: impl Fn(f32, f32) -> f32,
    ) {
        let reach = radius + 0.5;
        let x0 = (min_x - reach).floor().max(0.0) as u32;
        let y0 = (min_y - reach).floor().max(0.0) as u32;
        let x1 = (max_x + reach).ceil().min(self.width() as f32) as u32;
        let y1 = (max_y + reach).ceil().min(self.height() as f32) as u32;

        let foreground = self.foreground;
        for y in y0..y1 {
            for x in x0..x1 {
                let d = distance(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (reach - d).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    blend(self.pixels.get_pixel_mut(x, y), foreground, coverage);
                }
            }
        }
    }
}

fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    for (d, s) in dst.0.iter_mut().zip(src.0) {
        let mixed = *d as f32 + (s as f32 - *d as f32) * coverage;
        *d = mixed.round().clamp(0.0, 255.0) as u8;
    }
}
