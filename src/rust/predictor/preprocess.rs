use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::tensor::{InputTensor, INPUT_SIZE};
use super::utils::luma;
use crate::canvas::DrawingSurface;
use crate::error::DoodleError;

/// Resampling filter used to shrink the surface to the model input size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResizeFilter {
    fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Converts a drawing surface into the model's input tensor.
///
/// The conversion is deterministic:
/// 1. Resample the surface to 28×28 and composite it over a target pre-filled
///    with the surface background
/// 2. Read the 784 RGBA samples back in row-major order
/// 3. Take the BT.601 luma of each sample and divide by 255
/// 4. Shape the values as (1, 28, 28, 1)
///
/// A blank surface yields the background luma everywhere (0.0 for black).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Preprocessor {
    filter: ResizeFilter,
}

impl Preprocessor {
    pub fn new(filter: ResizeFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> ResizeFilter {
        self.filter
    }

    pub fn preprocess(&self, surface: &DrawingSurface) -> Result<InputTensor, DoodleError> {
        if surface.width() == 0 || surface.height() == 0 {
            return Err(DoodleError::PreprocessError(format!(
                "Drawing surface has no pixels ({}x{})",
                surface.width(),
                surface.height()
            )));
        }

        let side = INPUT_SIZE as u32;
        let resized = imageops::resize(surface.pixels(), side, side, self.filter.filter_type());
        let mut target = RgbaImage::from_pixel(side, side, surface.background());
        imageops::overlay(&mut target, &resized, 0, 0);

        let values: Vec<f32> = target.pixels().map(|p| luma(p) / 255.0).collect();
        InputTensor::from_vec(values)
    }
}

/// Preprocesses with the default Lanczos3 filter
pub fn preprocess(surface: &DrawingSurface) -> Result<InputTensor, DoodleError> {
    Preprocessor::default().preprocess(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{StrokePoint, BACKGROUND, FOREGROUND};
    use image::Rgba;

    #[test]
    fn test_blank_surface_is_all_zero() {
        let tensor = preprocess(&DrawingSurface::new()).unwrap();
        assert_eq!(tensor.shape(), &[1, 28, 28, 1]);
        assert!(tensor.values().all(|v| v == 0.0));
    }

    #[test]
    fn test_full_white_surface_is_all_one() {
        let surface = DrawingSurface::with_colors(280, 280, FOREGROUND, BACKGROUND);
        let tensor = preprocess(&surface).unwrap();
        assert!(tensor.values().all(|v| (v - 1.0).abs() < 1e-4));
    }

    #[test]
    fn test_colored_background_uses_luma() {
        let red = Rgba([255, 0, 0, 255]);
        let surface = DrawingSurface::with_colors(280, 280, red, FOREGROUND);
        let tensor = preprocess(&surface).unwrap();
        let expected = 0.299 * 255.0 / 255.0;
        assert!(tensor.values().all(|v| (v - expected).abs() < 1e-4));
    }

    #[test]
    fn test_every_filter_keeps_background_clean() {
        for filter in [
            ResizeFilter::Nearest,
            ResizeFilter::Triangle,
            ResizeFilter::CatmullRom,
            ResizeFilter::Gaussian,
            ResizeFilter::Lanczos3,
        ] {
            let tensor = Preprocessor::new(filter).preprocess(&DrawingSurface::new()).unwrap();
            assert!(tensor.values().all(|v| v == 0.0), "{:?}", filter);
        }
    }

    #[test]
    fn test_stroke_lands_in_scaled_cell() {
        let mut surface = DrawingSurface::new();
        // Thick horizontal bar through the middle of cell row 5
        for y in [52.0, 54.0, 56.0, 58.0] {
            surface.stroke_segment(StrokePoint::new(20.0, y), StrokePoint::new(260.0, y), 4.0);
        }
        let tensor = Preprocessor::new(ResizeFilter::Triangle).preprocess(&surface).unwrap();
        assert!(tensor.get(5, 14).unwrap() > 0.5);
        assert_eq!(tensor.get(20, 14), Some(0.0));
    }

    #[test]
    fn test_empty_surface_is_rejected() {
        let surface = DrawingSurface::with_colors(0, 0, BACKGROUND, FOREGROUND);
        assert!(matches!(preprocess(&surface), Err(DoodleError::PreprocessError(_))));
    }
}
