//! Drawing surface trait and shared types.
//!
//! The [`Surface`] trait is the 2D drawing API the compositor renders into:
//! resize, fill, draw a scaled bitmap, fill and measure text, and encode.
//!
//! The production implementation is
//! [`RasterSurface`](super::rust_backend::RasterSurface), which draws into an
//! in-memory RGBA buffer. Tests use the recording mock in [`tests`].

use super::params::{ExportFormat, Quality, TextStyle};
use crate::types::{PixelSize, TextPosition};
use image::RgbaImage;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Encoder produced no data")]
    EmptyExport,
    #[error("Nothing to export: no photo has been rendered")]
    NothingToExport,
    #[error("Font error: {0}")]
    Font(String),
    #[error("Background task failed: {0}")]
    Task(String),
}

/// A decoded image. Cloning is cheap; the pixels are shared.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pixels: Arc<RgbaImage>,
}

impl Bitmap {
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    /// Decode any format the `image` features compile in (JPEG, PNG).
    pub fn decode(bytes: &[u8]) -> Result<Self, RenderError> {
        let img = image::load_from_memory(bytes).map_err(|e| RenderError::Decode(e.to_string()))?;
        Ok(Self::from_rgba(img.into_rgba8()))
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.pixels.width(), self.pixels.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Measured extent of a string in a given font.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    /// Distance from the baseline to the top of the em box (positive).
    pub ascent: f32,
    /// Distance from the baseline to the bottom of the em box (negative).
    pub descent: f32,
}

/// A 2D drawing target.
///
/// Surface operations never fail: unparseable colors fall back to a default
/// and missing fonts skip text. Only [`encode`](Self::encode) returns errors.
pub trait Surface: Send {
    fn size(&self) -> PixelSize;

    /// Resize the surface. Contents are cleared to transparent.
    fn resize(&mut self, size: PixelSize);

    /// Fill the whole surface with a CSS color.
    fn fill(&mut self, color: &str);

    /// Draw `bitmap` scaled to `size` with its top-left corner at `at`.
    fn draw_bitmap(&mut self, bitmap: &Bitmap, at: TextPosition, size: PixelSize);

    /// Draw `text` anchored at `at` according to the style's align and baseline.
    fn fill_text(&mut self, text: &str, style: &TextStyle, at: TextPosition);

    fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics;

    /// Encode the current contents.
    fn encode(&self, format: ExportFormat, quality: Quality) -> Result<Vec<u8>, RenderError>;
}
