//! Pure Rust raster surface.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image::load_from_memory` |
//! | Scale + blit | `image::imageops::resize` (`Lanczos3`) + `imageops::overlay` |
//! | Color parsing | `csscolorparser` (hex, `rgb()`, `hsl()`, named colors) |
//! | Text | `rusttype` glyph layout and coverage rasterisation |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha dropped, transparent → black) |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |

use super::backend::{Bitmap, RenderError, Surface, TextMetrics};
use super::params::{ExportFormat, Quality, TextStyle};
use crate::types::{PixelSize, TextAlign, TextBaseline, TextPosition};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use rusttype::{Font, Scale, point};
use std::path::{Path, PathBuf};

const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Monospace fonts probed, in order, when no font file is configured.
const SYSTEM_MONOSPACE_FONTS: &[&str] = &[
    "C:\\Windows\\Fonts\\consola.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu-sans-mono-fonts/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation-mono/LiberationMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "/Library/Fonts/Courier New.ttf",
];

/// First monospace font from the probe list that exists on this machine.
pub fn find_system_font() -> Option<PathBuf> {
    SYSTEM_MONOSPACE_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

pub fn load_font(path: &Path) -> Result<Font<'static>, RenderError> {
    let data = std::fs::read(path)?;
    Font::try_from_vec(data).ok_or_else(|| {
        RenderError::Font(format!("{} is not a TrueType/OpenType font", path.display()))
    })
}

/// Parse a CSS color to RGBA8, or use `fallback` when it does not parse.
pub fn parse_color(value: &str, fallback: [u8; 4]) -> [u8; 4] {
    match csscolorparser::parse(value) {
        Ok(color) => color.to_rgba8(),
        Err(e) => {
            log::warn!("Invalid color {value:?} ({e}), using fallback");
            fallback
        }
    }
}

/// Source-over blend of `src` scaled by `coverage` onto `dst`.
fn blend(dst: &mut Rgba<u8>, src: [u8; 4], coverage: f32) {
    let a = src[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    for i in 0..3 {
        dst.0[i] = (src[i] as f32 * a + dst.0[i] as f32 * inv).round() as u8;
    }
    dst.0[3] = (255.0 * a + dst.0[3] as f32 * inv).round() as u8;
}

/// Horizontal shift from the anchor to the left edge of the string.
fn align_offset(align: TextAlign, width: f32) -> f32 {
    match align {
        TextAlign::Left | TextAlign::Start => 0.0,
        TextAlign::Right | TextAlign::End => width,
        TextAlign::Center => width / 2.0,
    }
}

/// Vertical shift from the anchor to the alphabetic baseline.
///
/// `ascent` is positive and `descent` negative, as reported by `rusttype`.
fn baseline_offset(baseline: TextBaseline, ascent: f32, descent: f32) -> f32 {
    match baseline {
        TextBaseline::Top => ascent,
        TextBaseline::Hanging => ascent * 0.8,
        TextBaseline::Middle => (ascent + descent) / 2.0,
        TextBaseline::Alphabetic => 0.0,
        TextBaseline::Bottom | TextBaseline::Ideographic => descent,
    }
}

fn text_width(font: &Font<'_>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

/// An in-memory RGBA canvas.
///
/// Text needs a font; without one, text calls log a warning once and draw
/// nothing while everything else still renders.
pub struct RasterSurface {
    canvas: RgbaImage,
    font: Option<Font<'static>>,
    warned_missing_font: bool,
}

impl RasterSurface {
    /// A surface without a font.
    pub fn new() -> Self {
        Self {
            canvas: RgbaImage::new(0, 0),
            font: None,
            warned_missing_font: false,
        }
    }

    pub fn with_font(font: Font<'static>) -> Self {
        Self {
            font: Some(font),
            ..Self::new()
        }
    }

    /// Load `path` if given, otherwise the first system monospace font found.
    ///
    /// A configured path that cannot be loaded is an error; finding no system
    /// font is not.
    pub fn with_font_file(path: Option<&Path>) -> Result<Self, RenderError> {
        if let Some(path) = path {
            log::debug!("Loading font {}", path.display());
            return Ok(Self::with_font(load_font(path)?));
        }
        match find_system_font() {
            Some(found) => match load_font(&found) {
                Ok(font) => {
                    log::debug!("Using system font {}", found.display());
                    Ok(Self::with_font(font))
                }
                Err(e) => {
                    log::warn!("{e}; text will not be drawn");
                    Ok(Self::new())
                }
            },
            None => {
                log::warn!("No monospace font found; text will not be drawn (set [font] path)");
                Ok(Self::new())
            }
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.canvas
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for RasterSurface {
    fn size(&self) -> PixelSize {
        PixelSize::new(self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, size: PixelSize) {
        self.canvas = RgbaImage::new(size.width, size.height);
    }

    fn fill(&mut self, color: &str) {
        let rgba = parse_color(color, WHITE);
        if rgba[3] == 255 {
            for px in self.canvas.pixels_mut() {
                *px = Rgba(rgba);
            }
        } else {
            for px in self.canvas.pixels_mut() {
                blend(px, rgba, 1.0);
            }
        }
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, at: TextPosition, size: PixelSize) {
        if size.is_empty() || bitmap.size().is_empty() {
            return;
        }
        let scaled;
        let source = if bitmap.size() == size {
            bitmap.pixels()
        } else {
            scaled = imageops::resize(
                bitmap.pixels(),
                size.width,
                size.height,
                FilterType::Lanczos3,
            );
            &scaled
        };
        imageops::overlay(&mut self.canvas, source, at.x as i64, at.y as i64);
    }

    fn fill_text(&mut self, text: &str, style: &TextStyle, at: TextPosition) {
        if text.is_empty() {
            return;
        }
        let Some(font) = self.font.as_ref() else {
            if !self.warned_missing_font {
                log::warn!("No font loaded, skipping text {text:?}");
                self.warned_missing_font = true;
            }
            return;
        };

        let color = parse_color(&style.color, BLACK);
        let scale = Scale::uniform(style.font.size_px as f32);
        let v = font.v_metrics(scale);
        let left = at.x as f32 - align_offset(style.align, text_width(font, scale, text));
        let baseline = at.y as f32 + baseline_offset(style.baseline, v.ascent, v.descent);

        // Faux bold: a second strike shifted right.
        let bold_shift = (style.font.size_px as f32 / 24.0).max(1.0);
        let strikes: &[f32] = if style.font.weight.is_heavy() {
            &[0.0, bold_shift]
        } else {
            &[0.0]
        };

        let canvas = &mut self.canvas;
        let (width, height) = canvas.dimensions();
        for dx in strikes {
            for glyph in font.layout(text, scale, point(left + dx, baseline)) {
                let Some(bb) = glyph.pixel_bounding_box() else {
                    continue;
                };
                glyph.draw(|gx, gy, coverage| {
                    let x = bb.min.x + gx as i32;
                    let y = bb.min.y + gy as i32;
                    if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                        blend(canvas.get_pixel_mut(x as u32, y as u32), color, coverage);
                    }
                });
            }
        }
    }

    fn measure_text(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let Some(font) = self.font.as_ref() else {
            return TextMetrics::default();
        };
        let scale = Scale::uniform(style.font.size_px as f32);
        let v = font.v_metrics(scale);
        TextMetrics {
            width: text_width(font, scale, text),
            ascent: v.ascent,
            descent: v.descent,
        }
    }

    fn encode(&self, format: ExportFormat, quality: Quality) -> Result<Vec<u8>, RenderError> {
        let (width, height) = self.canvas.dimensions();
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyExport);
        }
        let mut buf = Vec::new();
        match format {
            ExportFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgba8(self.canvas.clone()).into_rgb8();
                JpegEncoder::new_with_quality(&mut buf, quality.value() as u8).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            ExportFormat::Png => PngEncoder::new(&mut buf).write_image(
                self.canvas.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
        }
        .map_err(|e| RenderError::Encode(format!("{format} encode failed: {e}")))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::FontSpec;
    use crate::types::FontWeight;

    fn style(color: &str, align: TextAlign, baseline: TextBaseline) -> TextStyle {
        TextStyle {
            font: FontSpec {
                weight: FontWeight::Bold,
                size_px: 24,
                family: "Mono".into(),
            },
            color: color.into(),
            align,
            baseline,
        }
    }

    fn checker(width: u32, height: u32) -> Bitmap {
        Bitmap::from_rgba(RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        }))
    }

    #[test]
    fn resize_clears_to_transparent() {
        let mut s = RasterSurface::new();
        s.resize(PixelSize::new(4, 3));
        s.fill("#123456");
        s.resize(PixelSize::new(2, 2));
        assert_eq!(s.size(), PixelSize::new(2, 2));
        assert_eq!(s.pixels().get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn fill_parses_css_colors() {
        let mut s = RasterSurface::new();
        s.resize(PixelSize::new(2, 2));
        s.fill("rgb(10, 20, 30)");
        assert_eq!(s.pixels().get_pixel(1, 1).0, [10, 20, 30, 255]);
        s.fill("red");
        assert_eq!(s.pixels().get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn invalid_fill_color_falls_back_to_white() {
        let mut s = RasterSurface::new();
        s.resize(PixelSize::new(1, 1));
        s.fill("not-a-color");
        assert_eq!(s.pixels().get_pixel(0, 0).0, WHITE);
    }

    #[test]
    fn translucent_fill_blends() {
        let mut s = RasterSurface::new();
        s.resize(PixelSize::new(1, 1));
        s.fill("#000");
        s.fill("#ffffff80");
        let px = s.pixels().get_pixel(0, 0).0;
        assert!((126..=130).contains(&px[0]), "{px:?}");
        assert_eq!(px[3], 255);
    }

    #[test]
    fn draw_bitmap_at_native_size_copies_pixels() {
        let mut s = RasterSurface::new();
        s.resize(PixelSize::new(6, 6));
        s.fill("#fff");
        s.draw_bitmap(&checker(2, 2), TextPosition { x: 2, y: 3 }, PixelSize::new(2, 2));
        assert_eq!(s.pixels().get_pixel(2, 3).0, [255, 0, 0, 255]);
        assert_eq!(s.pixels().get_pixel(3, 3).0, [0, 0, 255, 255]);
        assert_eq!(s.pixels().get_pixel(1, 3).0, WHITE);
        assert_eq!(s.pixels().get_pixel(4, 3).0, WHITE);
    }

    #[test]
    fn draw_bitmap_scales_into_target_rect() {
        let mut s = RasterSurface::new();
        s.resize(PixelSize::new(20, 20));
        s.fill("#fff");
        let solid = Bitmap::from_rgba(RgbaImage::from_pixel(4, 2, Rgba([0, 255, 0, 255])));
        s.draw_bitmap(&solid, TextPosition { x: 5, y: 5 }, PixelSize::new(8, 4));
        let inside = s.pixels().get_pixel(8, 6).0;
        assert!(inside[0] < 16 && inside[1] > 240, "{inside:?}");
        assert_eq!(s.pixels().get_pixel(13, 6).0, WHITE);
        assert_eq!(s.pixels().get_pixel(8, 9).0, WHITE);
    }

    #[test]
    fn draw_bitmap_clips_negative_offsets() {
        let mut s = RasterSurface::new();
        s.resize(PixelSize::new(4, 4));
        s.draw_bitmap(&checker(4, 4), TextPosition { x: -2, y: -2 }, PixelSize::new(4, 4));
        assert_eq!(s.pixels().get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(s.pixels().get_pixel(3, 3).0, [0, 0, 0, 0]);
    }

    #[test]
    fn text_without_font_is_skipped() {
        let mut s = RasterSurface::new();
        s.resize(PixelSize::new(50, 20));
        s.fill("#fff");
        let before = s.pixels().clone();
        let st = style("#000", TextAlign::Left, TextBaseline::Top);
        s.fill_text("SONY", &st, TextPosition { x: 1, y: 1 });
        s.fill_text("again", &st, TextPosition { x: 1, y: 1 });
        assert_eq!(s.pixels(), &before);
        assert_eq!(s.measure_text("SONY", &st), TextMetrics::default());
    }

    #[test]
    fn text_draws_with_a_system_font() {
        let Some(path) = find_system_font() else {
            return;
        };
        let mut s = RasterSurface::with_font(load_font(&path).unwrap());
        s.resize(PixelSize::new(200, 60));
        s.fill("#fff");
        let st = style("#000", TextAlign::Center, TextBaseline::Middle);
        s.fill_text("ILCE-7RM3A", &st, TextPosition { x: 100, y: 30 });

        assert!(s.pixels().pixels().any(|p| p.0[0] < 128));
        let metrics = s.measure_text("ILCE-7RM3A", &st);
        assert!(metrics.width > 0.0);
        assert!(metrics.ascent > 0.0);
        assert!(metrics.descent < 0.0);
    }

    #[test]
    fn missing_configured_font_is_an_error() {
        let err = RasterSurface::with_font_file(Some(Path::new("/nonexistent/font.ttf")));
        assert!(matches!(err, Err(RenderError::Io(_))));
    }

    #[test]
    fn non_font_file_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("font.ttf");
        std::fs::write(&path, b"hello").unwrap();
        assert!(matches!(load_font(&path), Err(RenderError::Font(_))));
    }

    #[test]
    fn align_and_baseline_offsets() {
        assert_eq!(align_offset(TextAlign::Left, 40.0), 0.0);
        assert_eq!(align_offset(TextAlign::End, 40.0), 40.0);
        assert_eq!(align_offset(TextAlign::Center, 40.0), 20.0);
        assert_eq!(baseline_offset(TextBaseline::Top, 20.0, -5.0), 20.0);
        assert_eq!(baseline_offset(TextBaseline::Middle, 20.0, -5.0), 7.5);
        assert_eq!(baseline_offset(TextBaseline::Bottom, 20.0, -5.0), -5.0);
        assert_eq!(baseline_offset(TextBaseline::Alphabetic, 20.0, -5.0), 0.0);
    }

    #[test]
    fn encode_jpeg_and_png() {
        let mut s = RasterSurface::new();
        s.resize(PixelSize::new(16, 8));
        s.fill("#abc");

        let jpeg = s.encode(ExportFormat::Jpeg, Quality::new(80)).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let png = s.encode(ExportFormat::Png, Quality::default()).unwrap();
        assert_eq!(&png[1..4], b"PNG");

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 8));
    }

    #[test]
    fn encode_empty_canvas_fails() {
        let s = RasterSurface::new();
        assert!(matches!(
            s.encode(ExportFormat::Jpeg, Quality::default()),
            Err(RenderError::EmptyExport)
        ));
    }
}
