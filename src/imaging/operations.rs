//! The compositor: one render pass over a [`Surface`].
//!
//! A pass walks a fixed sequence of stages and always starts from a freshly
//! resized surface, so the output depends only on the scene:
//!
//! ```text
//! Idle → Resizing → Filling → BlittingPhoto → BlittingLogo → DrawingText → Idle
//! ```
//!
//! Without a photo the pass stops after resizing the canvas to zero.
//! Text items are drawn in list order; later items paint over earlier ones.

use super::backend::{Bitmap, RenderError, Surface, TextMetrics};
use super::params::{ExportFormat, ExportOptions, MONOSPACE_FAMILY, Quality, TextStyle};
use crate::exif::{ExifFieldMap, reinsert_exif_segment};
use crate::template;
use crate::types::{LogoPlacement, PixelSize, ResolvedConfig, TextItem, TextPosition};

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Idle,
    Resizing,
    Filling,
    BlittingPhoto,
    BlittingLogo,
    DrawingText,
}

/// What one render pass draws.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub photo: Option<&'a Bitmap>,
    pub logo: Option<&'a Bitmap>,
    pub config: &'a ResolvedConfig,
    pub fields: &'a ExifFieldMap,
}

pub struct Compositor<S: Surface> {
    surface: S,
    font_family: String,
    stage: RenderStage,
    /// Whether the surface currently holds a rendered photo.
    rendered: bool,
}

impl<S: Surface> Compositor<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            font_family: MONOSPACE_FAMILY.to_string(),
            stage: RenderStage::Idle,
            rendered: false,
        }
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn stage(&self) -> RenderStage {
        self.stage
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// True once a pass with a photo has completed and nothing cleared it since.
    pub fn has_output(&self) -> bool {
        self.rendered
    }

    fn enter(&mut self, stage: RenderStage) {
        log::debug!("render stage {:?} → {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Run one full pass.
    pub fn render(&mut self, scene: &Scene<'_>) {
        let config = scene.config;
        let Some(photo) = scene.photo else {
            self.clear();
            return;
        };

        self.enter(RenderStage::Resizing);
        self.surface.resize(config.canvas);

        self.enter(RenderStage::Filling);
        self.surface.fill(&config.background);

        self.enter(RenderStage::BlittingPhoto);
        let at = TextPosition {
            x: config.border.left as i32,
            y: config.border.top as i32,
        };
        self.surface.draw_bitmap(photo, at, photo.size());

        self.enter(RenderStage::BlittingLogo);
        self.blit_logo(scene.logo, &config.logo);

        self.enter(RenderStage::DrawingText);
        self.draw_text_items(&config.text_items, scene.fields);

        self.enter(RenderStage::Idle);
        self.rendered = true;
        log::debug!(
            "Rendered {}x{} canvas with {} text items",
            config.canvas.width,
            config.canvas.height,
            config.text_items.len()
        );
    }

    /// Resize the surface to zero; nothing is exportable afterwards.
    pub fn clear(&mut self) {
        self.enter(RenderStage::Resizing);
        self.surface.resize(PixelSize::ZERO);
        self.enter(RenderStage::Idle);
        self.rendered = false;
    }

    fn blit_logo(&mut self, logo: Option<&Bitmap>, placement: &LogoPlacement) {
        let Some(logo) = logo else { return };
        if placement.is_empty() {
            log::debug!("Logo placement is empty, skipping logo");
            return;
        }
        self.surface.draw_bitmap(
            logo,
            TextPosition {
                x: placement.x,
                y: placement.y,
            },
            PixelSize::new(placement.width, placement.height),
        );
    }

    fn draw_text_items(&mut self, items: &[TextItem], fields: &ExifFieldMap) {
        for item in items {
            let text = template::render(&item.template, fields);
            if text.is_empty() {
                continue;
            }
            let style = TextStyle::for_item(item, &self.font_family);
            self.surface.fill_text(&text, &style, item.position);
        }
    }

    /// Measure an item's rendered text with the same font string used to draw it.
    pub fn measure_text(&self, item: &TextItem, fields: &ExifFieldMap) -> TextMetrics {
        let text = template::render(&item.template, fields);
        self.surface
            .measure_text(&text, &TextStyle::for_item(item, &self.font_family))
    }

    /// Encode the current surface.
    pub fn export(&self, format: ExportFormat, quality: Quality) -> Result<Vec<u8>> {
        if !self.rendered {
            return Err(RenderError::NothingToExport);
        }
        let bytes = self.surface.encode(format, quality)?;
        if bytes.is_empty() {
            return Err(RenderError::EmptyExport);
        }
        Ok(bytes)
    }

    /// Encode, then splice `exif` over the encoder's APP0 when the output is JPEG.
    ///
    /// An empty `exif` or `keep_exif = false` returns the plain encoding.
    pub fn export_with_exif(&self, options: &ExportOptions, exif: &[u8]) -> Result<Vec<u8>> {
        let bytes = self.export(options.format, options.quality)?;
        if !options.keep_exif || exif.is_empty() || !options.format.carries_exif() {
            return Ok(bytes);
        }
        log::debug!("Reinserting {} bytes of EXIF", exif.len());
        Ok(reinsert_exif_segment(&bytes, exif))
    }
}
