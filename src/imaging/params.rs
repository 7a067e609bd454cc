//! Parameter types for drawing and export.
//!
//! These structs describe *what* to draw or encode, not *how*. They are the
//! interface between the [`Compositor`](super::operations::Compositor) (which
//! decides what goes where) and a [`Surface`](super::backend::Surface)
//! (which does the actual pixel work). This separation allows swapping
//! surfaces (e.g. for testing with a mock) without changing render logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ExportFormat`]: JPEG or PNG, with MIME type and file extension.
//! - [`ExportOptions`]: Format, quality and whether to carry the source EXIF over.
//! - [`FontSpec`]: Weight, pixel size and family; renders to one CSS font string.
//! - [`TextStyle`]: A [`FontSpec`] plus color, alignment and baseline.

use crate::types::{FontWeight, TextAlign, TextBaseline, TextItem};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Font family used when the configuration names none.
pub const MONOSPACE_FAMILY: &str = "Consolas";

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
    #[serde(rename = "png")]
    Png,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Png => "png",
        }
    }

    /// Whether encoded output can carry a spliced APP1 segment.
    pub fn carries_exif(self) -> bool {
        self == ExportFormat::Jpeg
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "image/jpeg" => Ok(ExportFormat::Jpeg),
            "png" | "image/png" => Ok(ExportFormat::Png),
            other => Err(format!("unsupported export format '{other}' (use jpg or png)")),
        }
    }
}

/// Everything an export needs besides the rendered pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub quality: Quality,
    /// Splice the source photo's APP1 segment into JPEG output.
    pub keep_exif: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: Quality::default(),
            keep_exif: true,
        }
    }
}

/// A font request. The same spec is used to measure and to draw a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    pub weight: FontWeight,
    pub size_px: u32,
    pub family: String,
}

impl FontSpec {
    /// The CSS font shorthand, e.g. `bolder 96px Consolas`.
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight.as_css(), self.size_px, self.family)
    }
}

/// How one string is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextStyle {
    pub font: FontSpec,
    pub color: String,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl TextStyle {
    pub fn for_item(item: &TextItem, family: &str) -> Self {
        Self {
            font: FontSpec {
                weight: item.font_weight,
                size_px: item.font_size_px,
                family: family.to_string(),
            },
            color: item.color.clone(),
            align: item.align,
            baseline: item.baseline,
        }
    }
}
