//! Shared layout types.
//!
//! Two families live here:
//!
//! - The **authoring form** ([`LayoutTemplate`], [`TextItemTemplate`],
//!   [`BorderFraction`]): every length is a fraction of the photo width. It is
//!   what presets and `config.toml` describe and it never touches pixels.
//! - The **resolved form** ([`ResolvedConfig`], [`TextItem`], [`BorderInset`],
//!   [`LogoPlacement`]): absolute pixel geometry for one photo/logo size pair,
//!   produced by [`resolve`](crate::imaging::calculations::resolve) and consumed
//!   by the compositor.
//!
//! Both are plain immutable values. A resolved config is rebuilt whenever the
//! photo, the logo or the template changes; nothing mutates one in place.

use serde::{Deserialize, Serialize};

/// Vertical padding of the logo inside its band, as a ratio of the band height.
pub const DEFAULT_LOGO_PADDING: f64 = 0.20;

/// Dimensions of a bitmap or canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub const ZERO: PixelSize = PixelSize {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel insets: how far the canvas extends beyond the photo on each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderInset {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BorderInset {
    /// Canvas size for a photo framed by this border, saturating at `u32::MAX`.
    pub fn canvas_size(&self, photo: PixelSize) -> PixelSize {
        PixelSize {
            width: photo.width.saturating_add(self.left).saturating_add(self.right),
            height: photo.height.saturating_add(self.top).saturating_add(self.bottom),
        }
    }
}

/// Border insets expressed as fractions of the photo width.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BorderFraction {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BorderFraction {
    pub fn uniform(value: f64) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    pub fn bottom(value: f64) -> Self {
        Self {
            bottom: value,
            ..Self::default()
        }
    }

    pub(crate) fn sides(&self) -> [(&'static str, f64); 4] {
        [
            ("left", self.left),
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
        ]
    }
}

/// Absolute rectangle the logo bitmap is scaled into.
///
/// A zero width or height means no logo is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogoPlacement {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl LogoPlacement {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Absolute text anchor. `y` may be negative relative to the bottom band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Bolder,
    Lighter,
}

impl FontWeight {
    pub fn as_css(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
            FontWeight::Bolder => "bolder",
            FontWeight::Lighter => "lighter",
        }
    }

    /// Weights rendered with a faux-bold double strike.
    pub fn is_heavy(self) -> bool {
        matches!(self, FontWeight::Bold | FontWeight::Bolder)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    #[default]
    Top,
    Middle,
    Bottom,
    Alphabetic,
    Hanging,
    Ideographic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Start,
    End,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Center => "center",
            TextAlign::Start => "start",
            TextAlign::End => "end",
        }
    }
}

/// A color as authored: either a CSS string or picker components.
///
/// Only [`Color::to_css_string`] turns this into what the drawing layer sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Literal(String),
    Structured {
        r: u8,
        g: u8,
        b: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        a: Option<f32>,
    },
}

impl Color {
    pub fn literal(value: impl Into<String>) -> Self {
        Color::Literal(value.into())
    }

    /// Normalise to the literal string form (`#rrggbb` or `#rrggbbaa`).
    pub fn to_css_string(&self) -> String {
        match self {
            Color::Literal(s) => s.trim().to_string(),
            Color::Structured { r, g, b, a } => match a {
                Some(alpha) if *alpha < 1.0 => {
                    let a8 = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
                    format!("#{r:02x}{g:02x}{b:02x}{a8:02x}")
                }
                _ => format!("#{r:02x}{g:02x}{b:02x}"),
            },
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::literal("#fff")
    }
}

/// One text item in authoring form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextItemTemplate {
    /// Text with `{{field}}` placeholders.
    pub template: String,
    /// Horizontal offset from the left border, fraction of photo width.
    pub x_fraction: f64,
    /// Vertical offset below the photo, fraction of the font-size base.
    pub y_fraction: f64,
    /// Font size, fraction of the font-size base.
    pub font_size_fraction: f64,
    pub color: Color,
    pub font_weight: FontWeight,
    pub baseline: TextBaseline,
    pub align: TextAlign,
}

impl Default for TextItemTemplate {
    fn default() -> Self {
        Self {
            template: "{{brand}} {{model}}".to_string(),
            x_fraction: 0.015,
            y_fraction: 0.2,
            font_size_fraction: 0.3,
            color: Color::literal("#000"),
            font_weight: FontWeight::Normal,
            baseline: TextBaseline::Top,
            align: TextAlign::Left,
        }
    }
}

/// The percentage-based layout as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutTemplate {
    pub background: Color,
    pub border: BorderFraction,
    /// Extra border added to the final canvas only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<BorderFraction>,
    /// Logo band height as a fraction of photo width. Defaults to `border.bottom`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_height_fraction: Option<f64>,
    /// Empty space above and below the logo, as a ratio of the band.
    pub logo_padding: f64,
    /// When set, the font-size base is `photo.width * font_size_fraction`
    /// instead of the resolved bottom border.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size_fraction: Option<f64>,
    pub text_items: Vec<TextItemTemplate>,
}

impl Default for LayoutTemplate {
    fn default() -> Self {
        Self {
            background: Color::default(),
            border: BorderFraction::default(),
            padding: None,
            logo_height_fraction: None,
            logo_padding: DEFAULT_LOGO_PADDING,
            font_size_fraction: None,
            text_items: Vec::new(),
        }
    }
}

/// One resolved text item, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextItem {
    pub position: TextPosition,
    pub template: String,
    pub color: String,
    pub font_size_px: u32,
    pub font_weight: FontWeight,
    pub baseline: TextBaseline,
    pub align: TextAlign,
}

/// A [`LayoutTemplate`] resolved against a photo size and a logo size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub photo: PixelSize,
    pub canvas: PixelSize,
    pub background: String,
    pub border: BorderInset,
    pub logo: LogoPlacement,
    pub text_items: Vec<TextItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_color_normalises_to_hex() {
        let c = Color::Structured {
            r: 255,
            g: 16,
            b: 0,
            a: None,
        };
        assert_eq!(c.to_css_string(), "#ff1000");
    }

    #[test]
    fn structured_color_keeps_partial_alpha() {
        let c = Color::Structured {
            r: 0,
            g: 0,
            b: 0,
            a: Some(0.5),
        };
        assert_eq!(c.to_css_string(), "#00000080");
    }

    #[test]
    fn literal_color_is_trimmed() {
        assert_eq!(Color::literal("  red ").to_css_string(), "red");
    }

    #[test]
    fn color_deserializes_from_string_or_table() {
        #[derive(Deserialize)]
        struct Holder {
            a: Color,
            b: Color,
        }
        let h: Holder = toml::from_str(
            r##"
a = "#123456"
b = { r = 1, g = 2, b = 3 }
"##,
        )
        .unwrap();
        assert_eq!(h.a, Color::literal("#123456"));
        assert_eq!(h.b.to_css_string(), "#010203");
    }

    #[test]
    fn canvas_size_adds_border() {
        let border = BorderInset {
            left: 10,
            top: 20,
            right: 30,
            bottom: 40,
        };
        assert_eq!(
            border.canvas_size(PixelSize::new(100, 100)),
            PixelSize::new(140, 160)
        );
    }

    #[test]
    fn enums_use_css_spelling() {
        let item: TextItemTemplate = toml::from_str(
            r#"
font_weight = "bolder"
baseline = "alphabetic"
align = "end"
"#,
        )
        .unwrap();
        assert_eq!(item.font_weight, FontWeight::Bolder);
        assert_eq!(item.baseline, TextBaseline::Alphabetic);
        assert_eq!(item.align, TextAlign::End);
    }
}
