//! Layout resolution: fractions of the photo width → pixel geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! Every fraction is multiplied by the photo **width**, never its height, so
//! a template looks the same on landscape and portrait photos. Rounding is
//! always `floor`, and non-finite intermediates collapse to 0, so resolving
//! the same inputs twice yields identical geometry.
//!
//! ```text
//!            border.left                    border.right
//!           ┌───┬────────────────────────────┬───┐
//! border.top│   │                            │   │
//!           │   │           photo            │   │
//!           │   │                            │   │   ← text with y_fraction < 0
//!           ├───┴────────────────────────────┴───┤ ← photo bottom edge
//!           │  text           [logo]         text│   bottom band
//!           └────────────────────────────────────┘
//! ```

use crate::types::{
    BorderFraction, BorderInset, LayoutTemplate, LogoPlacement, PixelSize, ResolvedConfig,
    TextItem, TextItemTemplate, TextPosition,
};

/// Font size used when an item's computed size is not positive, as a
/// fraction of photo width.
pub const FALLBACK_FONT_FRACTION: f64 = 0.02;

/// `floor`, with NaN and infinities mapped to 0 and the result clamped to `i32`.
fn floor_px(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    value.floor().clamp(i32::MIN as f64, i32::MAX as f64) as i64
}

fn to_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn to_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// `floor(photo_width * fraction)` for each side.
pub fn border_from_fractions(photo_width: u32, fractions: &BorderFraction) -> BorderInset {
    let side = |f: f64| to_u32(floor_px(photo_width as f64 * f));
    BorderInset {
        left: side(fractions.left),
        top: side(fractions.top),
        right: side(fractions.right),
        bottom: side(fractions.bottom),
    }
}

/// The scalar text sizes and vertical offsets are measured against.
///
/// With a unified `font_size_fraction` this is `photo.width * fraction`;
/// otherwise it is the resolved (unpadded) bottom border.
pub fn font_size_base(template: &LayoutTemplate, photo: PixelSize, border: &BorderInset) -> f64 {
    match template.font_size_fraction {
        Some(fraction) => photo.width as f64 * fraction,
        None => border.bottom as f64,
    }
}

/// Resolve one text item against the unpadded border.
pub fn resolve_text_item(
    item: &TextItemTemplate,
    photo: PixelSize,
    border: &BorderInset,
    base: f64,
) -> TextItem {
    let mut font_size = floor_px(base * item.font_size_fraction);
    if font_size <= 0 {
        font_size = floor_px(photo.width as f64 * FALLBACK_FONT_FRACTION);
    }

    let x = border.left as i64 + floor_px(photo.width as f64 * item.x_fraction);
    let y = border.top as i64 + floor_px(base * item.y_fraction) + photo.height as i64;

    TextItem {
        position: TextPosition {
            x: to_i32(x),
            y: to_i32(y),
        },
        template: item.template.clone(),
        color: item.color.to_css_string(),
        font_size_px: to_u32(font_size).max(1),
        font_weight: item.font_weight,
        baseline: item.baseline,
        align: item.align,
    }
}

/// Scale the logo into its band below the photo, centred horizontally.
///
/// `band_fraction` is the band height as a fraction of photo width and
/// `padding` the share of the band left empty above and below the logo.
pub fn resolve_logo(
    photo: PixelSize,
    logo: PixelSize,
    border: &BorderInset,
    band_fraction: f64,
    padding: f64,
) -> LogoPlacement {
    if logo.is_empty() || photo.is_empty() {
        return LogoPlacement::default();
    }
    let band = photo.width as f64 * band_fraction;
    let content = 1.0 - 2.0 * padding;
    if !band.is_finite() || !content.is_finite() {
        return LogoPlacement::default();
    }

    let height = floor_px(band * content).max(0);
    let width = floor_px(height as f64 / logo.height as f64 * logo.width as f64).max(0);
    let x = floor_px(border.left as f64 + photo.width as f64 / 2.0 - width as f64 / 2.0);
    let y = floor_px(border.top as f64 + photo.height as f64 + band * padding);

    LogoPlacement {
        x: to_i32(x),
        y: to_i32(y),
        width: to_u32(width),
        height: to_u32(height),
    }
}

/// Resolve a template for one photo/logo size pair.
///
/// Padding is applied last: it grows the reported border and canvas but
/// never moves the logo or the text.
pub fn resolve(template: &LayoutTemplate, photo: PixelSize, logo: PixelSize) -> ResolvedConfig {
    let border = border_from_fractions(photo.width, &template.border);
    let base = font_size_base(template, photo, &border);

    let text_items = template
        .text_items
        .iter()
        .map(|item| resolve_text_item(item, photo, &border, base))
        .collect();

    let band_fraction = template
        .logo_height_fraction
        .unwrap_or(template.border.bottom);
    let logo = resolve_logo(photo, logo, &border, band_fraction, template.logo_padding);

    let border = match &template.padding {
        Some(padding) => {
            let extra = border_from_fractions(photo.width, padding);
            BorderInset {
                left: border.left.saturating_add(extra.left),
                top: border.top.saturating_add(extra.top),
                right: border.right.saturating_add(extra.right),
                bottom: border.bottom.saturating_add(extra.bottom),
            }
        }
        None => border,
    };

    ResolvedConfig {
        photo,
        canvas: border.canvas_size(photo),
        background: template.background.to_css_string(),
        border,
        logo,
        text_items,
    }
}
