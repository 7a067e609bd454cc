//! CLI output formatting.
//!
//! Every command prints through a `format_*` function that returns
//! `Vec<String>` and a `print_*` wrapper that writes the lines to stdout.
//! Format functions are pure, so tests assert on the exact lines.
//!
//! # Output Format
//!
//! ## Resolve
//!
//! ```text
//! Photo   4000 x 3000
//! Canvas  4000 x 3320
//! Border  0 / 0 / 0 / 320 px (left / top / right / bottom)
//!         0 / 0 / 0 / 0.08 of width
//! Logo    1904, 3064  192 x 192
//! Text
//!     001 60, 3064  96px bolder left  SONY ILCE-7RM3A
//!     002 60, 3192  80px normal left  (empty)
//! ```
//!
//! ## Exif
//!
//! ```text
//! brand         SONY
//! model         ILCE-7RM3A
//! captureTime   (empty)
//! ```

use crate::exif::ExifFieldMap;
use crate::imaging::ExportFormat;
use crate::presets::{self, DEFAULT_PRESET};
use crate::template;
use crate::types::{BorderFraction, ResolvedConfig};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn or_empty(value: &str) -> &str {
    if value.is_empty() { "(empty)" } else { value }
}

/// Shortest decimal form of a fraction: `0.08`, `0`, `0.015`.
fn format_fraction(value: f64) -> String {
    let s = format!("{:.4}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Name of the downloaded file: the source name up to its last `.`, then
/// `-watermark` and the export format's extension.
///
/// ```text
/// DSC01234.JPG  + png  →  DSC01234-watermark.png
/// ```
pub fn watermark_file_name(name: &str, format: ExportFormat) -> String {
    let stem = match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    };
    format!("{}-watermark.{}", stem, format.extension())
}

// ============================================================================
// resolve
// ============================================================================

/// The info panel: resolved geometry plus each text item as it will read.
pub fn format_resolved(
    resolved: &ResolvedConfig,
    border_fractions: &BorderFraction,
    fields: &ExifFieldMap,
) -> Vec<String> {
    let mut lines = Vec::new();
    let b = &resolved.border;

    lines.push(format!(
        "Photo   {} x {}",
        resolved.photo.width, resolved.photo.height
    ));
    lines.push(format!(
        "Canvas  {} x {}",
        resolved.canvas.width, resolved.canvas.height
    ));
    lines.push(format!(
        "Border  {} / {} / {} / {} px (left / top / right / bottom)",
        b.left, b.top, b.right, b.bottom
    ));
    let f = border_fractions;
    lines.push(format!(
        "        {} / {} / {} / {} of width",
        format_fraction(f.left),
        format_fraction(f.top),
        format_fraction(f.right),
        format_fraction(f.bottom)
    ));

    let logo = &resolved.logo;
    if logo.is_empty() {
        lines.push("Logo    none".to_string());
    } else {
        lines.push(format!(
            "Logo    {}, {}  {} x {}",
            logo.x, logo.y, logo.width, logo.height
        ));
    }

    if resolved.text_items.is_empty() {
        return lines;
    }
    lines.push("Text".to_string());
    for (i, item) in resolved.text_items.iter().enumerate() {
        let text = template::render(&item.template, fields);
        lines.push(format!(
            "    {} {}, {}  {}px {} {}  {}",
            format_index(i + 1),
            item.position.x,
            item.position.y,
            item.font_size_px,
            item.font_weight.as_css(),
            item.align.as_str(),
            or_empty(text.trim()),
        ));
    }
    lines
}

pub fn print_resolved(resolved: &ResolvedConfig, border: &BorderFraction, fields: &ExifFieldMap) {
    for line in format_resolved(resolved, border, fields) {
        println!("{}", line);
    }
}

// ============================================================================
// exif
// ============================================================================

/// One line per display field, in template placeholder order.
pub fn format_fields(fields: &ExifFieldMap) -> Vec<String> {
    fields
        .iter()
        .map(|(field, value)| format!("{:<13} {}", field.name(), or_empty(value)))
        .collect()
}

pub fn print_fields(fields: &ExifFieldMap) {
    for line in format_fields(fields) {
        println!("{}", line);
    }
}

// ============================================================================
// presets
// ============================================================================

pub fn format_presets() -> Vec<String> {
    presets::PRESETS
        .iter()
        .map(|p| {
            let marker = if p.name == DEFAULT_PRESET { "*" } else { " " };
            format!("{} {:<12} {}", marker, p.name, p.description)
        })
        .collect()
}

pub fn print_presets() {
    for line in format_presets() {
        println!("{}", line);
    }
}

// ============================================================================
// render
// ============================================================================

/// Summary of a finished export.
///
/// ```text
/// DSC01234-watermark.jpg → out/DSC01234-watermark.jpg
///     4000 x 3320 image/jpeg, 2.4 MB, EXIF kept (12.1 kB)
/// ```
pub fn format_export(
    name: &str,
    path: &Path,
    resolved: &ResolvedConfig,
    format: ExportFormat,
    bytes: usize,
    exif_bytes: usize,
) -> Vec<String> {
    let exif = if exif_bytes > 0 {
        format!("EXIF kept ({})", format_bytes(exif_bytes))
    } else {
        "no EXIF".to_string()
    };
    vec![
        format!("{} → {}", name, path.display()),
        format!(
            "    {} x {} {}, {}, {}",
            resolved.canvas.width,
            resolved.canvas.height,
            format.mime_type(),
            format_bytes(bytes),
            exif
        ),
    ]
}

pub fn print_export(
    name: &str,
    path: &Path,
    resolved: &ResolvedConfig,
    format: ExportFormat,
    bytes: usize,
    exif_bytes: usize,
) {
    for line in format_export(name, path, resolved, format, bytes, exif_bytes) {
        println!("{}", line);
    }
}

fn format_bytes(n: usize) -> String {
    match n {
        0..1_000 => format!("{} B", n),
        1_000..1_000_000 => format!("{:.1} kB", n as f64 / 1e3),
        _ => format!("{:.1} MB", n as f64 / 1e6),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::calculations::resolve;
    use crate::types::PixelSize;

    fn sony() -> ExifFieldMap {
        ExifFieldMap {
            brand: "SONY".into(),
            model: "ILCE-7RM3A".into(),
            iso: "1000".into(),
            ..ExifFieldMap::default()
        }
    }

    #[test]
    fn watermark_name_replaces_the_extension() {
        assert_eq!(
            watermark_file_name("DSC01234.JPG", ExportFormat::Png),
            "DSC01234-watermark.png"
        );
        assert_eq!(
            watermark_file_name("trip.2021.jpeg", ExportFormat::Jpeg),
            "trip.2021-watermark.jpg"
        );
    }

    #[test]
    fn watermark_name_without_extension() {
        assert_eq!(
            watermark_file_name("photo", ExportFormat::Jpeg),
            "photo-watermark.jpg"
        );
    }

    #[test]
    fn format_fraction_trims_zeros() {
        assert_eq!(format_fraction(0.08), "0.08");
        assert_eq!(format_fraction(0.0), "0");
        assert_eq!(format_fraction(1.0), "1");
        assert_eq!(format_fraction(0.015), "0.015");
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(999), "999 B");
        assert_eq!(format_bytes(12_100), "12.1 kB");
        assert_eq!(format_bytes(2_400_000), "2.4 MB");
    }

    #[test]
    fn resolved_panel_for_the_reference_photo() {
        let template = presets::bottom_band();
        let resolved = resolve(&template, PixelSize::new(4000, 3000), PixelSize::ZERO);
        let lines = format_resolved(&resolved, &template.border, &sony());

        assert_eq!(lines[0], "Photo   4000 x 3000");
        assert_eq!(lines[1], "Canvas  4000 x 3320");
        assert_eq!(lines[2], "Border  0 / 0 / 0 / 320 px (left / top / right / bottom)");
        assert_eq!(lines[3], "        0 / 0 / 0 / 0.08 of width");
        assert_eq!(lines[4], "Logo    none");
        assert_eq!(lines[5], "Text");
        assert_eq!(lines[7], "    002 60, 3064  96px bolder left  SONY ILCE-7RM3A");
        assert!(lines[8].ends_with("(empty)"), "{}", lines[8]);
        assert_eq!(lines.len(), 11);
    }

    #[test]
    fn resolved_panel_shows_logo() {
        let template = presets::bottom_band();
        let resolved = resolve(
            &template,
            PixelSize::new(1000, 500),
            PixelSize::new(200, 100),
        );
        let lines = format_resolved(&resolved, &template.border, &ExifFieldMap::default());
        assert_eq!(lines[4], "Logo    452, 516  96 x 48");
    }

    #[test]
    fn fields_list_every_placeholder() {
        let lines = format_fields(&sony());
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "brand         SONY");
        assert_eq!(lines[2], "lens          (empty)");
        assert_eq!(lines[8], "iso           1000");
    }

    #[test]
    fn presets_mark_the_default() {
        let lines = format_presets();
        assert_eq!(lines.len(), presets::PRESETS.len());
        assert!(lines.iter().any(|l| l.starts_with("* bottom-band")));
        assert!(lines.iter().any(|l| l.starts_with("  framed")));
    }

    #[test]
    fn export_summary() {
        let resolved = ResolvedConfig {
            canvas: PixelSize::new(4000, 3320),
            ..ResolvedConfig::default()
        };
        let lines = format_export(
            "a-watermark.jpg",
            Path::new("out/a-watermark.jpg"),
            &resolved,
            ExportFormat::Jpeg,
            2_400_000,
            12_100,
        );
        assert_eq!(lines[0], "a-watermark.jpg → out/a-watermark.jpg");
        assert_eq!(lines[1], "    4000 x 3320 image/jpeg, 2.4 MB, EXIF kept (12.1 kB)");
    }
}
