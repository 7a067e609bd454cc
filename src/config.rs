//! Frame configuration module.
//!
//! Handles loading, validating, and merging the TOML config file. The layout
//! is layered: a built-in preset is the base and the file's `[layout]` table
//! overrides it key by key.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! preset = "bottom-band"    # none | bottom-band | framed
//! debounce_ms = 100         # Quiet period before a live edit re-renders
//!
//! [font]
//! family = "Consolas"       # Family named in the CSS font string
//! # path = "/path/to/Mono.ttf"  # Font file; omit to probe system fonts
//!
//! [logos]                   # Camera brand -> logo file, matched case-insensitively
//! sony = "logos/sony.png"
//!
//! [export]
//! format = "jpg"            # jpg | png
//! quality = 90              # JPEG quality (1-100)
//! keep_exif = true          # Copy the photo's EXIF into JPEG output
//!
//! [layout]                  # Overrides on top of the preset
//! background = "#fff"
//! logo_padding = 0.2
//!
//! [layout.border]           # Fractions of the photo width, each 0-1
//! bottom = 0.1
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want. Tables merge
//! key by key, arrays (such as `layout.text_items`) replace the preset's
//! array as a whole.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{ExportFormat, ExportOptions, MONOSPACE_FAMILY, Quality};
use crate::presets::{self, DEFAULT_PRESET};
use crate::types::{BorderFraction, LayoutTemplate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Everything `exif-frame` reads from its config file.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    /// Built-in preset used as the base for `layout`.
    pub preset: String,
    /// Milliseconds of quiet before a live edit triggers a render.
    pub debounce_ms: u64,
    pub font: FontConfig,
    pub export: ExportConfig,
    /// Logo file per camera brand, used when no logo is given explicitly.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub logos: BTreeMap<String, PathBuf>,
    pub layout: LayoutTemplate,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            preset: DEFAULT_PRESET.to_string(),
            debounce_ms: 100,
            font: FontConfig::default(),
            export: ExportConfig::default(),
            logos: BTreeMap::new(),
            layout: presets::bottom_band(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    pub family: String,
    /// TrueType/OpenType file. When absent, system monospace fonts are probed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: MONOSPACE_FAMILY.to_string(),
            path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub format: ExportFormat,
    pub quality: u32,
    pub keep_exif: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            quality: Quality::default().value(),
            keep_exif: true,
        }
    }
}

impl ExportConfig {
    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            format: self.format,
            quality: Quality::new(self.quality),
            keep_exif: self.keep_exif,
        }
    }
}

fn check_finite(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{name} must be a finite number")))
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::Validation(format!("{name} must not be negative")));
    }
    Ok(())
}

/// Largest border or padding side, as a multiple of the photo width.
pub const MAX_BORDER_FRACTION: f64 = 1.0;

fn check_border(name: &str, border: &BorderFraction) -> Result<(), ConfigError> {
    for (side, value) in border.sides() {
        let name = format!("{name}.{side}");
        check_non_negative(&name, value)?;
        if value > MAX_BORDER_FRACTION {
            return Err(ConfigError::Validation(format!(
                "{name} must be at most {MAX_BORDER_FRACTION} (a fraction of the photo width)"
            )));
        }
    }
    Ok(())
}

impl FrameConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.export.quality) {
            return Err(ConfigError::Validation(
                "export.quality must be 1-100".into(),
            ));
        }
        if self.font.family.trim().is_empty() {
            return Err(ConfigError::Validation(
                "font.family must not be empty".into(),
            ));
        }

        let layout = &self.layout;
        check_border("layout.border", &layout.border)?;
        if let Some(padding) = &layout.padding {
            check_border("layout.padding", padding)?;
        }
        if let Some(fraction) = layout.logo_height_fraction {
            check_non_negative("layout.logo_height_fraction", fraction)?;
        }
        if let Some(fraction) = layout.font_size_fraction {
            check_non_negative("layout.font_size_fraction", fraction)?;
        }
        check_finite("layout.logo_padding", layout.logo_padding)?;
        if !(0.0..0.5).contains(&layout.logo_padding) {
            return Err(ConfigError::Validation(
                "layout.logo_padding must be in [0, 0.5)".into(),
            ));
        }
        for (i, item) in layout.text_items.iter().enumerate() {
            let name = format!("layout.text_items[{i}]");
            check_finite(&format!("{name}.x_fraction"), item.x_fraction)?;
            check_finite(&format!("{name}.y_fraction"), item.y_fraction)?;
            check_non_negative(
                &format!("{name}.font_size_fraction"),
                item.font_size_fraction,
            )?;
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// The configured logo for an EXIF brand such as `SONY`.
    pub fn logo_for_brand(&self, brand: &str) -> Option<&Path> {
        let brand = brand.trim();
        if brand.is_empty() {
            return None;
        }
        self.logos
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(brand))
            .map(|(_, path)| path.as_path())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// The stock config with `preset`'s layout, as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn preset_defaults_value(preset: &str) -> Result<toml::Value, ConfigError> {
    let found = presets::find(preset).ok_or_else(|| ConfigError::UnknownPreset(preset.into()))?;
    let config = FrameConfig {
        preset: preset.to_string(),
        layout: found.template(),
        ..FrameConfig::default()
    };
    Ok(toml::Value::try_from(config)?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Pick the base preset, merge the overlay onto it, then deserialize and validate.
///
/// The preset is `preset_override` if given, else the overlay's `preset`
/// key, else [`DEFAULT_PRESET`].
pub fn resolve_config(
    overlay: Option<toml::Value>,
    preset_override: Option<&str>,
) -> Result<FrameConfig, ConfigError> {
    let preset = preset_override
        .map(str::to_string)
        .or_else(|| {
            overlay
                .as_ref()
                .and_then(|v| v.get("preset"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_PRESET.to_string());

    let base = preset_defaults_value(&preset)?;
    let mut merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    if let toml::Value::Table(table) = &mut merged {
        table.insert("preset".into(), toml::Value::String(preset));
    }

    let config: FrameConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path`, or stock defaults when there is none.
pub fn load_config(
    path: Option<&Path>,
    preset_override: Option<&str>,
) -> Result<FrameConfig, ConfigError> {
    let overlay = path.map(load_raw_config).transpose()?;
    resolve_config(overlay, preset_override)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# exif-frame configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Built-in layout used as the base for [layout]: none, bottom-band, framed.
preset = "bottom-band"

# Milliseconds of quiet before a live edit triggers a re-render.
debounce_ms = 100

# ---------------------------------------------------------------------------
# Text font
# ---------------------------------------------------------------------------
[font]
# Family named in the font string ("bolder 96px Consolas").
family = "Consolas"

# TrueType/OpenType file used to draw text. When omitted, common system
# monospace fonts (Consolas, DejaVu Sans Mono, Liberation Mono, Menlo) are
# probed and text is skipped with a warning if none is found.
# path = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf"

# ---------------------------------------------------------------------------
# Brand logos
# ---------------------------------------------------------------------------
# Logo drawn in the bottom band when none is passed on the command line,
# keyed by the photo's EXIF brand (case-insensitive).
#
# [logos]
# sony = "logos/sony.png"
# canon = "logos/canon.png"
# nikon = "logos/nikon.png"

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# jpg or png. Only JPEG output carries the photo's EXIF.
format = "jpg"

# JPEG quality (1 = worst, 100 = best).
quality = 90

# Copy the source photo's EXIF segment into JPEG output.
keep_exif = true

# ---------------------------------------------------------------------------
# Layout overrides
# ---------------------------------------------------------------------------
# Every length is a fraction of the photo WIDTH, on landscape and portrait
# photos alike. Anything set here overrides the preset; text_items replaces
# the preset's list as a whole.
#
# [layout]
# background = "#fff"            # CSS color, or { r = 255, g = 255, b = 255 }
# logo_padding = 0.2             # Empty share of the logo band, above and below
# logo_height_fraction = 0.08    # Logo band height (default: border.bottom)
# font_size_fraction = 0.024     # Single font-size base (default: border.bottom)
#
# [layout.border]                # Each side 0-1
# left = 0.0
# top = 0.0
# right = 0.0
# bottom = 0.08
#
# [layout.padding]               # Extra canvas margin; moves no text or logo
# left = 0.01
# top = 0.01
# right = 0.01
# bottom = 0.01
#
# [[layout.text_items]]
# template = "{{brand}} {{model}}"   # Fields: brand model lens copyright
#                                    # captureTime aperture shutterSpeed
#                                    # focalLength iso
# x_fraction = 0.015             # From the left border
# y_fraction = 0.2               # Below the photo, times the font-size base
# font_size_fraction = 0.3       # Times the font-size base
# color = "#000"
# font_weight = "bolder"         # normal | bold | bolder | lighter
# baseline = "top"               # top | middle | bottom | alphabetic | hanging | ideographic
# align = "left"                 # left | right | center | start | end
"##
}
