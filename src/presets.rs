//! Built-in layout presets.
//!
//! Each preset is a complete [`LayoutTemplate`]; `config.toml` picks one by
//! name and may override any part of it under `[layout]`.

use crate::types::{
    BorderFraction, Color, FontWeight, LayoutTemplate, TextAlign, TextBaseline, TextItemTemplate,
};

pub const DEFAULT_PRESET: &str = "bottom-band";

pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> LayoutTemplate,
}

impl Preset {
    pub fn template(&self) -> LayoutTemplate {
        (self.build)()
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "none",
        description: "No border; white copyright in the bottom-right corner of the photo",
        build: none,
    },
    Preset {
        name: "bottom-band",
        description: "8% white band below the photo with camera, lens and exposure lines",
        build: bottom_band,
    },
    Preset {
        name: "framed",
        description: "8% white frame on every side, same text as bottom-band",
        build: framed,
    },
];

/// Look a preset up by name.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.iter().map(|p| p.name)
}

fn text(
    template: &str,
    (x_fraction, y_fraction): (f64, f64),
    font_size_fraction: f64,
    color: &str,
    font_weight: FontWeight,
    align: TextAlign,
) -> TextItemTemplate {
    TextItemTemplate {
        template: template.to_string(),
        x_fraction,
        y_fraction,
        font_size_fraction,
        color: Color::literal(color),
        font_weight,
        baseline: TextBaseline::Top,
        align,
    }
}

/// The five lines shared by the banded presets.
fn exposure_lines() -> Vec<TextItemTemplate> {
    use FontWeight::{Bolder, Normal};
    use TextAlign::{Left, Right};
    vec![
        // Over the photo, just above its bottom edge.
        text("©{{copyright}}", (0.985, -0.42), 0.30, "#fff", Bolder, Right),
        text("{{brand}} {{model}}", (0.015, 0.20), 0.30, "#000", Bolder, Left),
        text("{{captureTime}}", (0.015, 0.60), 0.25, "#000", Normal, Left),
        text("{{lens}}", (0.985, 0.20), 0.30, "#000", Bolder, Right),
        text(
            "{{aperture}} {{shutterSpeed}} {{focalLength}} ISO{{iso}}",
            (0.985, 0.60),
            0.25,
            "#000",
            Normal,
            Right,
        ),
    ]
}

pub fn none() -> LayoutTemplate {
    LayoutTemplate {
        border: BorderFraction::default(),
        text_items: vec![TextItemTemplate {
            baseline: TextBaseline::Bottom,
            ..text(
                "©{{copyright}}",
                (1.0, 1.0),
                1.0,
                "#fff",
                FontWeight::Bolder,
                TextAlign::Right,
            )
        }],
        ..LayoutTemplate::default()
    }
}

pub fn bottom_band() -> LayoutTemplate {
    LayoutTemplate {
        border: BorderFraction::bottom(0.08),
        text_items: exposure_lines(),
        ..LayoutTemplate::default()
    }
}

pub fn framed() -> LayoutTemplate {
    LayoutTemplate {
        border: BorderFraction::uniform(0.08),
        text_items: exposure_lines(),
        ..LayoutTemplate::default()
    }
}
