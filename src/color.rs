use std::collections::BTreeMap;

use eframe::egui::{Color32, IconData};
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels of a categorical column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let labels: Vec<&str> = labels.into_iter().collect();
        let palette = generate_palette(labels.len());
        let mapping = labels
            .into_iter()
            .zip(palette)
            .map(|(label, c)| (label.to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Window icon
// ---------------------------------------------------------------------------

/// A small bar-chart glyph: `bars` columns of rising height on a
/// transparent background, coloured from the palette.
pub fn bar_chart_icon(size: u32, bars: usize) -> IconData {
    let bars = bars.max(1);
    let colors = generate_palette(bars);
    let mut rgba = vec![0u8; (size * size * 4) as usize];
    let slot = size as usize / bars;
    let margin = (slot / 6).max(1);

    for (i, color) in colors.iter().enumerate() {
        let height = size as usize * (i + 1) / bars;
        let x0 = i * slot + margin;
        let x1 = ((i + 1) * slot).saturating_sub(margin);
        for y in (size as usize - height)..size as usize {
            for x in x0..x1.min(size as usize) {
                let px = (y * size as usize + x) * 4;
                rgba[px..px + 4].copy_from_slice(&color.to_array());
            }
        }
    }

    IconData {
        rgba,
        width: size,
        height: size,
    }
}
