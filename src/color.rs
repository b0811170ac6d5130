use std::collections::HashMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Color palettes
// ---------------------------------------------------------------------------

/// Plotly's qualitative palette, the colours the lab sheet has always used.
pub const PLOTLY_PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x63, 0x6E, 0xFA),
    Color32::from_rgb(0xEF, 0x55, 0x3B),
    Color32::from_rgb(0x00, 0xCC, 0x96),
    Color32::from_rgb(0xAB, 0x63, 0xFA),
    Color32::from_rgb(0xFF, 0xA1, 0x5A),
    Color32::from_rgb(0x19, 0xD3, 0xF3),
    Color32::from_rgb(0xFF, 0x66, 0x92),
    Color32::from_rgb(0xB6, 0xE8, 0x80),
    Color32::from_rgb(0xFF, 0x97, 0xFF),
    Color32::from_rgb(0xFE, 0xCB, 0x52),
];

/// Used for any type without an assigned colour.
pub const FALLBACK_COLOR: Color32 = Color32::GRAY;

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

/// What happens once there are more blade types than palette entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteMode {
    /// Cycle through [`PLOTLY_PALETTE`] again.
    #[default]
    Wrap,
    /// Types past the end of [`PLOTLY_PALETTE`] are drawn grey.
    GreyFallback,
    /// Spread one hue per type around the colour wheel.
    Generated,
}

// ---------------------------------------------------------------------------
// Color assignment: blade type → Color32
// ---------------------------------------------------------------------------

/// Maps each blade type to a colour, shared by every chart of a render pass.
#[derive(Debug, Clone)]
pub struct ColorAssignment {
    /// Types in assignment order (case-insensitively sorted).
    order: Vec<String>,
    mapping: HashMap<String, Color32>,
    default_color: Color32,
}

impl ColorAssignment {
    /// Build the assignment from the full dataset's sorted type list.
    pub fn new(types: &[String], mode: PaletteMode) -> Self {
        let colors: Vec<Option<Color32>> = match mode {
            PaletteMode::Wrap => (0..types.len())
                .map(|i| Some(PLOTLY_PALETTE[i % PLOTLY_PALETTE.len()]))
                .collect(),
            PaletteMode::GreyFallback => (0..types.len())
                .map(|i| PLOTLY_PALETTE.get(i).copied())
                .collect(),
            PaletteMode::Generated => generate_palette(types.len()).into_iter().map(Some).collect(),
        };

        let mapping = types
            .iter()
            .zip(colors)
            .filter_map(|(t, c)| c.map(|c| (t.clone(), c)))
            .collect();

        ColorAssignment {
            order: types.to_vec(),
            mapping,
            default_color: FALLBACK_COLOR,
        }
    }

    /// Look up the colour for a blade type.
    pub fn color_for(&self, blade_type: &str) -> Color32 {
        self.mapping
            .get(blade_type)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (type → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.order
            .iter()
            .map(|t| (t.clone(), self.color_for(t)))
            .collect()
    }
}
