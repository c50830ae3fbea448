use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            RGBColor(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Relevance colours: classification → RGBColor
// ---------------------------------------------------------------------------

/// Point colours for the two relevance classes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelevanceColors {
    pub relevant: RGBColor,
    pub other: RGBColor,
}

impl Default for RelevanceColors {
    fn default() -> Self {
        // Hue 0 (red) for relevant proteins, hue 180 (teal) for the rest.
        let palette = generate_palette(2);
        RelevanceColors {
            relevant: palette[0],
            other: palette[1],
        }
    }
}

impl RelevanceColors {
    /// Legend entries (class, label, colour), background class first.
    pub fn legend_entries(&self) -> [(bool, &'static str, RGBColor); 2] {
        [
            (false, "other", self.other),
            (true, "clinically relevant", self.relevant),
        ]
    }
}
