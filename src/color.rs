use std::collections::BTreeMap;

use eframe::egui::Color32;
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
// Color mapping: series label → Color32
// ---------------------------------------------------------------------------

/// Maps series labels (countries or income groups) to distinct colours.
///
/// Built from the full label set of the table, so a country keeps its colour
/// however the selection changes.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from a sorted set of labels.
    pub fn new<'a>(labels: impl ExactSizeIterator<Item = &'a String>) -> Self {
        let palette = generate_palette(labels.len());
        let mapping = labels
            .zip(palette)
            .map(|(label, c)| (label.clone(), c))
            .collect();
        ColorMap { mapping }
    }

    /// Look up the colour for a label; unknown labels are grey.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping.get(label).copied().unwrap_or(Color32::GRAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_is_distinct() {
        let palette = generate_palette(6);
        assert_eq!(palette.len(), 6);
        for (i, a) in palette.iter().enumerate() {
            for b in &palette[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn test_unknown_label_is_grey() {
        let labels = vec!["Chad".to_string(), "India".to_string()];
        let map = ColorMap::new(labels.iter());
        assert_ne!(map.color_for("Chad"), map.color_for("India"));
        assert_eq!(map.color_for("Atlantis"), Color32::GRAY);
    }
}
