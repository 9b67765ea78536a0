use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::model::{MetadataValue, Vocalization, VocalizationDataset};

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
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Categorical mapping: value → Color32
// ---------------------------------------------------------------------------

/// Maps unique values of a categorical column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<MetadataValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column from its unique values.
    pub fn new(column: &str, unique_values: &BTreeSet<MetadataValue>) -> Self {
        let palette = generate_palette(unique_values.len());
        let mapping: BTreeMap<MetadataValue, Color32> = unique_values
            .iter()
            .cloned()
            .zip(palette)
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, value: &MetadataValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Legend entries (value → colour) in sorted value order.
    pub fn legend_entries(&self) -> Vec<(MetadataValue, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (v.clone(), *c))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Continuous mapping: number → Color32
// ---------------------------------------------------------------------------

/// Plasma-like gradient stops, dark to bright.
const GRADIENT_STOPS: [(u8, u8, u8); 6] = [
    (13, 8, 135),
    (106, 0, 168),
    (177, 42, 144),
    (225, 100, 98),
    (252, 166, 54),
    (240, 249, 33),
];

/// Maps a numeric range onto a continuous gradient.
#[derive(Debug, Clone)]
pub struct GradientScale {
    pub column: String,
    pub min: f64,
    pub max: f64,
    stops: Vec<LinSrgb>,
    missing_color: Color32,
}

impl GradientScale {
    pub fn new(column: &str, min: f64, max: f64) -> Self {
        let stops = GRADIENT_STOPS
            .iter()
            .map(|&(r, g, b)| Srgb::new(r, g, b).into_format::<f32>().into_linear())
            .collect();
        GradientScale {
            column: column.to_string(),
            min,
            max,
            stops,
            missing_color: Color32::GRAY,
        }
    }

    /// Position of `value` in the range, clamped to `0.0..=1.0`.
    pub fn normalize(&self, value: f64) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0) as f32
    }

    /// Colour at fraction `t` of the gradient.
    pub fn color_at(&self, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let segments = self.stops.len() - 1;
        let scaled = t * segments as f32;
        let idx = (scaled.floor() as usize).min(segments - 1);
        let local = scaled - idx as f32;
        let mixed = self.stops[idx].mix(self.stops[idx + 1], local);
        to_color32(Srgb::from_linear(mixed))
    }

    pub fn color_for(&self, value: &MetadataValue) -> Color32 {
        match value.as_f64() {
            Some(v) if v.is_finite() => self.color_at(self.normalize(v)),
            _ => self.missing_color,
        }
    }
}

// ---------------------------------------------------------------------------
// ColorScale – whichever mapping the panel currently uses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum ColorScale {
    Categorical(ColorMap),
    Continuous(GradientScale),
}

impl ColorScale {
    /// Discrete palette over the column's unique values.
    pub fn categorical(dataset: &VocalizationDataset, column: &str) -> Self {
        let empty = BTreeSet::new();
        let values = dataset.unique_values.get(column).unwrap_or(&empty);
        ColorScale::Categorical(ColorMap::new(column, values))
    }

    /// Gradient over the column's numeric range.
    pub fn continuous(dataset: &VocalizationDataset, column: &str) -> Self {
        let (min, max) = dataset.numeric_range(column).unwrap_or((0.0, 0.0));
        ColorScale::Continuous(GradientScale::new(column, min, max))
    }

    pub fn column(&self) -> &str {
        match self {
            ColorScale::Categorical(map) => &map.column,
            ColorScale::Continuous(scale) => &scale.column,
        }
    }

    pub fn color_for_row(&self, row: &Vocalization) -> Color32 {
        let value = row.feature(self.column()).unwrap_or(&MetadataValue::Null);
        match self {
            ColorScale::Categorical(map) => map.color_for(value),
            ColorScale::Continuous(scale) => scale.color_for(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colours() {
        let colors = generate_palette(8);
        assert_eq!(colors.len(), 8);
        let unique: BTreeSet<[u8; 4]> = colors.iter().map(|c| c.to_array()).collect();
        assert_eq!(unique.len(), 8);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_category_is_gray() {
        let mut values = BTreeSet::new();
        values.insert(MetadataValue::String("female".into()));
        values.insert(MetadataValue::String("male".into()));
        let map = ColorMap::new("Gender", &values);

        assert_ne!(
            map.color_for(&MetadataValue::String("female".into())),
            Color32::GRAY
        );
        assert_eq!(
            map.color_for(&MetadataValue::String("other".into())),
            Color32::GRAY
        );
        assert_eq!(map.legend_entries().len(), 2);
    }

    #[test]
    fn gradient_endpoints_match_stops() {
        let scale = GradientScale::new("loudness", -10.0, 10.0);
        assert_eq!(scale.color_at(0.0), Color32::from_rgb(13, 8, 135));
        assert_eq!(scale.color_at(1.0), Color32::from_rgb(240, 249, 33));
        assert_eq!(
            scale.color_for(&MetadataValue::Float(-50.0)),
            scale.color_at(0.0)
        );
        assert_eq!(scale.normalize(0.0), 0.5);
    }

    #[test]
    fn gradient_handles_flat_range_and_nulls() {
        let scale = GradientScale::new("flat", 3.0, 3.0);
        assert_eq!(scale.normalize(3.0), 0.5);
        assert_eq!(scale.color_for(&MetadataValue::Null), Color32::GRAY);
        assert_eq!(
            scale.color_for(&MetadataValue::String("n/a".into())),
            Color32::GRAY
        );
    }
}
