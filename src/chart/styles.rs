use plotters::style::{HSLColor, RGBAColor};

/// Chart theme configuration
#[derive(Clone, Debug)]
pub struct ChartTheme {
    pub background_color: RGBAColor,
    pub text_color: RGBAColor,
    pub grid_color: RGBAColor,
    pub axis_color: RGBAColor,
}

impl Default for ChartTheme {
    fn default() -> Self {
        Self {
            background_color: RGBAColor(255, 255, 255, 1.0),
            text_color: RGBAColor(102, 102, 102, 1.0),
            grid_color: RGBAColor(0, 0, 0, 0.05),
            axis_color: RGBAColor(0, 0, 0, 0.1),
        }
    }
}

/// Chart style configuration
#[derive(Clone, Debug)]
pub struct ChartStyle {
    pub font_size: u32,
    pub margin: u32,
    pub x_label_area_size: u32,
    pub y_label_area_size: u32,
    /// Fraction of each slot a bar occupies
    pub bar_fraction: f64,
    /// Longest label drawn on the category axis before truncation
    pub max_label_chars: usize,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            font_size: 12,
            margin: 10,
            x_label_area_size: 50,
            y_label_area_size: 160,
            bar_fraction: 0.8,
            max_label_chars: 28,
        }
    }
}

/// One color per bar, walking the hue circle by the golden angle so adjacent
/// bars stay distinguishable at any count.
pub fn bar_palette(count: usize) -> Vec<HSLColor> {
    (0..count)
        .map(|i| HSLColor((i as f64 * 137.508) % 360.0 / 360.0, 0.75, 0.60))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_one_color_per_bar() {
        assert_eq!(bar_palette(0).len(), 0);
        assert_eq!(bar_palette(30).len(), 30);
        let palette = bar_palette(2);
        assert!(palette[0].0 != palette[1].0);
    }
}
