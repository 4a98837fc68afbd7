use std::str::FromStr;

use palette::{Srgb, Srgba, WithAlpha};

use crate::config::{ConfigError, MapConfig};

/// How a line layer is drawn on the map surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Srgba<f32>,
    pub weight_pixels: f32,
}

impl LineStyle {
    pub fn solid(color: Srgb<u8>, weight_pixels: f32) -> Self {
        Self {
            color: color.into_format::<f32>().with_alpha(1.0),
            weight_pixels,
        }
    }

    /// Accepts CSS color names (`blue`) and hex (`#0000ff`, `0000ff`).
    pub fn parse_color(value: &str) -> Option<Srgb<u8>> {
        let value = value.trim();
        palette::named::from_str(&value.to_ascii_lowercase())
            .or_else(|| Srgb::<u8>::from_str(value).ok())
    }

    /// `#rrggbb`, alpha dropped
    pub fn css_color(&self) -> String {
        let rgb: Srgb<u8> = self.color.color.into_format();
        format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
    }

    pub fn with_weight(mut self, weight_pixels: f32) -> Self {
        self.weight_pixels = weight_pixels;
        self
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self::solid(palette::named::BLUE, 3.0)
    }
}

impl MapConfig {
    pub fn route_style(&self) -> Result<LineStyle, ConfigError> {
        let color = LineStyle::parse_color(&self.route_color)
            .ok_or_else(|| ConfigError::InvalidColor(self.route_color.clone()))?;
        Ok(LineStyle::solid(color, self.route_weight))
    }
}
