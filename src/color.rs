use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rgba – renderer-independent colour used inside chart descriptions
// ---------------------------------------------------------------------------

/// 8-bit RGB plus a 0..=1 opacity, the same shape as CSS `rgba()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Rgba {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Same hue and saturation at a different HSL lightness.
    pub fn with_lightness(self, lightness: f32) -> Self {
        let srgb = Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        );
        let mut hsl: Hsl = srgb.into_color();
        hsl.lightness = lightness.clamp(0.0, 1.0);
        let out: Srgb = hsl.into_color();
        Rgba {
            r: (out.red * 255.0).round() as u8,
            g: (out.green * 255.0).round() as u8,
            b: (out.blue * 255.0).round() as u8,
            a: self.a,
        }
    }
}

impl From<Rgba> for Color32 {
    fn from(c: Rgba) -> Self {
        Color32::from_rgba_unmultiplied(c.r, c.g, c.b, (c.a * 255.0).round() as u8)
    }
}

// ---------------------------------------------------------------------------
// Fixed role colours
// ---------------------------------------------------------------------------

pub const OBSERVED: Rgba = Rgba::rgb(128, 128, 128);
pub const ANOMALY: Rgba = Rgba::rgb(255, 0, 0);
pub const FORECAST: Rgba = Rgba::rgb(0, 128, 0);

/// Confidence band: the forecast hue, brightened and mostly transparent.
pub fn band_fill() -> Rgba {
    FORECAST.with_lightness(0.39).with_alpha(0.1)
}
