//! Amplitude colouring of envelope columns.

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Hue in degrees for a column: 240 (blue) when silent, 0 (red) at or above half-scale swing.
pub fn amplitude_hue(max: f32, min: f32) -> f32 {
    let intensity = ((max.abs() + min.abs()) * 2.0).min(1.0);
    240.0 - intensity * 240.0
}

/// HSV to RGB. `hue` in degrees (any value, wrapped), `saturation` and `value` in `[0, 1]`.
pub fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> Rgb {
    let sector = hue.rem_euclid(360.0) / 60.0;
    let saturation = saturation.clamp(0.0, 1.0);
    let value = value.clamp(0.0, 1.0);
    let channel = |offset: f32| {
        let k = (sector + offset) % 6.0;
        let weight = (2.0 - (2.0 - k).abs()).clamp(0.0, 1.0);
        ((value - weight * saturation * value) * 255.0).round() as u8
    };
    Rgb::new(channel(5.0), channel(3.0), channel(1.0))
}
