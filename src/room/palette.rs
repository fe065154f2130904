use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An sRGB colour, serialized as `"#rrggbb"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hue in degrees, saturation and value in [0, 1]
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let hue = hue.rem_euclid(360.0);
        let chroma = value * saturation;
        let x = chroma * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
        let m = value - chroma;

        let (r, g, b) = match (hue / 60.0) as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        let channel = |c: f64| ((c + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::new(channel(r), channel(g), channel(b))
    }

    /// Linear interpolation towards `other`; weight 0 is `self`, 1 is `other`
    pub fn mix(&self, other: &Rgb, weight: f64) -> Rgb {
        let w = weight.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * w).round() as u8;
        Rgb::new(
            lerp(self.r, other.r),
            lerp(self.g, other.g),
            lerp(self.b, other.b),
        )
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let hex = value
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| format!("Invalid colour: {value}"))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("Invalid colour: {value}"))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// The two ends of a participant's brush gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPair {
    pub from: Rgb,
    pub to: Rgb,
}

/// Supplies `count` pairwise distinct colours
pub trait PaletteSource: Send + Sync {
    fn colors(&self, count: usize) -> Vec<Rgb>;
}

/// Evenly spaced hues at fixed saturation and value
#[derive(Debug, Clone, Copy)]
pub struct HuePalette {
    pub saturation: f64,
    pub value: f64,
}

impl Default for HuePalette {
    fn default() -> Self {
        Self {
            saturation: 0.85,
            value: 0.95,
        }
    }
}

impl PaletteSource for HuePalette {
    fn colors(&self, count: usize) -> Vec<Rgb> {
        let mut colors: Vec<Rgb> = Vec::with_capacity(count);
        let step = 360.0 / count.max(1) as f64;
        for i in 0..count {
            let mut color = Rgb::from_hsv(step * i as f64, self.saturation, self.value);
            // Rounding can collide neighbouring hues once there are many of them
            let mut nudge = 0.0;
            while colors.contains(&color) {
                nudge += 0.5;
                color = Rgb::from_hsv(step * i as f64 + nudge, self.saturation, self.value);
            }
            colors.push(color);
        }
        colors
    }
}

/// Draws two colours per participant without replacement
pub fn assign_color_pairs<R: Rng + ?Sized>(
    participant_ids: &[String],
    palette: &dyn PaletteSource,
    rng: &mut R,
) -> HashMap<String, ColorPair> {
    let mut colors = palette.colors(participant_ids.len() * 2);
    colors.shuffle(rng);

    participant_ids
        .iter()
        .zip(colors.chunks_exact(2))
        .map(|(id, pair)| {
            (
                id.clone(),
                ColorPair {
                    from: pair[0],
                    to: pair[1],
                },
            )
        })
        .collect()
}
