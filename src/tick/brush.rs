use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::config::BrushSizeRange;
use crate::room::models::Position;
use crate::room::palette::{ColorPair, Rgb};

/// Percentage used when a band has no usable envelope yet
pub const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Brush {
    pub color: Rgb,
    pub size: f64,
}

fn or_neutral(percentage: Option<f64>) -> f64 {
    percentage
        .filter(|p| p.is_finite())
        .map(|p| p.clamp(0.0, 1.0))
        .unwrap_or(NEUTRAL)
}

pub fn brush_size(percentage: Option<f64>, range: BrushSizeRange) -> f64 {
    range.min + or_neutral(percentage) * (range.max - range.min)
}

pub fn brush(pair: &ColorPair, percentage: Option<f64>, range: BrushSizeRange) -> Brush {
    Brush {
        color: pair.from.mix(&pair.to, or_neutral(percentage)),
        size: brush_size(percentage, range),
    }
}

/// Offsets a point in a random direction; a calmer signal shakes less
pub fn jitter<R: Rng + ?Sized>(
    position: Position,
    calm: Option<f64>,
    noise_factor: f64,
    rng: &mut R,
) -> Position {
    let radius = noise_factor * (1.0 - or_neutral(calm));
    let angle = rng.random_range(0.0..TAU);
    Position::new(
        position.x + radius * angle.cos(),
        position.y + radius * angle.sin(),
    )
}
