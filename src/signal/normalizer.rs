use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use tracing::trace;

use super::band::Band;

/// Running envelope of one (source, band) signal
///
/// `min` starts above `max` so that the envelope is empty until the first
/// accepted update, which sets both bounds to the first mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandStat {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub updates: u64,
}

impl Default for BandStat {
    fn default() -> Self {
        Self {
            value: 0.0,
            min: 1.0,
            max: 0.0,
            updates: 0,
        }
    }
}

impl BandStat {
    /// Folds one instantaneous value into the envelope
    pub fn update(&mut self, mean: f64) {
        if self.updates == 0 {
            self.min = mean;
            self.max = mean;
        } else {
            self.max = self.max.max(mean);
            self.min = self.min.min(mean);
        }
        self.value = mean;
        self.updates += 1;
    }

    /// Position of the current value inside the envelope, in `[0, 1]`.
    ///
    /// `None` until the envelope has a non-zero width.
    pub fn percentage(&self) -> Option<f64> {
        if self.updates == 0 || self.max <= self.min {
            return None;
        }
        Some(((self.value - self.min) / (self.max - self.min)).clamp(0.0, 1.0))
    }
}

/// Thread-safe store of band envelopes keyed by source and band
#[derive(Debug, Default)]
pub struct Normalizer {
    stats: RwLock<HashMap<(String, Band), BandStat>>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests a batch of raw values for one source and band.
    ///
    /// NaN values are dropped; a batch with nothing left is ignored.
    /// Returns the updated stat when an update happened.
    pub fn ingest(&self, source_id: &str, band: Band, values: &[f64]) -> Option<BandStat> {
        let (sum, count) = values
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

        if count == 0 {
            trace!(source_id = %source_id, band = %band, "Dropping empty sample batch");
            return None;
        }

        let mean = sum / count as f64;
        let mut stats = self.stats.write();
        let stat = stats
            .entry((source_id.to_string(), band))
            .or_default();
        stat.update(mean);

        trace!(
            source_id = %source_id,
            band = %band,
            value = stat.value,
            min = stat.min,
            max = stat.max,
            "Band stat updated"
        );

        Some(*stat)
    }

    /// Consistent snapshot of one envelope
    pub fn stat(&self, source_id: &str, band: Band) -> Option<BandStat> {
        self.stats
            .read()
            .get(&(source_id.to_string(), band))
            .copied()
    }

    pub fn percentage(&self, source_id: &str, band: Band) -> Option<f64> {
        self.stat(source_id, band).and_then(|stat| stat.percentage())
    }

    /// Removes every envelope recorded for a source
    pub fn forget(&self, source_id: &str) {
        self.stats.write().retain(|(source, _), _| source != source_id);
    }
}
