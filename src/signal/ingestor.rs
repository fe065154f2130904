use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    band::Band,
    errors::SignalError,
    normalizer::{BandStat, Normalizer},
    sources::{ClaimError, SourceRegistry},
};

/// Splits a transport address `"{participantTag}/.../{bandTag}"`.
///
/// The first segment names the source, the last segment names the band.
pub fn parse_address(address: &str) -> Result<(String, Band), SignalError> {
    let segments: Vec<&str> = address
        .trim_matches('/')
        .split('/')
        .map(str::trim)
        .collect();

    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return Err(SignalError::MalformedAddress(address.to_string()));
    }

    let source = segments[0].to_string();
    let band = Band::from_tag(segments[segments.len() - 1])?;
    Ok((source, band))
}

/// Entry point for the signal transport
///
/// Registers every newly seen source tag so that participants can select it,
/// then folds the batch into the normalizer.
#[derive(Clone)]
pub struct SignalIngestor {
    normalizer: Arc<Normalizer>,
    sources: Arc<SourceRegistry>,
}

impl SignalIngestor {
    pub fn new(normalizer: Arc<Normalizer>, sources: Arc<SourceRegistry>) -> Self {
        Self {
            normalizer,
            sources,
        }
    }

    pub fn ingest(&self, source_id: &str, band: Band, values: &[f64]) -> Option<BandStat> {
        self.sources.register(source_id);
        self.normalizer.ingest(source_id, band, values)
    }

    #[instrument(skip(self, values), fields(samples = values.len()))]
    pub fn ingest_address(
        &self,
        address: &str,
        values: &[f64],
    ) -> Result<Option<BandStat>, SignalError> {
        let (source_id, band) = parse_address(address)?;
        let stat = self.ingest(&source_id, band, values);
        debug!(source_id = %source_id, band = %band, updated = stat.is_some(), "Ingested signal batch");
        Ok(stat)
    }

    /// Drops an unclaimed source together with its band envelopes
    pub fn remove_source(&self, source_id: &str) -> Result<(), ClaimError> {
        self.sources.unregister(source_id)?;
        self.normalizer.forget(source_id);
        Ok(())
    }
}
