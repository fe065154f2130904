// Signal ingestion and normalization
//
// Band power samples arrive tagged with a hierarchical address, are folded
// into a running (value, min, max) envelope per source and band, and are read
// back by the tick loop as a normalized percentage.

pub use band::Band;
pub use errors::SignalError;
pub use ingestor::{parse_address, SignalIngestor};
pub use normalizer::{BandStat, Normalizer};
pub use sources::{ClaimError, SourceClaim, SourceInfo, SourceRegistry};

mod band;
mod errors;
pub mod handlers;
mod ingestor;
mod normalizer;
mod sources;
