use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SignalError {
    #[error("Malformed signal address: {0}")]
    MalformedAddress(String),

    #[error("Unknown band: {0}")]
    UnknownBand(String),
}
