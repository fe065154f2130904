use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DeviceError {
    #[error("No device found")]
    DeviceNotFound,

    #[error("Unsupported device: {0}")]
    UnsupportedDevice(String),

    #[error("Device link error: {0}")]
    Link(String),
}
