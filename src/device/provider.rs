use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::errors::DeviceError;

/// A device found during discovery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub id: String,
    pub name: String,
}

/// One notification from a device's sample characteristic
///
/// Per-electrode vendors set `channel` and carry several samples of that
/// electrode; frame-based vendors leave it unset and carry one value per
/// channel index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPacket {
    /// Milliseconds
    pub timestamp: f64,
    pub channel: Option<usize>,
    pub samples: Vec<f64>,
}

/// Battery and sensor telemetry reported alongside the sample stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub sequence_id: u32,
    /// Percent
    pub battery_level: f64,
    /// Millivolts
    pub fuel_gauge_voltage: f64,
    /// Degrees Celsius
    pub temperature: f64,
}

/// Everything a started link can deliver
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    Packet(RawPacket),
    Status(DeviceStatus),
}

impl From<RawPacket> for DeviceEvent {
    fn from(packet: RawPacket) -> Self {
        DeviceEvent::Packet(packet)
    }
}

impl From<DeviceStatus> for DeviceEvent {
    fn from(status: DeviceStatus) -> Self {
        DeviceEvent::Status(status)
    }
}

/// Transport that finds and opens devices (Bluetooth in production)
#[async_trait]
pub trait DeviceProvider: Send + Sync {
    /// Finds one device whose advertised name starts with any of the prefixes
    async fn discover(&self, name_prefixes: &[&str])
        -> Result<Option<DiscoveredDevice>, DeviceError>;

    async fn connect(&self, device: &DiscoveredDevice) -> Result<Box<dyn DeviceLink>, DeviceError>;
}

/// An open connection to one device
#[async_trait]
pub trait DeviceLink: Send + Sync {
    /// Starts streaming and hands back the event stream. Vendors without
    /// telemetry only ever send packets.
    async fn start(&mut self) -> Result<mpsc::Receiver<DeviceEvent>, DeviceError>;

    async fn close(&mut self);
}
