use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::{
    adapter::{default_adapters, VendorAdapter},
    electrode::ScalpElectrode,
    errors::DeviceError,
    provider::{DeviceEvent, DeviceLink, DeviceProvider, DeviceStatus, DiscoveredDevice},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceState {
    Disconnected,
    Connecting,
    Connected,
}

/// Normalized sample event, identical for every vendor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSample {
    pub electrode: ScalpElectrode,
    pub samples: Vec<f64>,
    /// Hz, derived from the gap to the electrode's previous packet
    pub sample_rate: Option<f64>,
    pub timestamp: f64,
}

pub type SampleHandler = Arc<dyn Fn(DeviceSample) + Send + Sync>;
pub type StatusHandler = Arc<dyn Fn(DeviceStatus) + Send + Sync>;

#[derive(Default)]
struct Handlers {
    samples: Option<SampleHandler>,
    status: Option<StatusHandler>,
}

/// Description of the connected device
#[derive(Debug, Clone, Serialize)]
pub struct DeviceHandle {
    pub vendor: &'static str,
    pub device: DiscoveredDevice,
    pub electrode_map: BTreeMap<usize, ScalpElectrode>,
}

struct ActiveLink {
    handle: DeviceHandle,
    link: Box<dyn DeviceLink>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Connect/stream/disconnect state machine for one physical sensor
pub struct DeviceSession {
    provider: Arc<dyn DeviceProvider>,
    adapters: Vec<Arc<dyn VendorAdapter>>,
    state: Arc<RwLock<DeviceState>>,
    handlers: Arc<RwLock<Handlers>>,
    active: Option<ActiveLink>,
}

/// `1000 / delta_ms * sample_count`, undefined for a non-positive delta
pub fn sample_rate(delta_ms: f64, sample_count: usize) -> Option<f64> {
    if delta_ms > 0.0 {
        Some(1000.0 / delta_ms * sample_count as f64)
    } else {
        None
    }
}

impl DeviceSession {
    pub fn new(provider: Arc<dyn DeviceProvider>) -> Self {
        Self::with_adapters(provider, default_adapters())
    }

    pub fn with_adapters(
        provider: Arc<dyn DeviceProvider>,
        adapters: Vec<Arc<dyn VendorAdapter>>,
    ) -> Self {
        Self {
            provider,
            adapters,
            state: Arc::new(RwLock::new(DeviceState::Disconnected)),
            handlers: Arc::new(RwLock::new(Handlers::default())),
            active: None,
        }
    }

    pub fn state(&self) -> DeviceState {
        *self.state.read()
    }

    pub fn handle(&self) -> Option<&DeviceHandle> {
        self.active.as_ref().map(|active| &active.handle)
    }

    /// Replaces the sample handler; takes effect for the next packet
    pub fn subscribe(&self, handler: SampleHandler) {
        self.handlers.write().samples = Some(handler);
    }

    /// Replaces the telemetry handler
    pub fn subscribe_status(&self, handler: StatusHandler) {
        self.handlers.write().status = Some(handler);
    }

    /// Discovers, selects an adapter for, and starts streaming from a device.
    ///
    /// An already connected device is disconnected first. On failure the
    /// session is left Disconnected.
    #[instrument(skip(self))]
    pub async fn connect(&mut self) -> Result<DeviceHandle, DeviceError> {
        if self.active.is_some() {
            self.disconnect().await;
        }

        *self.state.write() = DeviceState::Connecting;

        match self.open().await {
            Ok(active) => {
                let handle = active.handle.clone();
                self.active = Some(active);
                *self.state.write() = DeviceState::Connected;
                info!(vendor = handle.vendor, device = %handle.device.name, "Device connected");
                Ok(handle)
            }
            Err(e) => {
                *self.state.write() = DeviceState::Disconnected;
                warn!(error = %e, "Device connection failed");
                Err(e)
            }
        }
    }

    async fn open(&self) -> Result<ActiveLink, DeviceError> {
        let prefixes: Vec<&str> = self.adapters.iter().map(|a| a.name_prefix()).collect();

        let device = self
            .provider
            .discover(&prefixes)
            .await?
            .ok_or(DeviceError::DeviceNotFound)?;

        let adapter = self
            .adapters
            .iter()
            .find(|adapter| adapter.matches(&device.name))
            .cloned()
            .ok_or_else(|| DeviceError::UnsupportedDevice(device.name.clone()))?;

        debug!(vendor = adapter.vendor(), device = %device.name, "Selected vendor adapter");

        let mut link = self.provider.connect(&device).await?;
        let events = match link.start().await {
            Ok(events) => events,
            Err(e) => {
                link.close().await;
                return Err(e);
            }
        };

        let cancel = CancellationToken::new();
        let task = tokio::spawn(stream_samples(
            events,
            Arc::clone(&adapter),
            Arc::clone(&self.handlers),
            Arc::clone(&self.state),
            cancel.clone(),
        ));

        Ok(ActiveLink {
            handle: DeviceHandle {
                vendor: adapter.vendor(),
                device,
                electrode_map: adapter.electrode_map(),
            },
            link,
            cancel,
            task,
        })
    }

    /// Tears down the subscription. Calling it while disconnected does nothing.
    #[instrument(skip(self))]
    pub async fn disconnect(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.cancel.cancel();
            let _ = active.task.await;
            active.link.close().await;
            info!(device = %active.handle.device.name, "Device disconnected");
        }
        *self.state.write() = DeviceState::Disconnected;
    }
}

/// Subscription task: converts raw packets into per-electrode samples and
/// forwards telemetry untouched.
///
/// The last-timestamp map lives and dies with this task.
async fn stream_samples(
    mut events: mpsc::Receiver<DeviceEvent>,
    adapter: Arc<dyn VendorAdapter>,
    handlers: Arc<RwLock<Handlers>>,
    state: Arc<RwLock<DeviceState>>,
    cancel: CancellationToken,
) {
    let mut last_timestamps: HashMap<ScalpElectrode, f64> = adapter
        .electrode_map()
        .values()
        .map(|electrode| (*electrode, 0.0))
        .collect();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!(vendor = adapter.vendor(), "Device subscription cancelled");
                break;
            }

            event = events.recv() => {
                let packet = match event {
                    Some(DeviceEvent::Packet(packet)) => packet,
                    Some(DeviceEvent::Status(status)) => {
                        let current = handlers.read().status.clone();
                        if let Some(callback) = current {
                            callback(status);
                        }
                        continue;
                    }
                    None => {
                        warn!(vendor = adapter.vendor(), "Device stream ended");
                        *state.write() = DeviceState::Disconnected;
                        break;
                    }
                };

                for (electrode, samples) in adapter.split(&packet) {
                    let last = last_timestamps.insert(electrode, packet.timestamp).unwrap_or(0.0);
                    let sample = DeviceSample {
                        electrode,
                        sample_rate: sample_rate(packet.timestamp - last, samples.len()),
                        samples,
                        timestamp: packet.timestamp,
                    };

                    let current = handlers.read().samples.clone();
                    if let Some(callback) = current {
                        callback(sample);
                    }
                }
            }
        }
    }
}
