// BCI device abstraction
//
// A DeviceSession drives one physical headset through discovery, connection
// and streaming. Vendor differences (name patterns, channel layout, packet
// shape) live behind the VendorAdapter trait so the rest of the server only
// ever sees per-electrode DeviceSample events.

pub use adapter::{default_adapters, GanglionAdapter, MuseAdapter, VendorAdapter};
pub use electrode::ScalpElectrode;
pub use errors::DeviceError;
pub use provider::{
    DeviceEvent, DeviceLink, DeviceProvider, DeviceStatus, DiscoveredDevice, RawPacket,
};
pub use session::{
    sample_rate, DeviceHandle, DeviceSample, DeviceSession, DeviceState, SampleHandler,
    StatusHandler,
};

mod adapter;
mod electrode;
mod errors;
mod provider;
mod session;
