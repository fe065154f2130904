use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use super::{electrode::ScalpElectrode, provider::RawPacket};

/// Vendor-specific knowledge of one headset family
///
/// Adapters are tried in order during connection; the first whose predicate
/// accepts the discovered device name wins.
pub trait VendorAdapter: Send + Sync + Debug {
    fn vendor(&self) -> &'static str;

    /// Advertised name prefix used as a discovery filter
    fn name_prefix(&self) -> &'static str;

    fn matches(&self, device_name: &str) -> bool {
        device_name.starts_with(self.name_prefix())
    }

    /// Vendor channel index to scalp location
    fn electrode_map(&self) -> BTreeMap<usize, ScalpElectrode>;

    /// Splits a packet into per-electrode sample runs. Unmapped channels are dropped.
    fn split(&self, packet: &RawPacket) -> Vec<(ScalpElectrode, Vec<f64>)>;
}

/// InteraXon Muse headsets: one electrode per packet, several samples each
#[derive(Debug, Default)]
pub struct MuseAdapter;

impl VendorAdapter for MuseAdapter {
    fn vendor(&self) -> &'static str {
        "muse"
    }

    fn name_prefix(&self) -> &'static str {
        "Muse-"
    }

    fn electrode_map(&self) -> BTreeMap<usize, ScalpElectrode> {
        BTreeMap::from([
            (0, ScalpElectrode::Tp9),
            (1, ScalpElectrode::Af7),
            (2, ScalpElectrode::Af8),
            (3, ScalpElectrode::Tp10),
        ])
    }

    fn split(&self, packet: &RawPacket) -> Vec<(ScalpElectrode, Vec<f64>)> {
        packet
            .channel
            .and_then(|channel| self.electrode_map().get(&channel).copied())
            .map(|electrode| vec![(electrode, packet.samples.clone())])
            .unwrap_or_default()
    }
}

/// OpenBCI Ganglion boards: one value per channel in every frame
///
/// Boards are wired by hand, so the montage can differ from the default
/// FP1/FP2/A1/A2 layout.
#[derive(Debug, Clone)]
pub struct GanglionAdapter {
    montage: BTreeMap<usize, ScalpElectrode>,
}

impl GanglionAdapter {
    pub fn with_map(montage: BTreeMap<usize, ScalpElectrode>) -> Self {
        Self { montage }
    }
}

impl Default for GanglionAdapter {
    fn default() -> Self {
        Self::with_map(BTreeMap::from([
            (0, ScalpElectrode::Fp1),
            (1, ScalpElectrode::Fp2),
            (2, ScalpElectrode::A1),
            (3, ScalpElectrode::A2),
        ]))
    }
}

impl VendorAdapter for GanglionAdapter {
    fn vendor(&self) -> &'static str {
        "ganglion"
    }

    fn name_prefix(&self) -> &'static str {
        "Ganglion-"
    }

    fn electrode_map(&self) -> BTreeMap<usize, ScalpElectrode> {
        self.montage.clone()
    }

    fn split(&self, packet: &RawPacket) -> Vec<(ScalpElectrode, Vec<f64>)> {
        packet
            .samples
            .iter()
            .enumerate()
            .filter_map(|(index, value)| self.montage.get(&index).map(|e| (*e, vec![*value])))
            .collect()
    }
}

/// Built-in adapters in selection order
pub fn default_adapters() -> Vec<Arc<dyn VendorAdapter>> {
    vec![Arc::new(MuseAdapter), Arc::new(GanglionAdapter::default())]
}
