use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Scalp electrode locations of the International 10-20 system
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ScalpElectrode {
    Fp1,
    Fp2,
    Af7,
    Af8,
    F7,
    F3,
    Fz,
    F4,
    F8,
    A1,
    T3,
    C3,
    Cz,
    C4,
    T4,
    A2,
    Tp9,
    Tp10,
    T5,
    P3,
    Pz,
    P4,
    T6,
    O1,
    O2,
}
