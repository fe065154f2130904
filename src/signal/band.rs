use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use super::errors::SignalError;

/// Physiological frequency bands reported by the headsets
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Band {
    Alpha,
    Beta,
    Gamma,
    Delta,
    Theta,
}

impl Band {
    /// Resolves a transport band tag such as `Alpha` or `alpha_absolute`.
    ///
    /// Vendor suffixes after the first underscore are ignored.
    pub fn from_tag(tag: &str) -> Result<Self, SignalError> {
        let name = tag.split('_').next().unwrap_or(tag).trim();
        Band::from_str(name).map_err(|_| SignalError::UnknownBand(tag.to_string()))
    }
}
