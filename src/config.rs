use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::room::cleanup_task::CleanupConfig;
use crate::room::QuorumPolicy;
use crate::signal::Band;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Inclusive output range of the brush size map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSizeRange {
    pub min: f64,
    pub max: f64,
}

impl Default for BrushSizeRange {
    fn default() -> Self {
        Self {
            min: 11.25,
            max: 78.75,
        }
    }
}

/// Tunables of one round
#[derive(Debug, Clone)]
pub struct RoundConfig {
    /// Length of every non-zero step, in canvas units per tick
    pub movement_magnitude: f64,
    /// Jitter radius at zero calm
    pub noise_factor: f64,
    pub tick_period: Duration,
    pub round_duration: Duration,
    pub countdown_interval: Duration,
    pub quorum: QuorumPolicy,
    pub brush_size: BrushSizeRange,
    /// Band whose percentage damps the jitter
    pub jitter_band: Band,
    /// Band whose percentage mixes the brush colour and sets its size
    pub brush_band: Band,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            movement_magnitude: 5.0,
            noise_factor: 10.0,
            tick_period: Duration::from_millis(33),
            round_duration: Duration::from_millis(180_000),
            countdown_interval: Duration::from_secs(1),
            quorum: QuorumPolicy::ReadyOnly,
            brush_size: BrushSizeRange::default(),
            jitter_band: Band::Alpha,
            brush_band: Band::Beta,
        }
    }
}

/// Process configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub round: RoundConfig,
    pub cleanup: CleanupConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            round: RoundConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `BRAINAIM_*` variables from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("BRAINAIM_BIND_ADDR") {
            config.bind_addr = addr;
        }

        let round = &mut config.round;
        if let Some(v) = parse(&lookup, "BRAINAIM_MOVE_MAGNITUDE")? {
            round.movement_magnitude = positive("BRAINAIM_MOVE_MAGNITUDE", v)?;
        }
        if let Some(v) = parse::<f64, _>(&lookup, "BRAINAIM_NOISE_FACTOR")? {
            if v < 0.0 {
                return Err(invalid("BRAINAIM_NOISE_FACTOR", v));
            }
            round.noise_factor = v;
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "BRAINAIM_TICK_MS")? {
            if ms == 0 {
                return Err(invalid("BRAINAIM_TICK_MS", ms));
            }
            round.tick_period = Duration::from_millis(ms);
        }
        if let Some(ms) = parse::<u64, _>(&lookup, "BRAINAIM_ROUND_MS")? {
            round.round_duration = Duration::from_millis(ms);
        }
        if let Some(policy) = parse(&lookup, "BRAINAIM_QUORUM")? {
            round.quorum = policy;
        }
        if let Some(v) = parse(&lookup, "BRAINAIM_BRUSH_MIN")? {
            round.brush_size.min = v;
        }
        if let Some(v) = parse(&lookup, "BRAINAIM_BRUSH_MAX")? {
            round.brush_size.max = v;
        }
        if round.brush_size.min > round.brush_size.max {
            return Err(invalid(
                "BRAINAIM_BRUSH_MAX",
                format!("{} < {}", round.brush_size.max, round.brush_size.min),
            ));
        }

        Ok(config)
    }
}

fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

fn positive(key: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(invalid(key, value))
    }
}

fn invalid(key: &'static str, value: impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    }
}
