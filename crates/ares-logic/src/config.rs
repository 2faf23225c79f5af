//! Tunable engine constants.
//!
//! The NHV floor, YELLOW buffer, structural reserve and packing grid are not
//! pinned down by any single standard, so they live here as explicit
//! configuration with calibrated defaults. Every field is optional in JSON.
//!
//! ```
//! use ares_logic::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "packer": { "grid_step": 0.25 } }"#).unwrap();
//! assert_eq!(config.packer.grid_step, 0.25);
//! assert_eq!(config.reserve_fraction, 0.15);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Default structural/circulation reserve (fraction of enclosed volume).
pub const DEFAULT_RESERVE_FRACTION: f64 = 0.15;

/// Default packing grid pitch in meters.
pub const DEFAULT_GRID_STEP: f64 = 0.5;

/// Finest packing grid pitch accepted, in meters.
pub const MIN_GRID_STEP: f64 = 0.01;

/// Default per-crew Net Habitable Volume floor (m³).
pub fn default_nhv_per_crew() -> Decimal {
    Decimal::new(29, 0)
}

/// Default YELLOW buffer as a fraction of the NHV floor.
pub fn default_yellow_buffer_fraction() -> Decimal {
    Decimal::new(10, 2)
}

/// Compliance scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceConfig {
    /// Minimum habitable volume per crew member (m³).
    pub nhv_per_crew: Decimal,
    /// Margin below `floor × fraction` is YELLOW, at or above is GREEN.
    pub yellow_buffer_fraction: Decimal,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            nhv_per_crew: default_nhv_per_crew(),
            yellow_buffer_fraction: default_yellow_buffer_fraction(),
        }
    }
}

/// Layout packer constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackerConfig {
    /// Candidate lattice pitch in meters. Coarser is faster but finds fewer fits.
    pub grid_step: f64,
    /// Maximum candidate placements evaluated per pack (None = unbounded).
    pub candidate_budget: Option<u64>,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            grid_step: DEFAULT_GRID_STEP,
            candidate_budget: None,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub compliance: ComplianceConfig,
    pub packer: PackerConfig,
    /// Fraction of enclosed volume reserved for structure and circulation.
    pub reserve_fraction: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            compliance: ComplianceConfig::default(),
            packer: PackerConfig::default(),
            reserve_fraction: DEFAULT_RESERVE_FRACTION,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject out-of-range constants.
    pub fn validate(&self) -> Result<()> {
        self.compliance.validate()?;
        self.packer.validate()?;
        validate_reserve_fraction(self.reserve_fraction)
    }
}

impl ComplianceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.nhv_per_crew <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig(format!(
                "nhv_per_crew must be positive, got {}",
                self.nhv_per_crew
            )));
        }
        if self.yellow_buffer_fraction < Decimal::ZERO {
            return Err(EngineError::InvalidConfig(format!(
                "yellow_buffer_fraction must be non-negative, got {}",
                self.yellow_buffer_fraction
            )));
        }
        Ok(())
    }
}

impl PackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.grid_step.is_finite() || self.grid_step < MIN_GRID_STEP {
            return Err(EngineError::InvalidConfig(format!(
                "grid_step must be at least {MIN_GRID_STEP} m, got {}",
                self.grid_step
            )));
        }
        if self.candidate_budget == Some(0) {
            return Err(EngineError::InvalidConfig(
                "candidate_budget must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn validate_reserve_fraction(fraction: f64) -> Result<()> {
    if !(0.0..1.0).contains(&fraction) {
        return Err(EngineError::InvalidConfig(format!(
            "reserve_fraction must be in [0, 1), got {fraction}"
        )));
    }
    Ok(())
}
