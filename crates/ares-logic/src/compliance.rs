//! Net Habitable Volume compliance scoring.
//!
//! Volumes are additive and independent of placement: the scorer only sums
//! calibrated module volumes and compares them to `crew × NHV-per-crew`.
//! All arithmetic is decimal so tier boundaries compare exactly.
//!
//! | Margin (total − floor)        | Tier   |
//! |-------------------------------|--------|
//! | `< 0`                         | RED    |
//! | `0 ≤ margin < floor × buffer` | YELLOW |
//! | `≥ floor × buffer`            | GREEN  |
//!
//! ```
//! use ares_logic::catalog::Catalog;
//! use ares_logic::compliance::{score, ComplianceTier};
//! use ares_logic::config::ComplianceConfig;
//!
//! let catalog = Catalog::standard();
//! let sleep = catalog.lookup("Sleep").unwrap().clone();
//! let result = score(1, &[sleep], &ComplianceConfig::default()).unwrap();
//! assert_eq!(result.status, ComplianceTier::Red);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::ModuleType;
use crate::config::ComplianceConfig;
use crate::error::{EngineError, Result};

/// Tiered compliance status, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplianceTier {
    /// Below the NHV floor.
    Red,
    /// At or above the floor, inside the buffer.
    Yellow,
    /// At or above floor plus buffer.
    Green,
}

impl ComplianceTier {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
        }
    }
}

/// Outcome of one scoring pass. Recomputed on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub crew_size: u32,
    /// crew_size × NHV per crew (m³).
    pub nhv_floor: Decimal,
    /// Margin needed for GREEN (m³).
    pub buffer_threshold: Decimal,
    /// Sum of selected module volumes (m³).
    pub total_volume: Decimal,
    /// total_volume − nhv_floor (m³).
    pub margin: Decimal,
    /// total_volume / nhv_floor × 100, two decimal places.
    pub utilization_pct: Decimal,
    pub status: ComplianceTier,
}

impl ComplianceResult {
    /// Human-readable status line for dashboards.
    pub fn message(&self) -> String {
        let total = self.total_volume.round_dp(1);
        let floor = self.nhv_floor.round_dp(1);
        match self.status {
            ComplianceTier::Red => format!(
                "CRITICAL: allocated volume ({total} m³) is below the NHV floor ({floor} m³) by {} m³.",
                (-self.margin).round_dp(1)
            ),
            ComplianceTier::Yellow => format!(
                "CAUTION: allocated volume ({total} m³) meets the NHV floor ({floor} m³) with only {} m³ of margin. Zoning review recommended.",
                self.margin.round_dp(1)
            ),
            ComplianceTier::Green => format!(
                "CONSTRAINTS MET: allocated volume ({total} m³) exceeds the NHV floor ({floor} m³) by {} m³.",
                self.margin.round_dp(1)
            ),
        }
    }
}

/// Sum of calibrated module volumes.
pub fn total_volume(modules: &[ModuleType]) -> Result<Decimal> {
    modules
        .iter()
        .try_fold(Decimal::ZERO, |acc, m| acc.checked_add(m.volume))
        .ok_or_else(|| overflow("total module volume"))
}

fn overflow(quantity: &str) -> EngineError {
    EngineError::InvalidConfig(format!("{quantity} is out of decimal range"))
}

/// Tier for a margin against a GREEN threshold. Boundaries go to the better tier.
pub fn classify(margin: Decimal, buffer_threshold: Decimal) -> ComplianceTier {
    if margin < Decimal::ZERO {
        ComplianceTier::Red
    } else if margin < buffer_threshold {
        ComplianceTier::Yellow
    } else {
        ComplianceTier::Green
    }
}

/// Score a module selection for a crew.
pub fn score(
    crew_size: u32,
    modules: &[ModuleType],
    config: &ComplianceConfig,
) -> Result<ComplianceResult> {
    if crew_size == 0 {
        return Err(EngineError::InvalidCrewSize(crew_size));
    }
    config.validate()?;

    let nhv_floor = Decimal::from(crew_size)
        .checked_mul(config.nhv_per_crew)
        .ok_or_else(|| overflow("NHV floor"))?;
    let buffer_threshold = nhv_floor
        .checked_mul(config.yellow_buffer_fraction)
        .ok_or_else(|| overflow("buffer threshold"))?;
    let total_volume = total_volume(modules)?;
    let margin = total_volume
        .checked_sub(nhv_floor)
        .ok_or_else(|| overflow("margin"))?;
    let utilization_pct = total_volume
        .checked_div(nhv_floor)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| overflow("NHV utilization"))?
        .round_dp(2);

    Ok(ComplianceResult {
        crew_size,
        nhv_floor,
        buffer_threshold,
        total_volume,
        margin,
        utilization_pct,
        status: classify(margin, buffer_threshold),
    })
}
