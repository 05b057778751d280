use serde::{Deserialize, Serialize};

use crate::error::TurtleError;
use crate::models::AccountSnapshot;

/// Account-level limits for sizing and pyramiding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskLimits {
    pub max_risk_ratio: f64, // Highest margin utilisation that still allows adding units
    pub risk_per_unit: f64,  // Fraction of equity one N move of one unit may cost
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_risk_ratio: 0.5, // 50% margin utilisation
            risk_per_unit: 0.01, // 1% of equity per unit
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RiskTrip {
    NoAccountSnapshot,
    RiskRatio { current: f64, max: f64 },
}

impl RiskLimits {
    /// Check whether another unit may be added
    ///
    /// Fails closed when no account snapshot has been seen.
    pub fn check_pyramiding(&self, account: Option<&AccountSnapshot>) -> Result<(), RiskTrip> {
        let account = account.ok_or(RiskTrip::NoAccountSnapshot)?;

        if account.risk_ratio <= self.max_risk_ratio {
            Ok(())
        } else {
            Err(RiskTrip::RiskRatio {
                current: account.risk_ratio,
                max: self.max_risk_ratio,
            })
        }
    }
}

/// Largest unit a signed net position can hold
pub const MAX_UNIT: u64 = i64::MAX as u64;

/// Contracts per unit: floor(equity * risk_per_unit / (multiplier * N))
///
/// N and the multiplier must be positive and finite. A non-positive equity
/// yields a unit of 0.
pub fn unit_size(
    equity: f64,
    multiplier: f64,
    volatility_n: f64,
    risk_per_unit: f64,
) -> Result<u64, TurtleError> {
    if !(volatility_n.is_finite() && volatility_n > 0.0) {
        return Err(TurtleError::NonPositiveVolatility(volatility_n));
    }
    if !(multiplier.is_finite() && multiplier > 0.0) {
        return Err(TurtleError::InvalidMultiplier(multiplier));
    }

    let unit = (equity * risk_per_unit / (multiplier * volatility_n)).floor();
    if unit.is_nan() || unit <= 0.0 {
        Ok(0)
    } else if unit >= MAX_UNIT as f64 {
        Ok(MAX_UNIT)
    } else {
        Ok(unit as u64)
    }
}
