// Risk management module
pub mod limits;

pub use limits::{unit_size, RiskLimits, RiskTrip, MAX_UNIT};
