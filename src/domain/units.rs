//! Unit conversions between display values and on-chain integers
//!
//! - ether strings <-> wei (`U256`), factor 10^18
//! - percentages <-> basis points, factor 100

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum UnitsError {
    #[error("Invalid ether amount '{0}': {1}")]
    InvalidEther(String, String),

    #[error("Percentage {0} must be between 0 and 100")]
    PercentOutOfRange(f64),

    #[error("Basis points {0} exceed the maximum of 10000")]
    BasisPointsOutOfRange(String),
}

/// Parse a decimal ether string into wei
pub fn to_wei(ether: &str) -> Result<U256, UnitsError> {
    let trimmed = ether.trim();
    if trimmed.is_empty() {
        return Err(UnitsError::InvalidEther(ether.to_string(), "empty amount".into()));
    }
    if trimmed.starts_with('-') {
        return Err(UnitsError::InvalidEther(ether.to_string(), "negative amount".into()));
    }
    parse_ether(trimmed).map_err(|e| UnitsError::InvalidEther(ether.to_string(), e.to_string()))
}

/// Format wei as a full-precision ether string (18 decimals)
pub fn to_ether(wei: U256) -> String {
    format_ether(wei)
}

/// Format wei as ether without trailing zeros, e.g. `1.5` or `2`
pub fn to_ether_display(wei: U256) -> String {
    let full = format_ether(wei);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => full,
    }
}

/// Lossy ether value for display arithmetic only
pub fn to_ether_f64(wei: U256) -> f64 {
    format_ether(wei).parse().unwrap_or(0.0)
}

/// Basis points, 1/100 of a percent. Range 0..=10000.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BasisPoints(u16);

impl BasisPoints {
    pub const MAX: u16 = 10_000;

    pub fn new(bps: u16) -> Result<Self, UnitsError> {
        if bps > Self::MAX {
            return Err(UnitsError::BasisPointsOutOfRange(bps.to_string()));
        }
        Ok(Self(bps))
    }

    /// `12.5` percent becomes `1250` bps
    pub fn from_percent(percent: f64) -> Result<Self, UnitsError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(UnitsError::PercentOutOfRange(percent));
        }
        Ok(Self((percent * 100.0).round() as u16))
    }

    pub fn try_from_u256(value: U256) -> Result<Self, UnitsError> {
        let bps = u16::try_from(value)
            .map_err(|_| UnitsError::BasisPointsOutOfRange(value.to_string()))?;
        Self::new(bps)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    pub fn to_percent(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn to_u256(self) -> U256 {
        U256::from(self.0)
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.to_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_to_wei() {
        assert_eq!(to_wei("1").unwrap(), U256::from(10u64).pow(U256::from(18)));
        assert_eq!(to_wei("0.000000000000000001").unwrap(), U256::from(1));
        assert_eq!(to_wei(" 0.5 ").unwrap(), U256::from(500_000_000_000_000_000u64));
    }

    #[test]
    fn test_to_wei_rejects_garbage() {
        assert!(matches!(to_wei(""), Err(UnitsError::InvalidEther(_, _))));
        assert!(matches!(to_wei("-1"), Err(UnitsError::InvalidEther(_, _))));
        assert!(matches!(to_wei("abc"), Err(UnitsError::InvalidEther(_, _))));
    }

    #[test]
    fn test_exact_values_survive_both_directions() {
        for ether in ["0", "0.0001", "1.5", "123456.000000000000000001"] {
            let wei = to_wei(ether).unwrap();
            assert_eq!(to_wei(&to_ether(wei)).unwrap(), wei, "ether {}", ether);
        }
        let wei = U256::from(987_654_321_000_000_123u128);
        assert_eq!(to_wei(&to_ether(wei)).unwrap(), wei);
    }

    #[test]
    fn test_display_trims_zeros() {
        assert_eq!(to_ether_display(to_wei("1.50").unwrap()), "1.5");
        assert_eq!(to_ether_display(to_wei("2").unwrap()), "2");
        assert_eq!(to_ether_display(U256::ZERO), "0");
    }

    #[test]
    fn test_to_ether_f64() {
        assert_relative_eq!(to_ether_f64(to_wei("0.25").unwrap()), 0.25);
    }

    #[test]
    fn test_basis_points_from_percent() {
        assert_eq!(BasisPoints::from_percent(12.5).unwrap().value(), 1250);
        assert_eq!(BasisPoints::from_percent(0.0).unwrap().value(), 0);
        assert_eq!(BasisPoints::from_percent(100.0).unwrap().value(), 10_000);
        assert!(BasisPoints::from_percent(100.01).is_err());
        assert!(BasisPoints::from_percent(-1.0).is_err());
        assert!(BasisPoints::from_percent(f64::NAN).is_err());
    }

    #[test]
    fn test_basis_points_to_percent() {
        let bps = BasisPoints::try_from_u256(U256::from(2000)).unwrap();
        assert_relative_eq!(bps.to_percent(), 20.0);
        assert_eq!(bps.to_string(), "20%");
        assert!(BasisPoints::try_from_u256(U256::from(10_001)).is_err());
        assert!(BasisPoints::try_from_u256(U256::MAX).is_err());
    }
}
