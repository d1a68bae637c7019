//! Copy-trading leaders registered on the copy-trading contract

use alloy::primitives::U256;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::units::{to_ether_display, BasisPoints};

/// Bounds for the generated PnL figure, in percent
pub const PNL_RANGE: (f64, f64) = (-50.0, 150.0);

/// Bounds for the generated win rate, in percent
pub const WIN_RATE_RANGE: (f64, f64) = (40.0, 90.0);

/// On-chain trader record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraderDetails {
    pub address: String,
    pub name: String,
    pub minimum_investment: U256,
    pub profit_sharing: BasisPoints,
    pub total_pool_value: U256,
    pub total_investors: u64,
    pub total_trades: u64,
    pub is_active: bool,
}

impl TraderDetails {
    /// Pre-submit check mirroring the contract's minimum investment rule
    pub fn accepts_investment(&self, amount_wei: U256) -> bool {
        self.is_active && amount_wei >= self.minimum_investment
    }
}

/// Leaderboard row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trader {
    pub address: String,
    pub name: String,
    pub minimum_investment: String,
    pub profit_sharing_percentage: f64,
    pub total_pool_value: String,
    pub total_investors: u64,
    pub total_trades: u64,
    pub is_active: bool,
    pub pnl: f64,
    pub win_rate: f64,
    /// `pnl` and `win_rate` are generated, there is no performance feed yet
    pub synthetic_metrics: bool,
}

impl Trader {
    pub fn from_details<R: Rng + ?Sized>(details: &TraderDetails, rng: &mut R) -> Self {
        Self {
            address: details.address.clone(),
            name: details.name.clone(),
            minimum_investment: to_ether_display(details.minimum_investment),
            profit_sharing_percentage: details.profit_sharing.to_percent(),
            total_pool_value: to_ether_display(details.total_pool_value),
            total_investors: details.total_investors,
            total_trades: details.total_trades,
            is_active: details.is_active,
            pnl: rng.gen_range(PNL_RANGE.0..PNL_RANGE.1),
            win_rate: rng.gen_range(WIN_RATE_RANGE.0..WIN_RATE_RANGE.1),
            synthetic_metrics: true,
        }
    }
}

/// Sort key for the leaderboard: active traders first, then by pool size
pub fn rank_traders(traders: &mut [Trader]) {
    traders.sort_by(|a, b| {
        b.is_active.cmp(&a.is_active).then_with(|| {
            let pa: f64 = a.total_pool_value.parse().unwrap_or(0.0);
            let pb: f64 = b.total_pool_value.parse().unwrap_or(0.0);
            pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
        })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::units::to_wei;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn details(name: &str, pool: &str, active: bool) -> TraderDetails {
        TraderDetails {
            address: format!("0x{:0>40}", name.len()),
            name: name.to_string(),
            minimum_investment: to_wei("0.1").unwrap(),
            profit_sharing: BasisPoints::new(1500).unwrap(),
            total_pool_value: to_wei(pool).unwrap(),
            total_investors: 3,
            total_trades: 17,
            is_active: active,
        }
    }

    #[test]
    fn test_trader_projection() {
        let mut rng = StdRng::seed_from_u64(1);
        let trader = Trader::from_details(&details("alpha", "12.5", true), &mut rng);

        assert_eq!(trader.minimum_investment, "0.1");
        assert_eq!(trader.profit_sharing_percentage, 15.0);
        assert_eq!(trader.total_pool_value, "12.5");
        assert!(trader.pnl >= -50.0 && trader.pnl < 150.0);
        assert!(trader.win_rate >= 40.0 && trader.win_rate < 90.0);
        assert!(trader.synthetic_metrics);
    }

    #[test]
    fn test_accepts_investment() {
        let d = details("alpha", "1", true);
        assert!(d.accepts_investment(to_wei("0.1").unwrap()));
        assert!(!d.accepts_investment(to_wei("0.09").unwrap()));

        let inactive = details("beta", "1", false);
        assert!(!inactive.accepts_investment(to_wei("5").unwrap()));
    }

    #[test]
    fn test_rank_traders() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut traders = vec![
            Trader::from_details(&details("small", "1", true), &mut rng),
            Trader::from_details(&details("idle", "100", false), &mut rng),
            Trader::from_details(&details("big", "50", true), &mut rng),
        ];
        rank_traders(&mut traders);
        let names: Vec<_> = traders.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["big", "small", "idle"]);
    }
}
