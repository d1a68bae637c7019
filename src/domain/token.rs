//! Memecoin sales created through the token factory
//!
//! `TokenDetails` mirrors the on-chain sale record. `DisplayToken` is what the
//! feed renders: the sale plus a couple of display-only numbers that have no
//! on-chain source.

use alloy::primitives::U256;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::units::{to_ether_display, to_ether_f64};

/// Price shown for every factory token, in wei. The factory has no price oracle.
pub const FIXED_TOKEN_PRICE_WEI: u64 = 100_000_000_000_000;

/// [`FIXED_TOKEN_PRICE_WEI`] as an ether string, e.g. `0.0001`
pub fn fixed_token_price() -> String {
    to_ether_display(U256::from(FIXED_TOKEN_PRICE_WEI))
}

/// Bounds for the synthetic 24h change, in percent
pub const CHANGE_24H_RANGE: (f64, f64) = (-10.0, 10.0);

/// On-chain sale record as returned by the factory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDetails {
    pub token: String,
    pub name: String,
    pub symbol: String,
    pub creator: String,
    /// Tokens sold, in wei units of the token
    pub sold: U256,
    /// Native currency raised, in wei
    pub raised: U256,
    pub is_open: bool,
}

/// Feed projection of a [`TokenDetails`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayToken {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub creator: String,
    pub sold: String,
    pub raised: String,
    pub is_open: bool,
    /// Ether per token
    pub price: String,
    pub change_24h: f64,
    /// `price` and `change_24h` are generated, not measured
    pub synthetic_metrics: bool,
}

impl DisplayToken {
    pub fn from_details<R: Rng + ?Sized>(details: &TokenDetails, rng: &mut R) -> Self {
        let (lo, hi) = CHANGE_24H_RANGE;
        Self {
            address: details.token.clone(),
            name: details.name.clone(),
            symbol: details.symbol.clone(),
            creator: details.creator.clone(),
            sold: to_ether_display(details.sold),
            raised: to_ether_display(details.raised),
            is_open: details.is_open,
            price: fixed_token_price(),
            change_24h: rng.gen_range(lo..hi),
            synthetic_metrics: true,
        }
    }

    /// Raised amount as a float, for sorting and charts
    pub fn raised_f64(&self) -> f64 {
        self.raised.parse().unwrap_or(0.0)
    }
}

impl TokenDetails {
    pub fn raised_ether(&self) -> f64 {
        to_ether_f64(self.raised)
    }
}
