//! Demo data for offline rendering

use serde::{Deserialize, Serialize};

use super::trader::Trader;

/// A memecoin card in the swipe deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemeCard {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change_24h: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub holders: u64,
    pub description: String,
}

fn card(
    symbol: &str,
    name: &str,
    price: f64,
    change_24h: f64,
    market_cap: f64,
    volume_24h: f64,
    holders: u64,
    description: &str,
) -> MemeCard {
    MemeCard {
        symbol: symbol.to_string(),
        name: name.to_string(),
        price,
        change_24h,
        market_cap,
        volume_24h,
        holders,
        description: description.to_string(),
    }
}

pub fn meme_cards() -> Vec<MemeCard> {
    vec![
        card("DOGE", "Dogecoin", 0.0821, 5.2, 11_800_000_000.0, 412_000_000.0, 4_900_000, "The original meme coin."),
        card("SHIB", "Shiba Inu", 0.0000089, -2.1, 5_240_000_000.0, 138_000_000.0, 1_300_000, "Self-styled Dogecoin killer."),
        card("PEPE", "Pepe", 0.00000112, 12.8, 470_000_000.0, 96_000_000.0, 168_000, "Feels good man."),
        card("FLOKI", "Floki", 0.000031, 3.4, 298_000_000.0, 22_000_000.0, 451_000, "Named after a very good boy."),
        card("BONK", "Bonk", 0.0000124, -7.9, 761_000_000.0, 54_000_000.0, 612_000, "The dog coin of Solana."),
        card("WIF", "dogwifhat", 2.31, 18.6, 2_310_000_000.0, 301_000_000.0, 98_000, "It's a dog. With a hat."),
    ]
}

/// Leaderboard rows shown when no chain connection is available
pub fn demo_traders() -> Vec<Trader> {
    let trader = |address: &str, name: &str, min: &str, share: f64, pool: &str, investors: u64, trades: u64, pnl: f64, win_rate: f64| Trader {
        address: address.to_string(),
        name: name.to_string(),
        minimum_investment: min.to_string(),
        profit_sharing_percentage: share,
        total_pool_value: pool.to_string(),
        total_investors: investors,
        total_trades: trades,
        is_active: true,
        pnl,
        win_rate,
        synthetic_metrics: true,
    };

    vec![
        trader("0x70997970C51812dc3A010C7d01b50e0d17dc79C8", "MoonHunter", "0.1", 10.0, "42.5", 128, 311, 87.4, 71.2),
        trader("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC", "DegenKing", "0.05", 15.0, "18.2", 64, 542, 34.9, 58.6),
        trader("0x90F79bf6EB2c4f870365E785982E1f101E93b906", "ApeWhisperer", "0.5", 20.0, "97.0", 211, 188, 121.3, 82.0),
    ]
}
