//! Domain Layer - Records and pure logic for MemeTrader
//!
//! This module contains display-oriented records and the pieces of logic that
//! need no I/O:
//! - `wallet`: tracked wallets, dashboard aggregates, export formats
//! - `trade`: backend trade requests and records
//! - `token`: factory token sales and their feed projection
//! - `trader`: copy-trading leaders and their leaderboard projection
//! - `units`: wei/ether and basis point conversions
//! - `swipe`: gesture classification and the cyclic card deck
//! - `fixtures`: demo data for offline rendering

pub mod wallet;
pub mod trade;
pub mod token;
pub mod trader;
pub mod units;
pub mod swipe;
pub mod fixtures;

pub use wallet::{
    DashboardStats, ExportFormat, NewWallet, TransactionPage, Wallet, WalletPerformance,
    WalletStats, WalletTransaction, WalletUpdate,
};
pub use trade::{TradeRecord, TradeRequest, TradeSide};
pub use token::{fixed_token_price, DisplayToken, TokenDetails, FIXED_TOKEN_PRICE_WEI};
pub use trader::{rank_traders, Trader, TraderDetails};
pub use units::{to_ether, to_ether_display, to_wei, BasisPoints, UnitsError};
pub use swipe::{
    classify, DragState, SwipeDeck, SwipeDirection, SwipeIntent, SwipeResolution, Vector2,
};
pub use fixtures::{demo_traders, meme_cards, MemeCard};
