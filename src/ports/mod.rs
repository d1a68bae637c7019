//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The backend wallet/trade REST API
//! - The token factory and copy-trading contracts
//! - Historical price assets
//! - User-facing notices and export downloads

pub mod wallet_api;
pub mod contracts;
pub mod notifier;
pub mod export;
pub mod mocks;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use wallet_api::{ApiError, WalletApi};
pub use contracts::{ChainContracts, ContractError, CreatedToken, TxOutcome};
pub use notifier::{Notice, NoticeLevel, Notifier};
pub use export::{ExportError, ExportSink};

/// Historical data error type
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("No price history for {0}")]
    NotFound(String),

    #[error("Failed to read price history: {0}")]
    Io(String),

    #[error("Data parsing error: {0}")]
    ParseError(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// OHLCV data structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Historical data query parameters. Daily candles, inclusive range.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalQuery {
    pub symbol: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl HistoricalQuery {
    pub fn new(symbol: impl Into<String>, from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            from,
            to,
        }
    }

    /// One year of daily candles ending at `to`
    pub fn one_year(symbol: impl Into<String>, to: NaiveDate) -> Self {
        let from = to - chrono::Duration::days(365);
        Self::new(symbol, from, to)
    }

    pub fn validate(&self) -> Result<(), HistoryError> {
        if self.symbol.is_empty()
            || !self.symbol.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        {
            return Err(HistoryError::InvalidQuery(format!("bad symbol '{}'", self.symbol)));
        }
        if self.from > self.to {
            return Err(HistoryError::InvalidQuery(format!(
                "from {} is after to {}",
                self.from, self.to
            )));
        }
        Ok(())
    }
}

/// Source of historical daily candles
#[async_trait]
pub trait HistoryPort: Send + Sync {
    async fn fetch_history(&self, query: &HistoricalQuery) -> Result<Vec<Ohlcv>, HistoryError>;
}
