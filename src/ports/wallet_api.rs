use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    DashboardStats, ExportFormat, NewWallet, TradeRecord, TradeRequest, TransactionPage, Wallet,
    WalletPerformance, WalletUpdate,
};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    #[error("API error {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Error body the backend sends with non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    /// Build the error for a non-2xx response. Prefers the body's `error`
    /// field, then the raw body, then the status reason.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.error,
            Err(_) if !body.trim().is_empty() => body.trim().to_string(),
            Err(_) => reason.unwrap_or("Request failed").to_string(),
        };
        ApiError::Http { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Text suitable for showing to the user
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Backend REST API for tracked wallets and trades.
///
/// Each method issues exactly one request. Implementations do not retry.
#[async_trait]
pub trait WalletApi: Send + Sync {
    async fn list_wallets(&self) -> Result<Vec<Wallet>, ApiError>;

    async fn get_wallet(&self, id: &str) -> Result<Wallet, ApiError>;

    async fn create_wallet(&self, wallet: &NewWallet) -> Result<Wallet, ApiError>;

    async fn update_wallet(&self, id: &str, update: &WalletUpdate) -> Result<Wallet, ApiError>;

    async fn delete_wallet(&self, id: &str) -> Result<(), ApiError>;

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

    async fn search_wallets(&self, query: &str) -> Result<Vec<Wallet>, ApiError>;

    /// `cursor` is passed through exactly as the previous page returned it
    async fn wallet_transactions(
        &self,
        id: &str,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<TransactionPage, ApiError>;

    async fn wallet_performance(
        &self,
        id: &str,
        period: Option<&str>,
    ) -> Result<WalletPerformance, ApiError>;

    /// Raw export document in the requested format
    async fn export_wallets(&self, format: ExportFormat) -> Result<Vec<u8>, ApiError>;

    async fn execute_trade(&self, request: &TradeRequest) -> Result<TradeRecord, ApiError>;

    async fn recent_trades(&self, limit: Option<u32>) -> Result<Vec<TradeRecord>, ApiError>;
}
