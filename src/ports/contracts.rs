//! Token factory and copy-trading contracts as seen by the client
//!
//! All balance, fee and accounting rules live in the deployed contracts.
//! The client only converts units, submits calls and translates failures.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{fixed_token_price, DisplayToken, Trader, UnitsError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContractError {
    #[error("No wallet detected. Please install MetaMask (or configure a signer key) to continue.")]
    WalletNotInstalled,

    #[error("Contract not initialized. Connect your wallet first.")]
    NotInitialized,

    #[error("Transaction was rejected in the wallet")]
    UserRejected,

    #[error("Insufficient funds to cover the amount plus gas")]
    InsufficientFunds,

    #[error("Contract is not deployed on the connected network")]
    ContractNotDeployed,

    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Transaction confirmed but no {0} event was emitted")]
    MissingEvent(&'static str),

    #[error("Blockchain request failed: {0}")]
    Rpc(String),
}

impl ContractError {
    /// Translate a raw provider or wallet error message.
    ///
    /// Matching is by substring. Unknown messages are kept verbatim in `Rpc`.
    pub fn from_provider_message(raw: &str) -> Self {
        let lower = raw.to_ascii_lowercase();

        if lower.contains("user rejected")
            || lower.contains("user denied")
            || lower.contains("action_rejected")
        {
            return ContractError::UserRejected;
        }

        if lower.contains("insufficient funds") {
            return ContractError::InsufficientFunds;
        }

        if lower.contains("returned no data")
            || lower.contains("could not decode")
            || lower.contains("no contract code")
            || lower.contains("contract not deployed")
        {
            return ContractError::ContractNotDeployed;
        }

        if let Some(pos) = lower.find("execution reverted") {
            let rest = raw[pos + "execution reverted".len()..]
                .trim_start_matches(|c: char| c == ':' || c.is_whitespace())
                .trim_end_matches(|c: char| c == '"' || c == ',' || c.is_whitespace());
            let reason = if rest.is_empty() { "unknown reason" } else { rest };
            return ContractError::Reverted(reason.to_string());
        }

        ContractError::Rpc(raw.to_string())
    }
}

impl From<UnitsError> for ContractError {
    fn from(err: UnitsError) -> Self {
        ContractError::InvalidInput(err.to_string())
    }
}

/// Result of a confirmed write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutcome {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    /// Amount reported by the emitted event, in ether
    pub amount: Option<String>,
}

/// A token created through the factory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedToken {
    pub address: String,
    pub tx_hash: String,
}

/// Client for the factory and copy-trading contracts.
///
/// `connect` must succeed before any other call; until then calls fail with
/// [`ContractError::NotInitialized`]. Amounts cross this boundary as ether
/// strings and percentages as plain percent.
#[async_trait]
pub trait ChainContracts: Send + Sync {
    /// Connect the wallet and bind the contracts. Returns the account address.
    async fn connect(&self) -> Result<String, ContractError>;

    async fn disconnect(&self);

    async fn is_connected(&self) -> bool;

    /// Token creation fee, in ether
    async fn fee(&self) -> Result<String, ContractError>;

    async fn get_all_tokens(&self) -> Result<Vec<DisplayToken>, ContractError>;

    async fn get_token(&self, token: &str) -> Result<DisplayToken, ContractError>;

    /// Cost in ether of buying `amount` tokens at the current curve position
    async fn calculate_token_cost(&self, token: &str, amount: &str)
        -> Result<String, ContractError>;

    /// Display price for factory tokens, as an ether string
    fn fixed_price(&self) -> String {
        fixed_token_price()
    }

    async fn create_token(&self, name: &str, symbol: &str) -> Result<CreatedToken, ContractError>;

    async fn buy_token(&self, token: &str, amount: &str) -> Result<TxOutcome, ContractError>;

    async fn sell_token(&self, token: &str, amount: &str) -> Result<TxOutcome, ContractError>;

    async fn get_all_traders(&self) -> Result<Vec<Trader>, ContractError>;

    /// Connected account's stake with `trader`, in ether
    async fn get_user_investment(&self, trader: &str) -> Result<String, ContractError>;

    /// Connected account's total copy-trading value, in ether
    async fn get_user_portfolio_value(&self) -> Result<String, ContractError>;

    async fn register_trader(
        &self,
        name: &str,
        minimum_investment: &str,
        profit_share_percent: f64,
    ) -> Result<TxOutcome, ContractError>;

    async fn invest_in_trader(&self, trader: &str, amount: &str)
        -> Result<TxOutcome, ContractError>;

    /// Buy a token on behalf of the connected trader's pool
    async fn trader_buy_token(&self, token: &str, amount: &str)
        -> Result<TxOutcome, ContractError>;

    async fn withdraw_from_trader(&self, trader: &str) -> Result<TxOutcome, ContractError>;
}
