//! In-memory port implementations that record calls and allow controlled responses

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::domain::{
    DashboardStats, DisplayToken, ExportFormat, NewWallet, TradeRecord, TradeRequest, Trader,
    TransactionPage, Wallet, WalletPerformance, WalletUpdate,
};

use super::contracts::{ChainContracts, ContractError, CreatedToken, TxOutcome};
use super::export::{ExportError, ExportSink};
use super::notifier::{Notice, Notifier};
use super::wallet_api::{ApiError, WalletApi};

#[derive(Debug, Default)]
struct ApiState {
    wallets: Vec<Wallet>,
    stats: DashboardStats,
    next_id: u64,
    failures: HashMap<String, ApiError>,
    calls: Vec<String>,
    trades: Vec<TradeRecord>,
}

/// Fake wallet backend. Clones share state, so a test can keep a handle
/// after moving the mock into the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockWalletApi {
    state: Arc<Mutex<ApiState>>,
}

impl MockWalletApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to seed server-side wallets
    pub fn with_wallets(self, wallets: Vec<Wallet>) -> Self {
        self.state.lock().unwrap().wallets = wallets;
        self
    }

    pub fn with_stats(self, stats: DashboardStats) -> Self {
        self.state.lock().unwrap().stats = stats;
        self
    }

    /// Make every call to `method` fail with `error`
    pub fn failing(self, method: &str, error: ApiError) -> Self {
        self.fail(method, error);
        self
    }

    pub fn fail(&self, method: &str, error: ApiError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(method.to_string(), error);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    /// Get all recorded calls, by method name
    pub fn get_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Wallets as the server currently sees them
    pub fn server_wallets(&self) -> Vec<Wallet> {
        self.state.lock().unwrap().wallets.clone()
    }

    fn enter(&self, method: &str) -> Result<std::sync::MutexGuard<'_, ApiState>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(method.to_string());
        if let Some(err) = state.failures.get(method).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

/// Wallet fixture with fixed timestamps
pub fn sample_wallet(id: &str, name: &str) -> Wallet {
    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Wallet {
        id: id.to_string(),
        address: format!("0x{:0>40}", id.len()),
        name: name.to_string(),
        description: None,
        is_active: true,
        created_at: ts,
        updated_at: ts,
        stats: None,
    }
}

fn not_found(id: &str) -> ApiError {
    ApiError::Http {
        status: 404,
        message: format!("Wallet {} not found", id),
    }
}

#[async_trait]
impl WalletApi for MockWalletApi {
    async fn list_wallets(&self) -> Result<Vec<Wallet>, ApiError> {
        Ok(self.enter("list_wallets")?.wallets.clone())
    }

    async fn get_wallet(&self, id: &str) -> Result<Wallet, ApiError> {
        let state = self.enter("get_wallet")?;
        state
            .wallets
            .iter()
            .find(|w| w.id == id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    async fn create_wallet(&self, wallet: &NewWallet) -> Result<Wallet, ApiError> {
        let mut state = self.enter("create_wallet")?;
        state.next_id += 1;
        let mut created = sample_wallet(&format!("w-{}", state.next_id), &wallet.name);
        created.address = wallet.address.clone();
        created.description = wallet.description.clone();
        state.wallets.push(created.clone());
        Ok(created)
    }

    async fn update_wallet(&self, id: &str, update: &WalletUpdate) -> Result<Wallet, ApiError> {
        let mut state = self.enter("update_wallet")?;
        let wallet = state
            .wallets
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| not_found(id))?;
        if let Some(name) = &update.name {
            wallet.name = name.clone();
        }
        if let Some(description) = &update.description {
            wallet.description = Some(description.clone());
        }
        if let Some(active) = update.is_active {
            wallet.is_active = active;
        }
        Ok(wallet.clone())
    }

    async fn delete_wallet(&self, id: &str) -> Result<(), ApiError> {
        let mut state = self.enter("delete_wallet")?;
        let before = state.wallets.len();
        state.wallets.retain(|w| w.id != id);
        if state.wallets.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        Ok(self.enter("dashboard_stats")?.stats.clone())
    }

    async fn search_wallets(&self, query: &str) -> Result<Vec<Wallet>, ApiError> {
        let state = self.enter("search_wallets")?;
        let needle = query.to_lowercase();
        Ok(state
            .wallets
            .iter()
            .filter(|w| {
                w.name.to_lowercase().contains(&needle) || w.address.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn wallet_transactions(
        &self,
        _id: &str,
        cursor: Option<&str>,
        _limit: Option<u32>,
    ) -> Result<TransactionPage, ApiError> {
        self.enter("wallet_transactions")?;
        Ok(TransactionPage {
            transactions: Vec::new(),
            next_cursor: cursor.map(|c| format!("{}-next", c)),
        })
    }

    async fn wallet_performance(
        &self,
        _id: &str,
        period: Option<&str>,
    ) -> Result<WalletPerformance, ApiError> {
        self.enter("wallet_performance")?;
        Ok(WalletPerformance {
            period: period.unwrap_or("30d").to_string(),
            ..Default::default()
        })
    }

    async fn export_wallets(&self, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        let state = self.enter("export_wallets")?;
        let body = match format {
            ExportFormat::Json => serde_json::to_vec(&state.wallets)
                .map_err(|e| ApiError::Decode(e.to_string()))?,
            ExportFormat::Csv => {
                let mut out = String::from("id,address,name\n");
                for w in &state.wallets {
                    out.push_str(&format!("{},{},{}\n", w.id, w.address, w.name));
                }
                out.into_bytes()
            }
        };
        Ok(body)
    }

    async fn execute_trade(&self, request: &TradeRequest) -> Result<TradeRecord, ApiError> {
        let mut state = self.enter("execute_trade")?;
        let record = TradeRecord {
            id: format!("t-{}", state.trades.len() + 1),
            wallet_address: request.wallet_address.clone(),
            token_address: Some(request.token_address.clone()),
            token_symbol: None,
            side: request.side,
            amount: request.amount,
            price: None,
            tx_hash: None,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };
        state.trades.push(record.clone());
        Ok(record)
    }

    async fn recent_trades(&self, limit: Option<u32>) -> Result<Vec<TradeRecord>, ApiError> {
        let state = self.enter("recent_trades")?;
        let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(state.trades.iter().rev().take(limit).cloned().collect())
    }
}

/// Notifier that keeps every notice
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Export sink that keeps artifacts in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryExportSink {
    saved: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemoryExportSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

impl ExportSink for MemoryExportSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        self.saved
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

#[derive(Debug, Default)]
struct ContractsState {
    connected: bool,
    account: Option<String>,
    traders: Vec<Trader>,
    tokens: Vec<DisplayToken>,
    calls: Vec<String>,
    failure: Option<ContractError>,
}

/// Fake contract client. Without an account it behaves like a browser
/// with no wallet extension.
#[derive(Debug, Clone, Default)]
pub struct MockContracts {
    state: Arc<Mutex<ContractsState>>,
}

impl MockContracts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, account: &str) -> Self {
        self.state.lock().unwrap().account = Some(account.to_string());
        self
    }

    pub fn with_traders(self, traders: Vec<Trader>) -> Self {
        self.state.lock().unwrap().traders = traders;
        self
    }

    pub fn with_tokens(self, tokens: Vec<DisplayToken>) -> Self {
        self.state.lock().unwrap().tokens = tokens;
        self
    }

    pub fn set_failure(&self, failure: Option<ContractError>) {
        self.state.lock().unwrap().failure = failure;
    }

    pub fn get_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    fn enter(&self, method: &str) -> Result<std::sync::MutexGuard<'_, ContractsState>, ContractError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(method.to_string());
        if !state.connected {
            return Err(ContractError::NotInitialized);
        }
        if let Some(err) = &state.failure {
            return Err(err.clone());
        }
        Ok(state)
    }

    fn outcome(&self, method: &str, amount: Option<&str>) -> Result<TxOutcome, ContractError> {
        let state = self.enter(method)?;
        Ok(TxOutcome {
            tx_hash: format!("0x{:064x}", state.calls.len()),
            block_number: Some(1),
            amount: amount.map(str::to_string),
        })
    }
}

#[async_trait]
impl ChainContracts for MockContracts {
    async fn connect(&self) -> Result<String, ContractError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("connect".to_string());
        let account = state.account.clone().ok_or(ContractError::WalletNotInstalled)?;
        state.connected = true;
        Ok(account)
    }

    async fn disconnect(&self) {
        self.state.lock().unwrap().connected = false;
    }

    async fn is_connected(&self) -> bool {
        self.state.lock().unwrap().connected
    }

    async fn fee(&self) -> Result<String, ContractError> {
        self.enter("fee")?;
        Ok("0.01".to_string())
    }

    async fn get_all_tokens(&self) -> Result<Vec<DisplayToken>, ContractError> {
        Ok(self.enter("get_all_tokens")?.tokens.clone())
    }

    async fn get_token(&self, token: &str) -> Result<DisplayToken, ContractError> {
        let state = self.enter("get_token")?;
        state
            .tokens
            .iter()
            .find(|t| t.address.eq_ignore_ascii_case(token))
            .cloned()
            .ok_or(ContractError::ContractNotDeployed)
    }

    async fn calculate_token_cost(&self, _token: &str, _amount: &str) -> Result<String, ContractError> {
        self.enter("calculate_token_cost")?;
        Ok("0.0001".to_string())
    }

    async fn create_token(&self, _name: &str, _symbol: &str) -> Result<CreatedToken, ContractError> {
        self.enter("create_token")?;
        Ok(CreatedToken {
            address: format!("0x{:040x}", 1),
            tx_hash: format!("0x{:064x}", 1),
        })
    }

    async fn buy_token(&self, _token: &str, amount: &str) -> Result<TxOutcome, ContractError> {
        self.outcome("buy_token", Some(amount))
    }

    async fn sell_token(&self, _token: &str, amount: &str) -> Result<TxOutcome, ContractError> {
        self.outcome("sell_token", Some(amount))
    }

    async fn get_all_traders(&self) -> Result<Vec<Trader>, ContractError> {
        Ok(self.enter("get_all_traders")?.traders.clone())
    }

    async fn get_user_investment(&self, _trader: &str) -> Result<String, ContractError> {
        self.enter("get_user_investment")?;
        Ok("0".to_string())
    }

    async fn get_user_portfolio_value(&self) -> Result<String, ContractError> {
        self.enter("get_user_portfolio_value")?;
        Ok("0".to_string())
    }

    async fn register_trader(
        &self,
        _name: &str,
        _minimum_investment: &str,
        _profit_share_percent: f64,
    ) -> Result<TxOutcome, ContractError> {
        self.outcome("register_trader", None)
    }

    async fn invest_in_trader(&self, _trader: &str, amount: &str) -> Result<TxOutcome, ContractError> {
        self.outcome("invest_in_trader", Some(amount))
    }

    async fn trader_buy_token(&self, _token: &str, amount: &str) -> Result<TxOutcome, ContractError> {
        self.outcome("trader_buy_token", Some(amount))
    }

    async fn withdraw_from_trader(&self, _trader: &str) -> Result<TxOutcome, ContractError> {
        self.outcome("withdraw_from_trader", None)
    }
}
