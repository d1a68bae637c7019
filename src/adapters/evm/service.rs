//! Contract Service
//!
//! Holds the provider, signer and contract bindings once `connect` has run.
//! Writes wait for one confirmation and read the resulting event from the
//! receipt logs.

use std::fmt::Display;
use std::str::FromStr;

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolEvent;
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{
    to_ether, to_ether_display, to_wei, BasisPoints, DisplayToken, TokenDetails, Trader,
    TraderDetails,
};
use crate::ports::{ChainContracts, ContractError, CreatedToken, TxOutcome};

use super::abi::{CopyTrading, Factory};

/// Stand-in for a browser wallet: where to send transactions and who signs
#[derive(Debug, Clone, Default)]
pub struct WalletProviderConfig {
    pub rpc_url: String,
    /// Hex signer key. Without it there is no wallet to connect.
    pub private_key: Option<String>,
    pub factory_address: String,
    pub copy_trading_address: String,
}

impl WalletProviderConfig {
    fn has_wallet(&self) -> bool {
        !self.rpc_url.trim().is_empty()
            && self
                .private_key
                .as_deref()
                .map(|k| !k.trim().is_empty())
                .unwrap_or(false)
    }
}

#[derive(Clone)]
struct Connection {
    account: Address,
    provider: DynProvider,
    factory: Factory::FactoryInstance<DynProvider>,
    copy_trading: CopyTrading::CopyTradingInstance<DynProvider>,
}

pub struct EvmContractService {
    config: WalletProviderConfig,
    connection: RwLock<Option<Connection>>,
}

impl EvmContractService {
    pub fn new(config: WalletProviderConfig) -> Self {
        Self {
            config,
            connection: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &WalletProviderConfig {
        &self.config
    }

    /// Connected account, if any
    pub async fn account(&self) -> Option<String> {
        self.connection
            .read()
            .await
            .as_ref()
            .map(|c| c.account.to_string())
    }

    async fn connection(&self) -> Result<Connection, ContractError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(ContractError::NotInitialized)
    }

    async fn open(&self) -> Result<Connection, ContractError> {
        if !self.config.has_wallet() {
            return Err(ContractError::WalletNotInstalled);
        }
        let key = self.config.private_key.as_deref().unwrap_or_default();
        let signer = PrivateKeySigner::from_str(key.trim().trim_start_matches("0x"))
            .map_err(|e| ContractError::InvalidInput(format!("Invalid signer key: {}", e)))?;
        let url = Url::parse(self.config.rpc_url.trim())
            .map_err(|e| ContractError::InvalidInput(format!("Invalid RPC URL: {}", e)))?;
        let factory_address = parse_address(&self.config.factory_address)?;
        let copy_trading_address = parse_address(&self.config.copy_trading_address)?;

        let account = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url)
            .erased();

        for address in [factory_address, copy_trading_address] {
            let code = provider.get_code_at(address).await.map_err(chain_error)?;
            if code.is_empty() {
                tracing::warn!(%address, "No contract code at configured address");
                return Err(ContractError::ContractNotDeployed);
            }
        }

        Ok(Connection {
            account,
            factory: Factory::new(factory_address, provider.clone()),
            copy_trading: CopyTrading::new(copy_trading_address, provider.clone()),
            provider,
        })
    }

    async fn trader_details(&self) -> Result<Vec<TraderDetails>, ContractError> {
        let conn = self.connection().await?;
        let infos = conn
            .copy_trading
            .getAllTraderDetails()
            .call()
            .await
            .map_err(chain_error)?;
        Ok(usable_traders(infos))
    }
}

fn chain_error(err: impl Display) -> ContractError {
    let message = err.to_string();
    tracing::debug!(error = %message, "Chain call failed");
    ContractError::from_provider_message(&message)
}

fn parse_address(raw: &str) -> Result<Address, ContractError> {
    Address::from_str(raw.trim())
        .map_err(|e| ContractError::InvalidInput(format!("Invalid address '{}': {}", raw, e)))
}

fn token_details(sale: Factory::TokenSale) -> TokenDetails {
    TokenDetails {
        token: sale.token.to_string(),
        name: sale.name,
        symbol: sale.symbol,
        creator: sale.creator.to_string(),
        sold: sale.sold,
        raised: sale.raised,
        is_open: sale.isOpen,
    }
}

fn trader_details(info: CopyTrading::TraderInfo) -> Result<TraderDetails, ContractError> {
    Ok(TraderDetails {
        address: info.traderAddress.to_string(),
        name: info.name,
        minimum_investment: info.minimumInvestment,
        profit_sharing: BasisPoints::try_from_u256(info.profitSharingPercentage)?,
        total_pool_value: info.totalPoolValue,
        total_investors: info.totalInvestors.saturating_to::<u64>(),
        total_trades: info.totalTrades.saturating_to::<u64>(),
        is_active: info.isActive,
    })
}

/// Map on-chain trader records, dropping any the contract reports with an
/// out-of-range profit share
fn usable_traders(infos: Vec<CopyTrading::TraderInfo>) -> Vec<TraderDetails> {
    infos
        .into_iter()
        .filter_map(|info| {
            let address = info.traderAddress;
            match trader_details(info) {
                Ok(details) => Some(details),
                Err(e) => {
                    tracing::warn!(trader = %address, error = %e, "Skipping malformed trader record");
                    None
                }
            }
        })
        .collect()
}

fn display_tokens(details: &[TokenDetails]) -> Vec<DisplayToken> {
    let mut rng = rand::thread_rng();
    details
        .iter()
        .map(|d| DisplayToken::from_details(d, &mut rng))
        .collect()
}

fn display_traders(details: &[TraderDetails]) -> Vec<Trader> {
    let mut rng = rand::thread_rng();
    details
        .iter()
        .map(|d| Trader::from_details(d, &mut rng))
        .collect()
}

fn confirmed(receipt: &TransactionReceipt) -> Result<(), ContractError> {
    if receipt.status() {
        Ok(())
    } else {
        Err(ContractError::Reverted(format!(
            "transaction {} failed",
            receipt.transaction_hash
        )))
    }
}

/// First log in the receipt that decodes as `E`
fn find_event<E: SolEvent>(receipt: &TransactionReceipt) -> Option<E> {
    receipt
        .inner
        .logs()
        .iter()
        .find_map(|log| log.log_decode::<E>().ok())
        .map(|log| log.inner.data)
}

fn outcome(receipt: &TransactionReceipt, amount: Option<U256>) -> TxOutcome {
    TxOutcome {
        tx_hash: receipt.transaction_hash.to_string(),
        block_number: receipt.block_number,
        amount: amount.map(to_ether),
    }
}

#[async_trait]
impl ChainContracts for EvmContractService {
    async fn connect(&self) -> Result<String, ContractError> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.account.to_string());
        }

        let mut guard = self.connection.write().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.account.to_string());
        }

        let conn = self.open().await?;
        let chain_id = conn.provider.get_chain_id().await.map_err(chain_error)?;
        let account = conn.account.to_string();
        tracing::info!(%account, chain_id, "Wallet connected");
        *guard = Some(conn);
        Ok(account)
    }

    async fn disconnect(&self) {
        if self.connection.write().await.take().is_some() {
            tracing::info!("Wallet disconnected");
        }
    }

    async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    async fn fee(&self) -> Result<String, ContractError> {
        let conn = self.connection().await?;
        let fee = conn.factory.fee().call().await.map_err(chain_error)?;
        Ok(to_ether(fee))
    }

    async fn get_all_tokens(&self) -> Result<Vec<DisplayToken>, ContractError> {
        let conn = self.connection().await?;
        let sales = conn
            .factory
            .getAllTokenDetails()
            .call()
            .await
            .map_err(chain_error)?;
        let details: Vec<TokenDetails> = sales.into_iter().map(token_details).collect();
        tracing::debug!(count = details.len(), "Fetched factory tokens");
        Ok(display_tokens(&details))
    }

    async fn get_token(&self, token: &str) -> Result<DisplayToken, ContractError> {
        let conn = self.connection().await?;
        let address = parse_address(token)?;
        let sale = conn
            .factory
            .getTokenDetails(address)
            .call()
            .await
            .map_err(chain_error)?;
        let details = [token_details(sale)];
        display_tokens(&details)
            .pop()
            .ok_or_else(|| ContractError::Rpc("empty token details".into()))
    }

    async fn calculate_token_cost(
        &self,
        token: &str,
        amount: &str,
    ) -> Result<String, ContractError> {
        let conn = self.connection().await?;
        let address = parse_address(token)?;
        let cost = conn
            .factory
            .calculateCost(address, to_wei(amount)?)
            .call()
            .await
            .map_err(chain_error)?;
        Ok(to_ether(cost))
    }

    async fn create_token(&self, name: &str, symbol: &str) -> Result<CreatedToken, ContractError> {
        if name.trim().is_empty() || symbol.trim().is_empty() {
            return Err(ContractError::InvalidInput(
                "Token name and symbol are required".into(),
            ));
        }
        let conn = self.connection().await?;
        let fee = conn.factory.fee().call().await.map_err(chain_error)?;

        tracing::info!(name, symbol, fee = %to_ether_display(fee), "Creating token");
        let receipt = conn
            .factory
            .create(name.to_string(), symbol.to_string())
            .value(fee)
            .send()
            .await
            .map_err(chain_error)?
            .get_receipt()
            .await
            .map_err(chain_error)?;
        confirmed(&receipt)?;

        let created = find_event::<Factory::Created>(&receipt)
            .ok_or(ContractError::MissingEvent("Created"))?;
        Ok(CreatedToken {
            address: created.token.to_string(),
            tx_hash: receipt.transaction_hash.to_string(),
        })
    }

    async fn buy_token(&self, token: &str, amount: &str) -> Result<TxOutcome, ContractError> {
        let conn = self.connection().await?;
        let address = parse_address(token)?;
        let amount_wei = to_wei(amount)?;
        let cost = conn
            .factory
            .calculateCost(address, amount_wei)
            .call()
            .await
            .map_err(chain_error)?;

        tracing::info!(%address, amount, cost = %to_ether_display(cost), "Buying token");
        let receipt = conn
            .factory
            .buy(address, amount_wei)
            .value(cost)
            .send()
            .await
            .map_err(chain_error)?
            .get_receipt()
            .await
            .map_err(chain_error)?;
        confirmed(&receipt)?;
        Ok(outcome(&receipt, Some(amount_wei)))
    }

    async fn sell_token(&self, token: &str, amount: &str) -> Result<TxOutcome, ContractError> {
        let conn = self.connection().await?;
        let address = parse_address(token)?;
        let amount_wei = to_wei(amount)?;

        tracing::info!(%address, amount, "Selling token");
        let receipt = conn
            .factory
            .sell(address, amount_wei)
            .send()
            .await
            .map_err(chain_error)?
            .get_receipt()
            .await
            .map_err(chain_error)?;
        confirmed(&receipt)?;
        Ok(outcome(&receipt, Some(amount_wei)))
    }

    async fn get_all_traders(&self) -> Result<Vec<Trader>, ContractError> {
        let details = self.trader_details().await?;
        Ok(display_traders(&details))
    }

    async fn get_user_investment(&self, trader: &str) -> Result<String, ContractError> {
        let conn = self.connection().await?;
        let trader = parse_address(trader)?;
        let value = conn
            .copy_trading
            .getUserInvestment(conn.account, trader)
            .call()
            .await
            .map_err(chain_error)?;
        Ok(to_ether(value))
    }

    async fn get_user_portfolio_value(&self) -> Result<String, ContractError> {
        let conn = self.connection().await?;
        let value = conn
            .copy_trading
            .getUserPortfolioValue(conn.account)
            .call()
            .await
            .map_err(chain_error)?;
        Ok(to_ether(value))
    }

    async fn register_trader(
        &self,
        name: &str,
        minimum_investment: &str,
        profit_share_percent: f64,
    ) -> Result<TxOutcome, ContractError> {
        if name.trim().is_empty() {
            return Err(ContractError::InvalidInput("Trader name is required".into()));
        }
        let minimum = to_wei(minimum_investment)?;
        let share = BasisPoints::from_percent(profit_share_percent)?;
        let conn = self.connection().await?;

        tracing::info!(name, minimum_investment, %share, "Registering trader");
        let receipt = conn
            .copy_trading
            .registerTrader(name.to_string(), minimum, share.to_u256())
            .send()
            .await
            .map_err(chain_error)?
            .get_receipt()
            .await
            .map_err(chain_error)?;
        confirmed(&receipt)?;

        find_event::<CopyTrading::TraderRegistered>(&receipt)
            .ok_or(ContractError::MissingEvent("TraderRegistered"))?;
        Ok(outcome(&receipt, None))
    }

    async fn invest_in_trader(
        &self,
        trader: &str,
        amount: &str,
    ) -> Result<TxOutcome, ContractError> {
        let address = parse_address(trader)?;
        let amount_wei = to_wei(amount)?;

        let details = self.trader_details().await?;
        let target = details
            .iter()
            .find(|d| parse_address(&d.address).ok() == Some(address))
            .ok_or_else(|| ContractError::InvalidInput(format!("Unknown trader {}", trader)))?;
        if !target.is_active {
            return Err(ContractError::InvalidInput(format!(
                "{} is not accepting investments",
                target.name
            )));
        }
        if !target.accepts_investment(amount_wei) {
            return Err(ContractError::InvalidInput(format!(
                "Minimum investment is {} ETH",
                to_ether_display(target.minimum_investment)
            )));
        }

        let conn = self.connection().await?;
        tracing::info!(trader = %address, amount, "Investing in trader");
        let receipt = conn
            .copy_trading
            .invest(address)
            .value(amount_wei)
            .send()
            .await
            .map_err(chain_error)?
            .get_receipt()
            .await
            .map_err(chain_error)?;
        confirmed(&receipt)?;

        let invested = find_event::<CopyTrading::Invested>(&receipt)
            .ok_or(ContractError::MissingEvent("Invested"))?;
        Ok(outcome(&receipt, Some(invested.amount)))
    }

    async fn trader_buy_token(
        &self,
        token: &str,
        amount: &str,
    ) -> Result<TxOutcome, ContractError> {
        let conn = self.connection().await?;
        let address = parse_address(token)?;
        let amount_wei = to_wei(amount)?;

        tracing::info!(token = %address, amount, "Trader pool buy");
        let receipt = conn
            .copy_trading
            .buyToken(address, amount_wei)
            .send()
            .await
            .map_err(chain_error)?
            .get_receipt()
            .await
            .map_err(chain_error)?;
        confirmed(&receipt)?;

        let amount = find_event::<CopyTrading::TradeExecuted>(&receipt)
            .map(|e| e.amount)
            .unwrap_or(amount_wei);
        Ok(outcome(&receipt, Some(amount)))
    }

    async fn withdraw_from_trader(&self, trader: &str) -> Result<TxOutcome, ContractError> {
        let conn = self.connection().await?;
        let address = parse_address(trader)?;

        tracing::info!(trader = %address, "Withdrawing from trader");
        let receipt = conn
            .copy_trading
            .withdraw(address)
            .send()
            .await
            .map_err(chain_error)?
            .get_receipt()
            .await
            .map_err(chain_error)?;
        confirmed(&receipt)?;

        let withdrawn = find_event::<CopyTrading::Withdrawn>(&receipt)
            .ok_or(ContractError::MissingEvent("Withdrawn"))?;
        Ok(outcome(&receipt, Some(withdrawn.amount)))
    }
}
