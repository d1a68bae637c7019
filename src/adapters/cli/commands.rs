//! CLI Command Handlers
//!
//! Implementation of all CLI commands for the MemeTrader client.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::adapters::evm::EvmContractService;
use crate::adapters::history::FileHistoryLoader;
use crate::adapters::http::WalletApiClient;
use crate::adapters::local::{FileExportSink, TracingNotifier, NOTICE_TARGET};
use crate::application::{TraderBoard, TradingDeck, WalletStore};
use crate::config::{load_config, load_config_or_default, write_default_config, Config, DEFAULT_CONFIG_PATH};
use crate::domain::{
    meme_cards, ExportFormat, NewWallet, SwipeDirection, TradeRequest, TradeSide, Vector2,
    WalletUpdate,
};
use crate::ports::{ChainContracts, HistoricalQuery, HistoryPort, WalletApi};

/// MemeTrader - memecoin wallet tracking and copy-trading client
#[derive(Parser, Debug)]
#[command(
    name = "memetrader",
    version = env!("CARGO_PKG_VERSION"),
    about = "Memecoin wallet tracking, token factory and copy-trading client",
    long_about = "MemeTrader talks to the MemeTrader backend for wallet tracking and trades, \
                  and to the token factory and copy-trading contracts on an EVM chain."
)]
pub struct CliApp {
    /// The command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage tracked wallets
    #[command(subcommand)]
    Wallets(WalletsCmd),

    /// Show dashboard totals
    Stats,

    /// Submit a trade through the backend
    Trade(TradeCmd),

    /// Show recent trades
    RecentTrades(RecentTradesCmd),

    /// Token factory
    #[command(subcommand)]
    Tokens(TokensCmd),

    /// Copy-trading
    #[command(subcommand)]
    Traders(TradersCmd),

    /// Connect the configured wallet and print the account
    Connect,

    /// Print daily price history from local assets
    History(HistoryCmd),

    /// Replay gestures against the demo swipe deck
    Swipe(SwipeCmd),

    /// Write a default configuration file
    InitConfig(InitConfigCmd),
}

#[derive(Subcommand, Debug)]
pub enum WalletsCmd {
    /// List tracked wallets with dashboard totals
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Start tracking a wallet
    Add {
        address: String,
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Change a wallet's name, description or active flag
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Stop tracking a wallet
    Delete { id: String },
    /// Search wallets by name or address
    Search { query: String },
    /// Show a page of a wallet's transactions
    Txs {
        id: String,
        #[arg(long)]
        cursor: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show a wallet's performance
    Performance {
        id: String,
        #[arg(long)]
        period: Option<String>,
    },
    /// Download all wallets as JSON or CSV
    Export {
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
        /// Output directory (defaults to assets.export_dir)
        #[arg(short, long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct TradeCmd {
    /// Token contract address
    pub token: String,
    /// buy or sell
    pub side: TradeSide,
    pub amount: f64,
    /// Trade from this wallet address
    #[arg(short, long)]
    pub wallet: Option<String>,
}

#[derive(Args, Debug)]
pub struct RecentTradesCmd {
    #[arg(short, long)]
    pub limit: Option<u32>,
}

#[derive(Subcommand, Debug)]
pub enum TokensCmd {
    /// List factory tokens
    List,
    /// Show one token
    Show { address: String },
    /// Cost in ETH of buying an amount of tokens
    Cost { address: String, amount: String },
    /// Create a token (pays the factory fee)
    Create { name: String, symbol: String },
    /// Buy tokens from the bonding curve
    Buy { address: String, amount: String },
    /// Sell tokens back
    Sell { address: String, amount: String },
}

#[derive(Subcommand, Debug)]
pub enum TradersCmd {
    /// Show the trader leaderboard
    List,
    /// Register the connected account as a trader
    Register {
        name: String,
        /// Minimum investment in ETH
        #[arg(long, default_value = "0.1")]
        min_investment: String,
        /// Profit share in percent
        #[arg(long, default_value_t = 20.0)]
        profit_share: f64,
    },
    /// Invest ETH with a trader
    Invest { trader: String, amount: String },
    /// Withdraw everything invested with a trader
    Withdraw { trader: String },
    /// Buy a token for the connected trader's pool
    PoolBuy { token: String, amount: String },
    /// Show the connected account's stake and total value
    Portfolio {
        /// Also show the stake with this trader
        #[arg(long)]
        trader: Option<String>,
    },
    /// Keep the leaderboard refreshed until Ctrl+C
    Watch {
        /// Refresh interval in seconds (defaults to polling.trader_refresh_secs)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[derive(Args, Debug)]
pub struct HistoryCmd {
    pub symbol: String,
    /// First day, YYYY-MM-DD (defaults to one year before --to)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Print only the last N candles
    #[arg(short, long)]
    pub tail: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SwipeCmd {
    /// Gestures: `left`, `right`, `up`, or a drag `dx,dy` with optional
    /// release velocity `dx,dy@vx,vy`
    #[arg(required = true, allow_hyphen_values = true)]
    pub gestures: Vec<Gesture>,
}

#[derive(Args, Debug)]
pub struct InitConfigCmd {
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub path: PathBuf,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// One swipe-deck input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Button(SwipeDirection),
    Drag { offset: Vector2, velocity: Vector2 },
}

fn parse_vector(raw: &str) -> Result<Vector2, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected 'x,y', got '{}'", raw))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("bad x in '{}'", raw))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("bad y in '{}'", raw))?;
    Ok(Vector2::new(x, y))
}

impl FromStr for Gesture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => return Ok(Gesture::Button(SwipeDirection::Left)),
            "right" => return Ok(Gesture::Button(SwipeDirection::Right)),
            "up" => return Ok(Gesture::Button(SwipeDirection::Up)),
            _ => {}
        }
        let (offset, velocity) = match s.split_once('@') {
            Some((offset, velocity)) => (parse_vector(offset)?, parse_vector(velocity)?),
            None => (parse_vector(s)?, Vector2::ZERO),
        };
        Ok(Gesture::Drag { offset, velocity })
    }
}

/// Execute the parsed command
pub async fn execute(app: CliApp) -> Result<()> {
    if let Command::InitConfig(cmd) = &app.command {
        init_logging(app.verbose, app.debug, None)?;
        return init_config_command(cmd);
    }

    let config = match &app.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => load_config_or_default(DEFAULT_CONFIG_PATH)
            .context("Failed to load configuration")?,
    };
    init_logging(app.verbose, app.debug, Some(&config.logging.level))?;

    match app.command {
        Command::Wallets(cmd) => wallets_command(&config, cmd).await,
        Command::Stats => stats_command(&config).await,
        Command::Trade(cmd) => trade_command(&config, cmd).await,
        Command::RecentTrades(cmd) => recent_trades_command(&config, cmd).await,
        Command::Tokens(cmd) => tokens_command(&config, cmd).await,
        Command::Traders(cmd) => traders_command(&config, cmd).await,
        Command::Connect => connect_command(&config).await,
        Command::History(cmd) => history_command(&config, cmd).await,
        Command::Swipe(cmd) => swipe_command(cmd),
        Command::InitConfig(_) => Ok(()),
    }
}

/// Initialize logging. `RUST_LOG` wins, then the flags, then the configured
/// level. Notices are always shown.
fn init_logging(verbose: bool, debug: bool, configured: Option<&str>) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        configured.unwrap_or("warn")
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("{},{}=info", level, NOTICE_TARGET)))
        .context("Invalid log filter")?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn api_client(config: &Config) -> Result<WalletApiClient> {
    WalletApiClient::with_config(config.api.client_config())
        .context("Failed to create API client")
}

fn wallet_store(config: &Config) -> Result<WalletStore<WalletApiClient, TracingNotifier>> {
    Ok(WalletStore::new(api_client(config)?, TracingNotifier))
}

/// Build the contract service and connect it
async fn connected_contracts(config: &Config) -> Result<EvmContractService> {
    let service = EvmContractService::new(config.chain.wallet_provider());
    let account = service.connect().await?;
    tracing::debug!(%account, "Using connected account");
    Ok(service)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn wallets_command(config: &Config, cmd: WalletsCmd) -> Result<()> {
    let store = wallet_store(config)?;

    match cmd {
        WalletsCmd::List { json } => {
            store.load().await?;
            let state = store.snapshot().await;
            if json {
                return print_json(&state.wallets);
            }
            if let Some(stats) = &state.stats {
                println!(
                    "Wallets: {} ({} active)  Volume: {:.2}  P&L: {:.2}  Txs: {}",
                    stats.total_wallets,
                    stats.active_wallets,
                    stats.total_volume,
                    stats.total_profit_loss,
                    stats.total_transactions
                );
                println!();
            }
            for wallet in &state.wallets {
                println!(
                    "{:<12} {:<24} {:<44} {}",
                    wallet.id,
                    wallet.name,
                    wallet.address,
                    if wallet.is_active { "active" } else { "paused" }
                );
            }
        }
        WalletsCmd::Add {
            address,
            name,
            description,
        } => {
            let mut wallet = NewWallet::new(address, name);
            if let Some(description) = description {
                wallet = wallet.with_description(description);
            }
            let created = store.add_wallet(wallet).await?;
            println!("Added {} ({})", created.name, created.id);
        }
        WalletsCmd::Update {
            id,
            name,
            description,
            active,
        } => {
            let update = WalletUpdate {
                name,
                description,
                is_active: active,
            };
            if update.is_empty() {
                bail!("Nothing to update: pass --name, --description or --active");
            }
            let updated = store.update_wallet(&id, update).await?;
            println!("Updated {} ({})", updated.name, updated.id);
        }
        WalletsCmd::Delete { id } => {
            store.delete_wallet(&id).await?;
            println!("Deleted {}", id);
        }
        WalletsCmd::Search { query } => {
            for wallet in store.search(&query).await? {
                println!("{:<12} {:<24} {}", wallet.id, wallet.name, wallet.address);
            }
        }
        WalletsCmd::Txs { id, cursor, limit } => {
            let page = store.transactions(&id, cursor.as_deref(), limit).await?;
            for tx in &page.transactions {
                println!(
                    "{}  {:<6} {:>14} {:<8} {}",
                    tx.timestamp.format("%Y-%m-%d %H:%M"),
                    tx.kind,
                    tx.amount,
                    tx.token_symbol.as_deref().unwrap_or("-"),
                    tx.hash
                );
            }
            if let Some(next) = page.next_cursor {
                println!("\nMore: --cursor {}", next);
            }
        }
        WalletsCmd::Performance { id, period } => {
            let perf = store.performance(&id, period.as_deref()).await?;
            println!("Period:   {}", perf.period);
            println!("P&L:      {:.2}", perf.profit_loss);
            println!("ROI:      {:.2}%", perf.roi);
            println!("Trades:   {}", perf.trades);
            println!("Win rate: {:.1}%", perf.win_rate);
        }
        WalletsCmd::Export { format, out } => {
            let dir = out.unwrap_or_else(|| config.assets.export_path());
            let sink = FileExportSink::new(dir);
            let path = store.export(format, &sink).await?;
            println!("Exported to {}", path.display());
        }
    }

    Ok(())
}

async fn stats_command(config: &Config) -> Result<()> {
    let stats = api_client(config)?.dashboard_stats().await?;
    print_json(&stats)
}

async fn trade_command(config: &Config, cmd: TradeCmd) -> Result<()> {
    let mut request = TradeRequest::new(cmd.token, cmd.side, cmd.amount);
    if let Some(wallet) = cmd.wallet {
        request = request.from_wallet(wallet);
    }
    let record = api_client(config)?
        .execute_trade(&request)
        .await
        .context("Trade failed")?;
    println!("{}", record);
    Ok(())
}

async fn recent_trades_command(config: &Config, cmd: RecentTradesCmd) -> Result<()> {
    let trades = api_client(config)?.recent_trades(cmd.limit).await?;
    if trades.is_empty() {
        println!("No recent trades");
    }
    for trade in trades {
        println!("{}", trade);
    }
    Ok(())
}

async fn tokens_command(config: &Config, cmd: TokensCmd) -> Result<()> {
    let contracts = connected_contracts(config).await?;

    match cmd {
        TokensCmd::List => {
            let mut tokens = contracts.get_all_tokens().await?;
            tokens.sort_by(|a, b| b.raised_f64().total_cmp(&a.raised_f64()));
            println!("Price per token: {} ETH", contracts.fixed_price());
            for token in tokens {
                println!(
                    "{:<8} {:<20} raised {:>10} ETH  {}  {}",
                    token.symbol,
                    token.name,
                    token.raised,
                    if token.is_open { "open" } else { "closed" },
                    token.address
                );
            }
        }
        TokensCmd::Show { address } => {
            let token = contracts.get_token(&address).await?;
            print_json(&token)?;
            println!("Price: {} ETH per token", contracts.fixed_price());
        }
        TokensCmd::Cost { address, amount } => {
            let cost = contracts.calculate_token_cost(&address, &amount).await?;
            println!("{} tokens cost {} ETH", amount, cost);
        }
        TokensCmd::Create { name, symbol } => {
            let fee = contracts.fee().await?;
            println!("Creating {} ({}) for a fee of {} ETH", name, symbol, fee);
            let created = contracts.create_token(&name, &symbol).await?;
            println!("Token deployed at {}", created.address);
            println!("Transaction: {}", created.tx_hash);
        }
        TokensCmd::Buy { address, amount } => {
            let outcome = contracts.buy_token(&address, &amount).await?;
            println!("Bought {} tokens in {}", amount, outcome.tx_hash);
        }
        TokensCmd::Sell { address, amount } => {
            let outcome = contracts.sell_token(&address, &amount).await?;
            println!("Sold {} tokens in {}", amount, outcome.tx_hash);
        }
    }

    Ok(())
}

async fn traders_command(config: &Config, cmd: TradersCmd) -> Result<()> {
    let contracts = connected_contracts(config).await?;

    match cmd {
        TradersCmd::List => {
            let board = TraderBoard::new(Arc::new(contracts));
            board.refresh().await?;
            print_traders(&board.traders().await);
        }
        TradersCmd::Register {
            name,
            min_investment,
            profit_share,
        } => {
            let outcome = contracts
                .register_trader(&name, &min_investment, profit_share)
                .await?;
            println!("Registered {} in {}", name, outcome.tx_hash);
        }
        TradersCmd::Invest { trader, amount } => {
            let outcome = contracts.invest_in_trader(&trader, &amount).await?;
            println!(
                "Invested {} ETH in {}",
                outcome.amount.as_deref().unwrap_or(&amount),
                outcome.tx_hash
            );
        }
        TradersCmd::Withdraw { trader } => {
            let outcome = contracts.withdraw_from_trader(&trader).await?;
            println!(
                "Withdrew {} ETH in {}",
                outcome.amount.as_deref().unwrap_or("?"),
                outcome.tx_hash
            );
        }
        TradersCmd::PoolBuy { token, amount } => {
            let outcome = contracts.trader_buy_token(&token, &amount).await?;
            println!("Pool bought {} tokens in {}", amount, outcome.tx_hash);
        }
        TradersCmd::Portfolio { trader } => {
            if let Some(trader) = trader {
                let stake = contracts.get_user_investment(&trader).await?;
                println!("Stake with {}: {} ETH", trader, stake);
            }
            let total = contracts.get_user_portfolio_value().await?;
            println!("Portfolio value: {} ETH", total);
        }
        TradersCmd::Watch { interval } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.polling.trader_refresh());
            if interval.is_zero() {
                bail!("Refresh interval must be > 0");
            }

            let board = TraderBoard::new(Arc::new(contracts));
            let poller = board.watch(interval);
            tracing::info!(?interval, "Watching trader board (Ctrl+C to stop)");

            let mut seen = 0;
            let mut timer = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = timer.tick() => {
                        if poller.ticks() > seen {
                            seen = poller.ticks();
                            print_traders(&board.traders().await);
                        }
                    }
                }
            }
            drop(poller);
            tracing::info!("Stopped watching");
        }
    }

    Ok(())
}

fn print_traders(traders: &[crate::domain::Trader]) {
    for trader in traders {
        println!(
            "{:<16} pool {:>10} ETH  min {:>6} ETH  share {:>5.1}%  investors {:>4}  {}",
            trader.name,
            trader.total_pool_value,
            trader.minimum_investment,
            trader.profit_sharing_percentage,
            trader.total_investors,
            if trader.is_active { "active" } else { "inactive" }
        );
    }
}

async fn connect_command(config: &Config) -> Result<()> {
    let contracts = EvmContractService::new(config.chain.wallet_provider());
    let account = contracts.connect().await?;
    println!("Connected: {}", account);
    println!("Token fee: {} ETH", contracts.fee().await?);
    Ok(())
}

async fn history_command(config: &Config, cmd: HistoryCmd) -> Result<()> {
    let to = cmd.to.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let query = match cmd.from {
        Some(from) => HistoricalQuery::new(cmd.symbol, from, to),
        None => HistoricalQuery::one_year(cmd.symbol, to),
    };

    let loader = FileHistoryLoader::new(config.assets.root_path());
    let candles = loader.fetch_history(&query).await?;
    let skip = cmd
        .tail
        .map(|n| candles.len().saturating_sub(n))
        .unwrap_or(0);

    println!("{:<10} {:>12} {:>12} {:>12} {:>12} {:>14}", "date", "open", "high", "low", "close", "volume");
    for c in candles.iter().skip(skip) {
        println!(
            "{:<10} {:>12.6} {:>12.6} {:>12.6} {:>12.6} {:>14.0}",
            c.timestamp.format("%Y-%m-%d"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        );
    }
    Ok(())
}

fn swipe_command(cmd: SwipeCmd) -> Result<()> {
    let mut deck = TradingDeck::new(meme_cards(), TracingNotifier);

    for gesture in cmd.gestures {
        let before = deck.current().map(|c| c.symbol.clone()).unwrap_or_default();
        let event = match gesture {
            Gesture::Button(direction) => deck.swipe(direction),
            Gesture::Drag { offset, velocity } => {
                deck.drag_to(offset);
                deck.release(velocity)
            }
        };
        match event {
            Some(event) => println!(
                "{:<6} {:<6} next: {}",
                event.symbol,
                event.intent,
                event.next_symbol.as_deref().unwrap_or("-")
            ),
            None => println!("{:<6} snapped back", before),
        }
    }

    if !deck.watchlist().is_empty() {
        println!("\nWatchlist: {}", deck.watchlist().join(", "));
    }
    Ok(())
}

fn init_config_command(cmd: &InitConfigCmd) -> Result<()> {
    let path = write_default_config(&cmd.path, cmd.force)?;
    println!("Wrote {}", path.display());
    println!("Set MEMETRADER_PRIVATE_KEY in .env to sign transactions.");
    Ok(())
}
