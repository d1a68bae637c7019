//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits:
//! - HTTP: MemeTrader backend REST client
//! - EVM: token factory and copy-trading contracts via alloy
//! - History: daily price candles from local JSON assets
//! - Local: file export sink and tracing-backed notices
//! - CLI: Command-line interface handlers

pub mod http;
pub mod evm;
pub mod history;
pub mod local;
pub mod cli;

pub use http::WalletApiClient;
pub use evm::{EvmContractService, WalletProviderConfig};
pub use history::FileHistoryLoader;
pub use local::{FileExportSink, TracingNotifier};
pub use cli::CliApp;
