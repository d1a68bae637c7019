//! CLI Adapter
//!
//! Command-line interface for the MemeTrader client.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    CliApp, Command, Gesture, HistoryCmd, InitConfigCmd, RecentTradesCmd, SwipeCmd, TokensCmd,
    TradeCmd, TradersCmd, WalletsCmd,
};

use anyhow::Result;

/// Parse the process arguments
pub fn init() -> CliApp {
    use clap::Parser;
    CliApp::parse()
}

/// Execute the CLI command
pub async fn execute(app: CliApp) -> Result<()> {
    commands::execute(app).await
}
