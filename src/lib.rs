//! MemeTrader - memecoin wallet tracking and copy-trading client
//!
//! # Modules
//!
//! - `domain`: Core types (Wallet, Trade, Token, Trader, swipe gestures, units)
//! - `ports`: Trait abstractions (WalletApi, ChainContracts, HistoryPort, Notifier, ExportSink)
//! - `adapters`: External implementations (REST client, EVM contracts, local files, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Wallet store, trading deck, trader board and polling

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
