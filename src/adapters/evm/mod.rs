//! EVM Adapter
//!
//! alloy-backed client for the token factory and copy-trading contracts.

pub mod abi;
pub mod service;

pub use service::{EvmContractService, WalletProviderConfig};
