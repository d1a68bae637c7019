//! Backend REST Adapter
//!
//! Implementation of the WalletApi port over HTTP with reqwest.

mod client;

pub use client::{ApiConfig, WalletApiClient, DEFAULT_API_BASE_URL};
