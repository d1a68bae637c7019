//! Historical Price Adapter
//!
//! Reads daily OHLCV candles bundled as static JSON assets.

mod loader;

pub use loader::{history_path, FileHistoryLoader, HISTORY_DIR};
