//! Daily candle files follow the layout
//! `<root>/stock_data_1years/<SYMBOL>_<from>_<to>_day.json`
//! and hold an aggregates document: `{"results": [{"t", "o", "h", "l", "c", "v"}]}`
//! with `t` in epoch milliseconds.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Deserialize;

use crate::ports::{HistoricalQuery, HistoryError, HistoryPort, Ohlcv};

pub const HISTORY_DIR: &str = "stock_data_1years";

#[derive(Debug, Deserialize)]
struct AggregateDocument {
    #[serde(default)]
    results: Vec<AggregateBar>,
}

#[derive(Debug, Deserialize)]
struct AggregateBar {
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    #[serde(default)]
    v: f64,
}

/// Location of the asset for `query` under `root`
pub fn history_path(root: &Path, query: &HistoricalQuery) -> PathBuf {
    root.join(HISTORY_DIR).join(format!(
        "{}_{}_{}_day.json",
        query.symbol,
        query.from.format("%Y-%m-%d"),
        query.to.format("%Y-%m-%d")
    ))
}

#[derive(Debug, Clone)]
pub struct FileHistoryLoader {
    root: PathBuf,
}

impl FileHistoryLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn parse(symbol: &str, bytes: &[u8]) -> Result<Vec<Ohlcv>, HistoryError> {
        let doc: AggregateDocument = serde_json::from_slice(bytes)
            .map_err(|e| HistoryError::ParseError(format!("{}: {}", symbol, e)))?;

        let mut candles = doc
            .results
            .into_iter()
            .map(|bar| {
                let timestamp = Utc.timestamp_millis_opt(bar.t).single().ok_or_else(|| {
                    HistoryError::ParseError(format!("{}: bad timestamp {}", symbol, bar.t))
                })?;
                Ok(Ohlcv {
                    timestamp,
                    open: bar.o,
                    high: bar.h,
                    low: bar.l,
                    close: bar.c,
                    volume: bar.v,
                })
            })
            .collect::<Result<Vec<_>, HistoryError>>()?;

        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }
}

#[async_trait]
impl HistoryPort for FileHistoryLoader {
    async fn fetch_history(&self, query: &HistoricalQuery) -> Result<Vec<Ohlcv>, HistoryError> {
        query.validate()?;
        let path = history_path(&self.root, query);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(HistoryError::NotFound(query.symbol.clone()));
            }
            Err(e) => return Err(HistoryError::Io(format!("{}: {}", path.display(), e))),
        };

        let candles = Self::parse(&query.symbol, &bytes)?;
        tracing::debug!(symbol = %query.symbol, count = candles.len(), "Loaded price history");
        Ok(candles)
    }
}
