use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => f.pad("buy"),
            TradeSide::Sell => f.pad("sell"),
        }
    }
}

impl FromStr for TradeSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(TradeSide::Buy),
            "sell" => Ok(TradeSide::Sell),
            other => Err(format!("Unknown trade side: {}", other)),
        }
    }
}

/// Body for `POST /trade`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    pub token_address: String,
    pub side: TradeSide,
    pub amount: f64,
}

impl TradeRequest {
    pub fn new(token_address: impl Into<String>, side: TradeSide, amount: f64) -> Self {
        Self {
            wallet_address: None,
            token_address: token_address.into(),
            side,
            amount,
        }
    }

    pub fn from_wallet(mut self, wallet_address: impl Into<String>) -> Self {
        self.wallet_address = Some(wallet_address.into());
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.token_address.trim().is_empty() {
            return Err("Token address is required".to_string());
        }
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(format!("Trade amount must be positive, got {}", self.amount));
        }
        Ok(())
    }
}

/// A trade as reported back by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRecord {
    pub id: String,
    #[serde(default)]
    pub wallet_address: Option<String>,
    #[serde(default)]
    pub token_address: Option<String>,
    #[serde(default)]
    pub token_symbol: Option<String>,
    pub side: TradeSide,
    pub amount: f64,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub tx_hash: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = self
            .token_symbol
            .as_deref()
            .or(self.token_address.as_deref())
            .unwrap_or("?");
        write!(f, "{} {} {}", self.side, self.amount, token)?;
        if let Some(price) = self.price {
            write!(f, " @ {}", price)?;
        }
        write!(f, " ({})", self.timestamp.format("%Y-%m-%d %H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_request_body() {
        let req = TradeRequest::new("0xtoken", TradeSide::Buy, 2.5).from_wallet("0xme");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "walletAddress": "0xme",
                "tokenAddress": "0xtoken",
                "side": "buy",
                "amount": 2.5
            })
        );
    }

    #[test]
    fn test_trade_request_validation() {
        assert!(TradeRequest::new("0xtoken", TradeSide::Sell, 1.0).validate().is_ok());
        assert!(TradeRequest::new("", TradeSide::Sell, 1.0).validate().is_err());
        assert!(TradeRequest::new("0xtoken", TradeSide::Sell, 0.0).validate().is_err());
        assert!(TradeRequest::new("0xtoken", TradeSide::Sell, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_trade_record_display() {
        let record: TradeRecord = serde_json::from_str(
            r#"{"id":"t1","tokenSymbol":"PEPE","side":"sell","amount":10.0,"price":0.5,
                "timestamp":"2024-02-03T04:05:06Z"}"#,
        )
        .unwrap();
        assert_eq!(record.to_string(), "sell 10 PEPE @ 0.5 (2024-02-03 04:05:06)");
    }

    #[test]
    fn test_trade_side_parse() {
        assert_eq!("BUY".parse::<TradeSide>().unwrap(), TradeSide::Buy);
        assert!("hold".parse::<TradeSide>().is_err());
    }
}
