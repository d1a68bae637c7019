//! Wallet API Client
//!
//! HTTP client for the MemeTrader backend REST API.
//! One request per call, JSON in and out, no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::domain::{
    DashboardStats, ExportFormat, NewWallet, TradeRecord, TradeRequest, TransactionPage, Wallet,
    WalletPerformance, WalletUpdate,
};
use crate::ports::{ApiError, WalletApi};

/// Backend used when nothing else is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

/// Wallet API client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for the backend, including any path prefix
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// MemeTrader backend client
#[derive(Debug, Clone)]
pub struct WalletApiClient {
    config: ApiConfig,
    base: Url,
    http: Client,
}

impl WalletApiClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, ApiError> {
        Self::with_config(ApiConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid API base URL '{}': {}", config.base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "API base URL '{}' cannot carry paths",
                config.base_url
            )));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, base, http })
    }

    /// Create a client against a different backend
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_config(ApiConfig {
            base_url: base_url.into(),
            ..ApiConfig::default()
        })
    }

    /// Get the configured API base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Join path segments onto the base URL. Segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send and turn non-2xx answers into `ApiError::Http`
    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        tracing::debug!(url = %response.url(), status = status.as_u16(), "API response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(
                status.as_u16(),
                status.canonical_reason(),
                &body,
            ));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Decode(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl WalletApi for WalletApiClient {
    async fn list_wallets(&self) -> Result<Vec<Wallet>, ApiError> {
        self.send_json(self.http.get(self.endpoint(&["wallets"]))).await
    }

    async fn get_wallet(&self, id: &str) -> Result<Wallet, ApiError> {
        self.send_json(self.http.get(self.endpoint(&["wallets", id]))).await
    }

    async fn create_wallet(&self, wallet: &NewWallet) -> Result<Wallet, ApiError> {
        self.send_json(self.http.post(self.endpoint(&["wallets"])).json(wallet))
            .await
    }

    async fn update_wallet(&self, id: &str, update: &WalletUpdate) -> Result<Wallet, ApiError> {
        self.send_json(self.http.put(self.endpoint(&["wallets", id])).json(update))
            .await
    }

    async fn delete_wallet(&self, id: &str) -> Result<(), ApiError> {
        self.send(self.http.delete(self.endpoint(&["wallets", id])))
            .await
            .map(|_| ())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.send_json(self.http.get(self.endpoint(&["dashboard", "stats"])))
            .await
    }

    async fn search_wallets(&self, query: &str) -> Result<Vec<Wallet>, ApiError> {
        let request = self
            .http
            .get(self.endpoint(&["wallets", "search"]))
            .query(&[("q", query)]);
        self.send_json(request).await
    }

    async fn wallet_transactions(
        &self,
        id: &str,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<TransactionPage, ApiError> {
        let mut request = self.http.get(self.endpoint(&["wallets", id, "transactions"]));
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        self.send_json(request).await
    }

    async fn wallet_performance(
        &self,
        id: &str,
        period: Option<&str>,
    ) -> Result<WalletPerformance, ApiError> {
        let mut request = self.http.get(self.endpoint(&["wallets", id, "performance"]));
        if let Some(period) = period {
            request = request.query(&[("period", period)]);
        }
        self.send_json(request).await
    }

    async fn export_wallets(&self, format: ExportFormat) -> Result<Vec<u8>, ApiError> {
        let request = self
            .http
            .get(self.endpoint(&["wallets", "export"]))
            .query(&[("format", format.as_str())]);
        let response = self.send(request).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    async fn execute_trade(&self, request: &TradeRequest) -> Result<TradeRecord, ApiError> {
        request.validate().map_err(ApiError::InvalidRequest)?;
        self.send_json(self.http.post(self.endpoint(&["trade"])).json(request))
            .await
    }

    async fn recent_trades(&self, limit: Option<u32>) -> Result<Vec<TradeRecord>, ApiError> {
        let mut request = self.http.get(self.endpoint(&["recent-trades"]));
        if let Some(limit) = limit {
            request = request.query(&[("limit", limit)]);
        }
        self.send_json(request).await
    }
}
