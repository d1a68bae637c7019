//! Wallet Store
//!
//! Client-side cache of tracked wallets and dashboard aggregates.
//! Loads both concurrently, then keeps the cached list in step with each
//! confirmed mutation by splicing the server's answer into it instead of
//! refetching. Failures are recorded on the state and surfaced as notices.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::{
    DashboardStats, ExportFormat, NewWallet, TransactionPage, Wallet, WalletPerformance,
    WalletUpdate,
};
use crate::ports::{ApiError, ExportError, ExportSink, Notice, Notifier, WalletApi};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl StoreError {
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Snapshot of the cache
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletState {
    pub wallets: Vec<Wallet>,
    pub stats: Option<DashboardStats>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct WalletStore<A, N> {
    api: Arc<A>,
    notifier: Arc<N>,
    state: Arc<RwLock<WalletState>>,
}

impl<A, N> Clone for WalletStore<A, N> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            notifier: Arc::clone(&self.notifier),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: WalletApi, N: Notifier> WalletStore<A, N> {
    pub fn new(api: A, notifier: N) -> Self {
        Self {
            api: Arc::new(api),
            notifier: Arc::new(notifier),
            state: Arc::new(RwLock::new(WalletState::default())),
        }
    }

    pub async fn snapshot(&self) -> WalletState {
        self.state.read().await.clone()
    }

    pub async fn wallets(&self) -> Vec<Wallet> {
        self.state.read().await.wallets.clone()
    }

    pub async fn stats(&self) -> Option<DashboardStats> {
        self.state.read().await.stats.clone()
    }

    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Fetch wallets and dashboard stats concurrently. Nothing is replaced
    /// unless both succeed.
    pub async fn load(&self) -> Result<(), StoreError> {
        self.begin().await;

        let (wallets, stats) = tokio::join!(self.api.list_wallets(), self.api.dashboard_stats());

        match (wallets, stats) {
            (Ok(wallets), Ok(stats)) => {
                tracing::info!(count = wallets.len(), "Loaded wallets");
                let mut state = self.state.write().await;
                state.wallets = wallets;
                state.stats = Some(stats);
                state.loading = false;
                Ok(())
            }
            (Err(e), _) | (_, Err(e)) => Err(self.fail("Failed to load wallets", e.into()).await),
        }
    }

    pub async fn refresh(&self) -> Result<(), StoreError> {
        self.load().await
    }

    /// Create a wallet and append the server's copy to the cache
    pub async fn add_wallet(&self, wallet: NewWallet) -> Result<Wallet, StoreError> {
        if let Err(msg) = wallet.validate() {
            return Err(self.fail("Invalid wallet", StoreError::Validation(msg)).await);
        }

        self.begin().await;
        let created = match self.api.create_wallet(&wallet).await {
            Ok(created) => created,
            Err(e) => return Err(self.fail("Failed to add wallet", e.into()).await),
        };

        {
            let mut state = self.state.write().await;
            state.wallets.retain(|w| w.id != created.id);
            state.wallets.push(created.clone());
            state.loading = false;
        }

        tracing::info!(id = %created.id, address = %created.address, "Wallet added");
        self.notifier
            .notify(Notice::success("Wallet added").with_body(created.name.clone()));
        Ok(created)
    }

    /// Update a wallet and replace the cached entry with the server's copy
    pub async fn update_wallet(&self, id: &str, update: WalletUpdate) -> Result<Wallet, StoreError> {
        if update.is_empty() {
            return Err(self
                .fail("Invalid update", StoreError::Validation("Nothing to update".into()))
                .await);
        }

        self.begin().await;
        let updated = match self.api.update_wallet(id, &update).await {
            Ok(updated) => updated,
            Err(e) => return Err(self.fail("Failed to update wallet", e.into()).await),
        };

        {
            let mut state = self.state.write().await;
            match state.wallets.iter().position(|w| w.id == updated.id) {
                Some(i) => state.wallets[i] = updated.clone(),
                None => state.wallets.push(updated.clone()),
            }
            state.loading = false;
        }

        tracing::info!(id = %updated.id, "Wallet updated");
        self.notifier.notify(Notice::success("Wallet updated"));
        Ok(updated)
    }

    /// Delete a wallet and drop it from the cache
    pub async fn delete_wallet(&self, id: &str) -> Result<(), StoreError> {
        self.begin().await;
        if let Err(e) = self.api.delete_wallet(id).await {
            return Err(self.fail("Failed to delete wallet", e.into()).await);
        }

        {
            let mut state = self.state.write().await;
            state.wallets.retain(|w| w.id != id);
            state.loading = false;
        }

        tracing::info!(id, "Wallet deleted");
        self.notifier.notify(Notice::success("Wallet removed"));
        Ok(())
    }

    /// Server-side search. Does not touch the cached list.
    pub async fn search(&self, query: &str) -> Result<Vec<Wallet>, StoreError> {
        self.begin().await;
        match self.api.search_wallets(query).await {
            Ok(found) => {
                self.finish().await;
                Ok(found)
            }
            Err(e) => Err(self.fail("Search failed", e.into()).await),
        }
    }

    pub async fn transactions(
        &self,
        id: &str,
        cursor: Option<&str>,
        limit: Option<u32>,
    ) -> Result<TransactionPage, StoreError> {
        self.begin().await;
        match self.api.wallet_transactions(id, cursor, limit).await {
            Ok(page) => {
                self.finish().await;
                Ok(page)
            }
            Err(e) => Err(self.fail("Failed to load transactions", e.into()).await),
        }
    }

    pub async fn performance(
        &self,
        id: &str,
        period: Option<&str>,
    ) -> Result<WalletPerformance, StoreError> {
        self.begin().await;
        match self.api.wallet_performance(id, period).await {
            Ok(perf) => {
                self.finish().await;
                Ok(perf)
            }
            Err(e) => Err(self.fail("Failed to load performance", e.into()).await),
        }
    }

    /// Download the export document and hand it to `sink` once
    pub async fn export(
        &self,
        format: ExportFormat,
        sink: &dyn ExportSink,
    ) -> Result<PathBuf, StoreError> {
        self.begin().await;
        let bytes = match self.api.export_wallets(format).await {
            Ok(bytes) => bytes,
            Err(e) => return Err(self.fail("Export failed", e.into()).await),
        };

        let file_name = format.file_name(chrono::Utc::now().date_naive());
        let path = match sink.save(&file_name, &bytes) {
            Ok(path) => path,
            Err(e) => return Err(self.fail("Export failed", e.into()).await),
        };

        self.finish().await;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "Wallets exported");
        self.notifier
            .notify(Notice::success("Export ready").with_body(path.display().to_string()));
        Ok(path)
    }

    async fn begin(&self) {
        let mut state = self.state.write().await;
        state.loading = true;
        state.error = None;
    }

    async fn finish(&self) {
        self.state.write().await.loading = false;
    }

    /// Record a failure on the state and surface it. Returns the error for `?`.
    async fn fail(&self, title: &str, err: StoreError) -> StoreError {
        let message = err.user_message();
        {
            let mut state = self.state.write().await;
            state.loading = false;
            state.error = Some(message.clone());
        }
        tracing::warn!("{}: {}", title, message);
        self.notifier.notify(Notice::error(title).with_body(message));
        err
    }
}
