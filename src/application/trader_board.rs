//! Copy-trading leaderboard kept fresh from the contract

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;

use crate::domain::{rank_traders, Trader};
use crate::ports::{ChainContracts, ContractError};

use super::poller::Poller;

pub struct TraderBoard<C> {
    contracts: Arc<C>,
    traders: Arc<RwLock<Vec<Trader>>>,
}

impl<C> Clone for TraderBoard<C> {
    fn clone(&self) -> Self {
        Self {
            contracts: Arc::clone(&self.contracts),
            traders: Arc::clone(&self.traders),
        }
    }
}

impl<C: ChainContracts + 'static> TraderBoard<C> {
    pub fn new(contracts: Arc<C>) -> Self {
        Self {
            contracts,
            traders: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn traders(&self) -> Vec<Trader> {
        self.traders.read().await.clone()
    }

    /// Reload the leaderboard. On failure the previous rows stay.
    pub async fn refresh(&self) -> Result<usize, ContractError> {
        let mut traders = self.contracts.get_all_traders().await?;
        rank_traders(&mut traders);
        let count = traders.len();
        *self.traders.write().await = traders;
        tracing::debug!(count, "Trader board refreshed");
        Ok(count)
    }

    /// Refresh now and every `interval` until the returned poller is dropped
    pub fn watch(&self, interval: Duration) -> Poller {
        let board = self.clone();
        Poller::spawn("trader-board", interval, move || {
            let board = board.clone();
            async move { board.refresh().await.map(|_| ()) }
        })
    }
}
