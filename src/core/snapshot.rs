//! Transaction and net-worth snapshots.
//!
//! Each refresh fetches the full data set and swaps it in as a whole; nothing
//! is merged with what was fetched before.

use super::cache::Cache;
use super::error::{ClientError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: NaiveDate,
    pub name: String,
    /// Positive for money leaving the account, negative for money coming in.
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub pending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub name: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetWorth {
    pub accounts: Vec<AccountBalance>,
    pub total_assets: f64,
    pub total_debts: f64,
    pub net_worth: f64,
    pub currency: String,
    pub last_updated: String,
}

/// Backend endpoints serving snapshot data.
#[async_trait]
pub trait SnapshotApi: Send + Sync {
    async fn fetch_transactions(&self) -> Result<Vec<Transaction>>;
    async fn fetch_net_worth(&self) -> Result<NetWorth>;
}

/// Point-in-time list of transactions, newest first as the backend sends them.
#[derive(Debug, Clone)]
pub struct TransactionSnapshot {
    pub transactions: Vec<Transaction>,
    pub fetched_at: DateTime<Utc>,
}

impl TransactionSnapshot {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// The first `count` transactions.
    pub fn recent(&self, count: usize) -> &[Transaction] {
        let end = count.min(self.transactions.len());
        &self.transactions[..end]
    }

    pub fn pending_count(&self) -> usize {
        self.transactions.iter().filter(|t| t.pending).count()
    }
}

#[derive(Debug, Clone)]
pub struct NetWorthSnapshot {
    pub net_worth: NetWorth,
    pub fetched_at: DateTime<Utc>,
}

/// Something a [`Refresher`] can fetch and hold.
#[async_trait]
pub trait Snapshot: Sized + Send + Sync + 'static {
    const KIND: &'static str;

    async fn fetch(api: &dyn SnapshotApi) -> Result<Self>;
}

#[async_trait]
impl Snapshot for TransactionSnapshot {
    const KIND: &'static str = "transactions";

    async fn fetch(api: &dyn SnapshotApi) -> Result<Self> {
        let transactions = api.fetch_transactions().await?;
        if let Some(bad) = transactions.iter().find(|t| t.id.trim().is_empty()) {
            return Err(ClientError::Validation(format!(
                "Transaction '{}' on {} has no id",
                bad.name, bad.date
            )));
        }
        Ok(TransactionSnapshot {
            transactions,
            fetched_at: Utc::now(),
        })
    }
}

#[async_trait]
impl Snapshot for NetWorthSnapshot {
    const KIND: &'static str = "net worth";

    async fn fetch(api: &dyn SnapshotApi) -> Result<Self> {
        let net_worth = api.fetch_net_worth().await?;
        if net_worth.currency.trim().is_empty() {
            return Err(ClientError::Validation(
                "Net worth response has no currency".into(),
            ));
        }
        Ok(NetWorthSnapshot {
            net_worth,
            fetched_at: Utc::now(),
        })
    }
}

/// Fetches a snapshot on demand and keeps the last good one for display.
pub struct Refresher<S: Snapshot> {
    api: Arc<dyn SnapshotApi>,
    cache: Cache<S>,
}

pub type TransactionRefresher = Refresher<TransactionSnapshot>;
pub type NetWorthRefresher = Refresher<NetWorthSnapshot>;

impl<S: Snapshot> Refresher<S> {
    pub fn new(api: Arc<dyn SnapshotApi>) -> Self {
        Refresher {
            api,
            cache: Cache::new(),
        }
    }

    /// Fetches a fresh snapshot and replaces the held one.
    ///
    /// On failure the previously held snapshot stays in place.
    #[instrument(name = "SnapshotRefresh", skip(self), fields(kind = S::KIND))]
    pub async fn fetch_snapshot(&self) -> Result<Arc<S>> {
        match S::fetch(self.api.as_ref()).await {
            Ok(snapshot) => {
                debug!("Fetched fresh snapshot");
                Ok(self.cache.put(snapshot).await)
            }
            Err(err) => {
                warn!(error = %err, "Snapshot refresh failed, keeping previous data");
                Err(err)
            }
        }
    }

    /// Last successfully fetched snapshot, if any.
    pub async fn current(&self) -> Option<Arc<S>> {
        self.cache.get().await
    }
}
