//! Holds the transactions fetched from the data source and whether the fetch
//! has finished.

use std::sync::{Arc, RwLock};

use time_tz::Tz;

use crate::{
    Error,
    transaction::{Transaction, TransactionSource},
};

/// The progress of fetching the transactions.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// The fetch has not finished yet.
    Loading,
    /// The fetch failed. The transactions will not be available this session.
    Failed(String),
    /// The transactions have been fetched.
    Ready,
}

/// The raw transactions for the session plus their load state.
///
/// The store starts out [LoadState::Loading] and moves to either
/// [LoadState::Ready] or [LoadState::Failed] exactly once.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    load_state: LoadState,
    transactions: Vec<Transaction>,
}

impl Default for TransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionStore {
    /// Create an empty store that is waiting for the transactions to load.
    pub fn new() -> Self {
        Self {
            load_state: LoadState::Loading,
            transactions: Vec::new(),
        }
    }

    /// Create a store that already holds `transactions`.
    pub fn ready(transactions: Vec<Transaction>) -> Self {
        Self {
            load_state: LoadState::Ready,
            transactions,
        }
    }

    /// Record the outcome of fetching the transactions.
    ///
    /// On success every transaction date is converted to `timezone`, with the
    /// offset in force on that date, so that grouping by day or month uses
    /// the user's calendar. On failure the
    /// store keeps an empty list so that the dashboard can still be computed.
    pub fn set_loaded(
        &mut self,
        result: Result<Vec<Transaction>, Error>,
        timezone: &Tz,
    ) {
        match result {
            Ok(transactions) => {
                self.transactions = transactions
                    .into_iter()
                    .map(|transaction| transaction.in_timezone(timezone))
                    .collect();
                self.load_state = LoadState::Ready;
            }
            Err(error) => {
                self.transactions.clear();
                self.load_state = LoadState::Failed(error.to_string());
            }
        }
    }

    /// The current load state.
    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    /// The raw, unfiltered transactions. Empty unless the store is ready.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

/// Fetch the transactions from `source` on the blocking thread pool and
/// record the result in `store`.
///
/// This is the only asynchronous boundary of the dashboard: the store stays
/// [LoadState::Loading] until the source returns.
///
/// # Errors
/// Returns [Error::LockError] if the store lock was poisoned.
pub async fn load_transactions(
    store: Arc<RwLock<TransactionStore>>,
    source: Box<dyn TransactionSource + Send + Sync>,
    timezone: &'static Tz,
) -> Result<(), Error> {
    let description = source.describe();
    tracing::info!("Loading transactions from {description}");

    let result = tokio::task::spawn_blocking(move || source.fetch_transactions())
        .await
        .unwrap_or_else(|error| {
            Err(Error::DataSourceError(format!(
                "the loading task did not complete: {error}"
            )))
        });

    match &result {
        Ok(transactions) => tracing::info!(
            "Loaded {} transactions from {description}",
            transactions.len()
        ),
        Err(error) => tracing::error!("Could not load transactions from {description}: {error}"),
    }

    store
        .write()
        .inspect_err(|error| tracing::error!("could not acquire transaction store lock: {error}"))
        .map_err(|_| Error::LockError)?
        .set_loaded(result, timezone);

    Ok(())
}
