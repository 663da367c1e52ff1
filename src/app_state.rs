//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, RwLock};

use time_tz::Tz;

use crate::{filter::FilterState, transaction::TransactionStore};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The transactions loaded from the data source.
    pub transaction_store: Arc<RwLock<TransactionStore>>,

    /// The user's active filter criteria.
    pub filter_state: Arc<Mutex<FilterState>>,

    /// The user's local timezone, used for calendar days and the filter form dates.
    pub local_timezone: &'static Tz,
}

impl AppState {
    /// Create a new [AppState].
    ///
    /// `local_timezone` can be looked up with [crate::get_timezone].
    pub fn new(
        transaction_store: Arc<RwLock<TransactionStore>>,
        filter_state: FilterState,
        local_timezone: &'static Tz,
    ) -> Self {
        Self {
            transaction_store,
            filter_state: Arc::new(Mutex::new(filter_state)),
            local_timezone,
        }
    }
}
