//! Narrowing the transactions down to the user's selection.
//!
//! [FilterState] holds the active [FilterCriteria] and tells its listeners
//! about every change, [FilterPersistence] is the listener that saves the
//! criteria, and [filter_transactions] applies them to a list of transactions.

mod criteria;
mod engine;
mod options;
mod persistence;
mod state;

pub use criteria::{Category, DateRange, FilterCriteria};
pub use engine::filter_transactions;
pub use options::FilterOptions;
pub use persistence::FilterPersistence;
pub use state::{FilterEvent, FilterListener, FilterState};
