//! Transactions and where they come from.
//!
//! This module contains:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - The `TransactionSource` trait with JSON and CSV file implementations
//! - The `TransactionStore` which holds the fetched transactions and their load state

mod core;
mod source;
mod store;

pub use core::{DEFAULT_CURRENCY, Transaction, TransactionBuilder, TransactionType};
pub use source::{CsvFileSource, JsonFileSource, TransactionSource, source_from_path};
pub use store::{LoadState, TransactionStore, load_transactions};

pub(crate) use core::{RawDate, minor_to_major_units, to_epoch_millis};
