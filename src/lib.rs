//! Cashview is a web dashboard for exploring a user's financial transactions.
//!
//! Transactions are loaded once from a data source (a JSON or CSV file), narrowed
//! down by the user's filter criteria (date range, accounts, industries and
//! states) and summarised into cards and charts. The filter criteria survive
//! restarts in a small SQLite key/value store.
//!
//! This library provides a REST API that directly serves HTML pages.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod currency;
mod dashboard;
mod endpoints;
mod filter;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
mod storage;
mod timezone;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use currency::format_currency;
pub use dashboard::{
    CategoryTotal, DashboardSummary, DayDepositsWithdraws, DayTotal, FilterForm, MonthTotal,
    SummaryTotals, TOP_CATEGORY_LIMIT, daily_cash_flow, daily_deposits_withdraws, monthly_totals,
    sort_chronologically, summary_totals, summary_totals_at, top_category_totals,
};
pub use filter::{
    Category, DateRange, FilterCriteria, FilterEvent, FilterListener, FilterOptions,
    FilterPersistence, FilterState, filter_transactions,
};
pub use logging::logging_middleware;
pub use routing::build_router;
pub use storage::{FILTERS_KEY, KeyValueStore, SqliteKeyValueStore};
pub use timezone::{end_of_day, get_timezone, start_of_day, to_local};
pub use transaction::{
    CsvFileSource, DEFAULT_CURRENCY, JsonFileSource, LoadState, Transaction, TransactionBuilder,
    TransactionSource, TransactionStore, TransactionType, load_transactions, source_from_path,
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundPage};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction record from the data source could not be parsed.
    ///
    /// The string describes which record was rejected and why.
    #[error("invalid transaction data: {0}")]
    InvalidTransactionData(String),

    /// The data source could not be read, e.g. the file does not exist.
    #[error("could not read the transaction data source: {0}")]
    DataSourceError(String),

    /// The data source path has an extension that no source understands.
    #[error("unsupported transaction data source \"{0}\", expected a .json or .csv file")]
    UnsupportedDataSource(String),

    /// A date submitted by the client could not be parsed.
    ///
    /// Callers should pass in the offending text.
    #[error("could not parse the date \"{0}\", expected the format YYYY-MM-DD")]
    InvalidDate(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// The saved filter criteria could not be read.
    #[error("invalid saved filters: {0}")]
    InvalidFilterSnapshot(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// A lock on shared state was poisoned by a panicking thread.
    #[error("could not acquire a lock on the application state")]
    LockError,

    /// The transactions have not finished loading yet.
    #[error("the transactions are still loading")]
    TransactionsNotLoaded,

    /// Loading the transactions failed and they will not be available this session.
    #[error("the transactions could not be loaded: {0}")]
    TransactionLoadFailed(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundPage.into_response(),
            Error::InvalidTimezoneError(timezone) => {
                let fix = format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                );

                InternalServerError {
                    description: "Invalid Timezone Settings",
                    fix: &fix,
                }
                .into_response()
            }
            Error::LockError => InternalServerError::default().into_response(),
            Error::TransactionsNotLoaded => (
                StatusCode::SERVICE_UNAVAILABLE,
                "The transactions are still loading, try again shortly.",
            )
                .into_response(),
            Error::TransactionLoadFailed(reason) => {
                (StatusCode::BAD_GATEWAY, format!("Could not load the transactions: {reason}"))
                    .into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::InvalidDate(text) => Alert::error(
                "Invalid date",
                &format!("Could not read \"{text}\" as a date. Pick a date from the date picker."),
            )
            .into_response(StatusCode::BAD_REQUEST),
            Error::InvalidTimezoneError(timezone) => Alert::error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response(StatusCode::INTERNAL_SERVER_ERROR),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_response(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
