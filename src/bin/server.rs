use std::{
    fs::OpenOptions,
    net::SocketAddr,
    path::PathBuf,
    process::ExitCode,
    sync::{Arc, RwLock},
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use cashview::{
    AppState, FilterPersistence, FilterState, SqliteKeyValueStore, TransactionStore,
    build_router, get_timezone, graceful_shutdown, load_transactions, source_from_path,
};

/// The web server for the cashview transactions dashboard.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the transactions to display, either a .json or .csv file.
    #[arg(long, env = "CASHVIEW_TRANSACTIONS_PATH")]
    transactions_path: PathBuf,

    /// File path to the SQLite database that stores the filter settings.
    #[arg(long, env = "CASHVIEW_DB_PATH", default_value = "cashview.db")]
    db_path: PathBuf,

    /// The port to serve the dashboard from.
    #[arg(short, long, env = "CASHVIEW_PORT", default_value_t = 3000)]
    port: u16,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, env = "CASHVIEW_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let local_timezone = match get_timezone(&args.timezone) {
        Ok(timezone) => timezone,
        Err(error) => {
            tracing::error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let source = match source_from_path(&args.transactions_path) {
        Ok(source) => source,
        Err(error) => {
            tracing::error!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let filter_store = match Connection::open(&args.db_path)
        .map_err(cashview::Error::from)
        .and_then(SqliteKeyValueStore::new)
    {
        Ok(store) => store,
        Err(error) => {
            tracing::error!(
                "Could not open the database {}: {error}",
                args.db_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let persistence = FilterPersistence::new(filter_store);
    let mut filter_state = FilterState::with_criteria(persistence.restore());
    filter_state.subscribe(Box::new(persistence));

    let transaction_store = Arc::new(RwLock::new(TransactionStore::new()));
    let loading_store = transaction_store.clone();
    tokio::spawn(async move {
        if let Err(error) = load_transactions(loading_store, source, local_timezone).await {
            tracing::error!("Could not record the loaded transactions: {error}");
        }
    });

    let app_state = AppState::new(transaction_store, filter_state, local_timezone);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router
        .layer(axum::middleware::from_fn(cashview::logging_middleware))
        .layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);

    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped with an error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let registry = tracing_subscriber::registry();

    match OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
    {
        Ok(log_file) => {
            let debug_log = tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(Arc::new(log_file));

            registry
                .with(
                    stdout_log
                        .with_filter(filter::LevelFilter::INFO)
                        .and_then(debug_log)
                        .with_filter(filter::LevelFilter::DEBUG),
                )
                .init();
        }
        Err(error) => {
            registry
                .with(stdout_log.with_filter(filter::LevelFilter::INFO))
                .init();
            tracing::warn!("Could not create debug.log, logging to stdout only: {error}");
        }
    }
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
