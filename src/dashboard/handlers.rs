//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for displaying the dashboard and applying or clearing filters
//! - The JSON endpoint that exposes the dashboard data
//! - HTML view functions for the loading, failed, empty and full dashboard

use std::sync::{Arc, Mutex, RwLock};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use time_tz::Tz;

use crate::{
    AppState, Error,
    dashboard::{
        cards::summary_cards_view,
        charts::{build_dashboard_charts, charts_view},
        filter_form::{FilterForm, filter_form_view},
        summary::DashboardSummary,
    },
    endpoints,
    filter::{FilterCriteria, FilterOptions, FilterState},
    html::{HeadElement, base},
    transaction::{LoadState, TransactionStore},
};

/// The state needed for displaying the dashboard page.
///
/// Contains the transactions, the filter criteria and timezone information
/// required by dashboard handlers.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The transactions loaded from the data source.
    pub transaction_store: Arc<RwLock<TransactionStore>>,
    /// The user's active filter criteria.
    pub filter_state: Arc<Mutex<FilterState>>,
    /// The user's local timezone.
    pub local_timezone: &'static Tz,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            filter_state: state.filter_state.clone(),
            local_timezone: state.local_timezone,
        }
    }
}

/// The dashboard data derived from the transaction store for one request.
enum DashboardData {
    Loading,
    Failed(String),
    Empty,
    Ready {
        summary: DashboardSummary,
        options: FilterOptions,
    },
}

impl DashboardState {
    /// Compute the dashboard for `criteria` under the store's read lock.
    ///
    /// Only the derived views leave the lock, never the transactions.
    fn dashboard_data(&self, criteria: &FilterCriteria) -> Result<DashboardData, Error> {
        let store = self
            .transaction_store
            .read()
            .inspect_err(|error| tracing::error!("could not acquire transaction store lock: {error}"))
            .map_err(|_| Error::LockError)?;

        Ok(match store.load_state() {
            LoadState::Loading => DashboardData::Loading,
            LoadState::Failed(reason) => DashboardData::Failed(reason.clone()),
            LoadState::Ready if store.transactions().is_empty() => DashboardData::Empty,
            LoadState::Ready => DashboardData::Ready {
                summary: DashboardSummary::build(store.transactions(), criteria),
                options: FilterOptions::from_transactions(store.transactions()),
            },
        })
    }

    fn criteria(&self) -> Result<FilterCriteria, Error> {
        let filter_state = self
            .filter_state
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire filter state lock: {error}"))
            .map_err(|_| Error::LockError)?;

        Ok(filter_state.criteria().clone())
    }

    fn update_filters(&self, update: impl FnOnce(&mut FilterState)) -> Result<(), Error> {
        let mut filter_state = self
            .filter_state
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire filter state lock: {error}"))
            .map_err(|_| Error::LockError)?;

        update(&mut filter_state);

        Ok(())
    }
}

/// Display a page with the filter form, summary cards and charts.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let content = dashboard_content(&state)?;

    Ok(dashboard_view(&content).into_response())
}

/// Apply the posted filter form and return the re-rendered dashboard content.
pub async fn apply_filters(
    State(state): State<DashboardState>,
    Form(form): Form<FilterForm>,
) -> Response {
    let result = form
        .into_criteria(state.local_timezone)
        .and_then(|criteria| state.update_filters(|filter_state| filter_state.apply(criteria)))
        .and_then(|_| dashboard_content(&state));

    match result {
        Ok(content) => content.into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Reset the filters and send the client back to the dashboard.
pub async fn clear_filters(State(state): State<DashboardState>) -> Response {
    match state.update_filters(FilterState::clear) {
        Ok(()) => (
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            StatusCode::OK,
        )
            .into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// The dashboard data for the current filter criteria as JSON.
pub async fn get_dashboard_json(
    State(state): State<DashboardState>,
) -> Result<Json<DashboardSummary>, Error> {
    let criteria = state.criteria()?;

    match state.dashboard_data(&criteria)? {
        DashboardData::Loading => Err(Error::TransactionsNotLoaded),
        DashboardData::Failed(reason) => Err(Error::TransactionLoadFailed(reason)),
        DashboardData::Empty => Ok(Json(DashboardSummary::build(&[], &criteria))),
        DashboardData::Ready { summary, .. } => Ok(Json(summary)),
    }
}

/// Renders whatever belongs inside `#dashboard-content` for the current state.
fn dashboard_content(state: &DashboardState) -> Result<Markup, Error> {
    let criteria = state.criteria()?;

    let (summary, options) = match state.dashboard_data(&criteria)? {
        DashboardData::Loading => return Ok(dashboard_loading_view()),
        DashboardData::Failed(reason) => return Ok(dashboard_failed_view(&reason)),
        DashboardData::Empty => return Ok(dashboard_no_data_view()),
        DashboardData::Ready { summary, options } => (summary, options),
    };

    let charts = build_dashboard_charts(&summary);

    Ok(html!(
        (filter_form_view(&criteria, &options, state.local_timezone))

        @if summary.transaction_count == 0 {
            p class="mb-4 text-gray-600 dark:text-gray-400"
            {
                "No transactions match these filters."
            }
        }

        (summary_cards_view(&summary.totals, &summary.currency))
        (charts_view(&charts))
    ))
}

fn dashboard_view(content: &Markup) -> Markup {
    let content = html!(
        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (content)
        }
    );

    let scripts = [HeadElement::ScriptLink(
        "/static/echarts.6.0.0.min.js".to_owned(),
    )];

    base("Dashboard", &scripts, &content)
}

fn dashboard_loading_view() -> Markup {
    html!(
        div
            id="dashboard-loading"
            hx-get=(endpoints::DASHBOARD_VIEW)
            hx-trigger="every 2s"
            hx-select="#dashboard-content"
            hx-target="#dashboard-content"
            hx-swap="outerHTML"
            class="flex flex-col items-center px-6 py-8 mx-auto"
        {
            h2 class="text-xl font-bold" { "Loading transactions..." }
            p { "The dashboard will appear once your transactions have been fetched." }
        }
    )
}

fn dashboard_failed_view(reason: &str) -> Markup {
    html!(
        div
            id="dashboard-failed"
            role="alert"
            class="flex flex-col items-center px-6 py-8 mx-auto"
        {
            h2 class="text-xl font-bold text-red-600 dark:text-red-400"
            {
                "Could not load your transactions"
            }
            p class="failure-reason" { (reason) }
            p
            {
                "Check the data source and restart the server to try again."
            }
        }
    )
}

fn dashboard_no_data_view() -> Markup {
    html!(
        div class="flex flex-col items-center px-6 py-8 mx-auto"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once the data source has some transactions."
            }
        }
    )
}
