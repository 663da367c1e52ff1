//! Dashboard module
//!
//! Provides an overview page showing summary cards and charts of the
//! transactions that match the user's filter criteria.

mod aggregation;
mod cards;
mod charts;
mod filter_form;
mod handlers;
mod summary;

pub use aggregation::{
    CategoryTotal, DayDepositsWithdraws, DayTotal, MonthTotal, SummaryTotals, TOP_CATEGORY_LIMIT,
    daily_cash_flow, daily_deposits_withdraws, monthly_totals, sort_chronologically,
    summary_totals, summary_totals_at, top_category_totals,
};
pub use filter_form::FilterForm;
pub use handlers::{apply_filters, clear_filters, get_dashboard_json, get_dashboard_page};
pub use summary::DashboardSummary;
