use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    dashboard::aggregation::{
        CategoryTotal, DayDepositsWithdraws, DayTotal, MonthTotal, SummaryTotals, daily_cash_flow,
        daily_deposits_withdraws, monthly_totals, sort_chronologically, summary_totals_at,
        top_category_totals,
    },
    filter::{Category, FilterCriteria, filter_transactions},
    transaction::{DEFAULT_CURRENCY, Transaction},
};

/// Everything the dashboard shows for one set of filter criteria.
///
/// Built from scratch on every request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// The currency code used to format every amount.
    pub currency: String,
    /// How many transactions matched the criteria.
    pub transaction_count: usize,
    /// The figures for the summary cards.
    pub totals: SummaryTotals,
    /// Net amount per day.
    pub daily_cash_flow: Vec<DayTotal>,
    /// Deposits and withdrawals per day.
    pub daily_deposits_withdraws: Vec<DayDepositsWithdraws>,
    /// Net amount per month, oldest first.
    pub monthly_totals: Vec<MonthTotal>,
    /// The industries with the largest totals.
    pub top_industries: Vec<CategoryTotal>,
    /// The states with the largest totals.
    pub top_states: Vec<CategoryTotal>,
}

impl DashboardSummary {
    /// Filter `transactions` with `criteria` and compute every dashboard view,
    /// counting pending transactions as of now.
    pub fn build(transactions: &[Transaction], criteria: &FilterCriteria) -> Self {
        Self::build_at(transactions, criteria, OffsetDateTime::now_utc())
    }

    /// Same as [DashboardSummary::build] with an explicit current moment.
    pub fn build_at(
        transactions: &[Transaction],
        criteria: &FilterCriteria,
        now: OffsetDateTime,
    ) -> Self {
        let mut filtered = filter_transactions(transactions, criteria);
        let currency = filtered
            .first()
            .map(|transaction| sanitize_currency_code(&transaction.currency))
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_owned());

        sort_chronologically(&mut filtered);

        Self {
            currency,
            transaction_count: filtered.len(),
            totals: summary_totals_at(&filtered, now),
            daily_cash_flow: daily_cash_flow(&filtered),
            daily_deposits_withdraws: daily_deposits_withdraws(&filtered),
            monthly_totals: monthly_totals(&filtered),
            top_industries: top_category_totals(&filtered, Category::Industry.accessor()),
            top_states: top_category_totals(&filtered, Category::State.accessor()),
        }
    }
}

/// The code if it looks like an ISO 4217 code, otherwise [DEFAULT_CURRENCY].
///
/// The code ends up inside the chart scripts, so anything else is rejected.
fn sanitize_currency_code(code: &str) -> String {
    let code = code.trim().to_ascii_uppercase();

    if code.len() == 3 && code.bytes().all(|byte| byte.is_ascii_uppercase()) {
        code
    } else {
        DEFAULT_CURRENCY.to_owned()
    }
}
