//! The row of summary cards at the top of the dashboard.

use maud::{Markup, html};

use crate::{currency::format_currency, dashboard::aggregation::SummaryTotals};

/// The colour of a card's figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Positive,
    Negative,
    Neutral,
}

impl Tone {
    fn class(self) -> &'static str {
        match self {
            Tone::Positive => "text-green-600 dark:text-green-400",
            Tone::Negative => "text-red-600 dark:text-red-400",
            Tone::Neutral => "text-gray-900 dark:text-white",
        }
    }

    fn of_balance(balance: f64) -> Self {
        if balance > 0.0 {
            Tone::Positive
        } else if balance < 0.0 {
            Tone::Negative
        } else {
            Tone::Neutral
        }
    }
}

/// Renders the deposits, withdrawals, pending and balance cards.
pub(super) fn summary_cards_view(totals: &SummaryTotals, currency: &str) -> Markup {
    html! {
        section
            id="summary-cards"
            class="w-full mx-auto mb-4 grid grid-cols-1 sm:grid-cols-2 xl:grid-cols-4 gap-4"
        {
            (summary_card(
                "Total Deposits",
                &format_currency(totals.total_deposits, currency),
                Tone::Positive,
            ))
            (summary_card(
                "Total Withdrawals",
                &format_currency(totals.total_withdraws, currency),
                Tone::Negative,
            ))
            (summary_card(
                "Pending Transactions",
                &totals.pending_count.to_string(),
                Tone::Neutral,
            ))
            (summary_card(
                "Balance",
                &format_currency(totals.balance, currency),
                Tone::of_balance(totals.balance),
            ))
        }
    }
}

fn summary_card(title: &str, value: &str, tone: Tone) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                   dark:border-gray-700 rounded-lg p-4 shadow-md"
            aria-label=(format!("{title}: {value}"))
        {
            h3 class="text-sm font-medium text-gray-600 dark:text-gray-400 mb-2" {
                (title)
            }
            div class={ "summary-value text-3xl font-bold " (tone.class()) } {
                (value)
            }
        }
    }
}
