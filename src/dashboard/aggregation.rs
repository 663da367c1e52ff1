//! Reducers that turn a filtered list of transactions into the series and
//! totals shown on the dashboard.
//!
//! Amounts are summed in minor units and only converted to major units
//! (dividing by 100) once a group is complete, so that long lists of cents do
//! not accumulate floating point error.

use std::{
    cmp::Reverse,
    collections::{BTreeMap, HashMap},
};

use serde::{Serialize, Serializer};
use time::{Date, Duration, OffsetDateTime};

use crate::transaction::{Transaction, TransactionType, minor_to_major_units};

/// The most entries returned by [top_category_totals].
pub const TOP_CATEGORY_LIMIT: usize = 10;

// ============================================================================
// MODELS
// ============================================================================

/// The net cash flow of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotal {
    /// The day, serialized as its label.
    #[serde(serialize_with = "serialize_day_label")]
    pub date: Date,
    /// Deposits minus withdrawals on the day, in major units.
    pub total: f64,
}

impl DayTotal {
    /// The day as `M/D/YYYY`, e.g. `1/1/2024`.
    pub fn label(&self) -> String {
        day_label(self.date)
    }
}

/// The deposits and withdrawals of one calendar day, kept apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayDepositsWithdraws {
    /// The day, serialized as its label.
    #[serde(serialize_with = "serialize_day_label")]
    pub date: Date,
    /// Sum of deposits on the day, in major units.
    pub deposits: f64,
    /// Sum of withdrawals on the day, in major units. Never negative.
    pub withdraws: f64,
}

impl DayDepositsWithdraws {
    /// The day as `M/D/YYYY`, e.g. `1/1/2024`.
    pub fn label(&self) -> String {
        day_label(self.date)
    }
}

/// The net total of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    /// The first day of the month, serialized as the month label.
    #[serde(serialize_with = "serialize_month_label")]
    pub month: Date,
    /// Deposits minus withdrawals in the month, in major units.
    pub total: f64,
}

impl MonthTotal {
    /// The month as `M/YYYY` with a 1-based month, e.g. `2/2024`.
    pub fn label(&self) -> String {
        month_label(self.month)
    }
}

/// The summed amount of all transactions sharing a category label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    /// The category label, e.g. an industry name.
    pub name: String,
    /// The sum of the amounts regardless of transaction type, in major units.
    pub total: f64,
}

/// The figures shown on the summary cards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    /// Sum of all deposits.
    pub total_deposits: f64,
    /// Sum of all withdrawals, as a positive number.
    pub total_withdraws: f64,
    /// `total_deposits - total_withdraws`.
    pub balance: f64,
    /// How many transactions are dated in the future.
    pub pending_count: usize,
}

// ============================================================================
// LABELS
// ============================================================================

fn day_label(date: Date) -> String {
    format!("{}/{}/{}", u8::from(date.month()), date.day(), date.year())
}

fn month_label(date: Date) -> String {
    format!("{}/{}", u8::from(date.month()), date.year())
}

fn serialize_day_label<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&day_label(*date))
}

fn serialize_month_label<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&month_label(*date))
}

fn first_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

// ============================================================================
// REDUCERS
// ============================================================================

/// Sort `transactions` from oldest to newest, keeping the input order of
/// transactions with the same date.
pub fn sort_chronologically(transactions: &mut [Transaction]) {
    transactions.sort_by_key(|transaction| transaction.date);
}

/// Sum the signed amounts per calendar day.
///
/// Deposits count positive and withdrawals negative. The result has one entry
/// per day that has transactions, in ascending date order.
pub fn daily_cash_flow(transactions: &[Transaction]) -> Vec<DayTotal> {
    let mut totals: BTreeMap<Date, i128> = BTreeMap::new();

    for transaction in transactions {
        *totals.entry(transaction.date.date()).or_default() += transaction.signed_minor_units();
    }

    totals
        .into_iter()
        .map(|(date, total)| DayTotal {
            date,
            total: minor_to_major_units(total),
        })
        .collect()
}

/// Sum deposits and withdrawals separately per calendar day, in ascending
/// date order.
pub fn daily_deposits_withdraws(transactions: &[Transaction]) -> Vec<DayDepositsWithdraws> {
    let mut totals: BTreeMap<Date, (i128, i128)> = BTreeMap::new();

    for transaction in transactions {
        let (deposits, withdraws) = totals.entry(transaction.date.date()).or_default();
        let amount = i128::from(transaction.amount);

        match transaction.transaction_type {
            TransactionType::Deposit => *deposits += amount,
            TransactionType::Withdraw => *withdraws += amount,
        }
    }

    totals
        .into_iter()
        .map(|(date, (deposits, withdraws))| DayDepositsWithdraws {
            date,
            deposits: minor_to_major_units(deposits),
            withdraws: minor_to_major_units(withdraws),
        })
        .collect()
}

/// Sum the signed amounts per calendar month.
///
/// Months appear in the order they are first seen in `transactions`, so sort
/// the input with [sort_chronologically] to get a timeline.
pub fn monthly_totals(transactions: &[Transaction]) -> Vec<MonthTotal> {
    let mut totals: Vec<(Date, i128)> = Vec::new();
    let mut index_of_month: HashMap<Date, usize> = HashMap::new();

    for transaction in transactions {
        let month = first_of_month(transaction.date.date());
        let index = *index_of_month.entry(month).or_insert_with(|| {
            totals.push((month, 0));
            totals.len() - 1
        });

        totals[index].1 += transaction.signed_minor_units();
    }

    totals
        .into_iter()
        .map(|(month, total)| MonthTotal {
            month,
            total: minor_to_major_units(total),
        })
        .collect()
}

/// Sum the amounts per label produced by `key` and keep the largest
/// [TOP_CATEGORY_LIMIT] groups, largest first.
///
/// Amounts are added without regard to transaction type. Groups with equal
/// totals keep the order in which their label was first seen.
pub fn top_category_totals<K>(transactions: &[Transaction], key: K) -> Vec<CategoryTotal>
where
    K: Fn(&Transaction) -> &str,
{
    let mut totals: Vec<(&str, i128)> = Vec::new();
    let mut index_of_label: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        let label = key(transaction);
        let index = *index_of_label.entry(label).or_insert_with(|| {
            totals.push((label, 0));
            totals.len() - 1
        });

        totals[index].1 += i128::from(transaction.amount);
    }

    totals.sort_by_key(|&(_, total)| Reverse(total));
    totals.truncate(TOP_CATEGORY_LIMIT);

    totals
        .into_iter()
        .map(|(name, total)| CategoryTotal {
            name: name.to_owned(),
            total: minor_to_major_units(total),
        })
        .collect()
}

/// Total the deposits and withdrawals and count the pending transactions as of
/// the current moment.
pub fn summary_totals(transactions: &[Transaction]) -> SummaryTotals {
    summary_totals_at(transactions, OffsetDateTime::now_utc())
}

/// Total the deposits and withdrawals and count the transactions dated after
/// `now`.
pub fn summary_totals_at(transactions: &[Transaction], now: OffsetDateTime) -> SummaryTotals {
    let mut deposits: i128 = 0;
    let mut withdraws: i128 = 0;
    let mut pending_count = 0;

    for transaction in transactions {
        match transaction.transaction_type {
            TransactionType::Deposit => deposits += i128::from(transaction.amount),
            TransactionType::Withdraw => withdraws += i128::from(transaction.amount),
        }

        if transaction.is_pending_at(now) {
            pending_count += 1;
        }
    }

    let total_deposits = minor_to_major_units(deposits);
    let total_withdraws = minor_to_major_units(withdraws);

    SummaryTotals {
        total_deposits,
        total_withdraws,
        balance: total_deposits - total_withdraws,
        pending_count,
    }
}

#[cfg(test)]
mod tests {
    use time::{
        Duration, OffsetDateTime,
        macros::{date, datetime},
    };

    use crate::{
        filter::Category,
        transaction::{Transaction, TransactionType},
    };

    use super::{
        SummaryTotals, TOP_CATEGORY_LIMIT, daily_cash_flow, daily_deposits_withdraws, monthly_totals,
        sort_chronologically, summary_totals, summary_totals_at, top_category_totals,
    };

    fn create_test_transaction(
        amount: u64,
        date: OffsetDateTime,
        transaction_type: TransactionType,
    ) -> Transaction {
        Transaction::build(amount, date, transaction_type).finalize()
    }

    fn scenario_transactions() -> Vec<Transaction> {
        vec![
            create_test_transaction(
                10000,
                datetime!(2024-01-01 00:00 UTC),
                TransactionType::Deposit,
            ),
            create_test_transaction(
                5000,
                datetime!(2024-01-01 00:00 UTC),
                TransactionType::Withdraw,
            ),
            create_test_transaction(
                2000,
                datetime!(2024-02-01 00:00 UTC),
                TransactionType::Deposit,
            ),
        ]
    }

    /// A varied list with several transactions per day, month and label.
    fn mixed_transactions() -> Vec<Transaction> {
        let industries = [
            "Retail", "Energy", "Food", "Travel", "Health", "Media", "Tech", "Auto", "Finance",
            "Housing", "Education", "Sports",
        ];
        let start = datetime!(2024-01-28 08:30 UTC);

        (0..60_u64)
            .map(|i| {
                let transaction_type = if i % 4 == 0 {
                    TransactionType::Withdraw
                } else {
                    TransactionType::Deposit
                };

                Transaction::build(
                    (i * 37 + 11) % 1000 + 1,
                    start + Duration::hours(i as i64 * 17),
                    transaction_type,
                )
                .industry(industries[(i as usize * 7) % industries.len()])
                .state(if i % 2 == 0 { "NY" } else { "CA" })
                .finalize()
            })
            .collect()
    }

    #[test]
    fn scenario_daily_cash_flow() {
        let result = daily_cash_flow(&scenario_transactions());

        let pairs: Vec<(String, f64)> = result
            .iter()
            .map(|day| (day.label(), day.total))
            .collect();
        assert_eq!(
            pairs,
            vec![("1/1/2024".to_owned(), 50.0), ("2/1/2024".to_owned(), 20.0)]
        );
    }

    #[test]
    fn scenario_summary_totals() {
        let result = summary_totals_at(&scenario_transactions(), datetime!(2024-06-01 00:00 UTC));

        assert_eq!(result.total_deposits, 120.0);
        assert_eq!(result.total_withdraws, 50.0);
        assert_eq!(result.balance, 70.0);
        assert_eq!(result.pending_count, 0);
    }

    #[test]
    fn daily_series_are_ascending_regardless_of_input_order() {
        let mut transactions = scenario_transactions();
        transactions.reverse();

        let cash_flow = daily_cash_flow(&transactions);
        let deposits_withdraws = daily_deposits_withdraws(&transactions);

        assert_eq!(cash_flow[0].date, date!(2024 - 01 - 01));
        assert_eq!(cash_flow[1].date, date!(2024 - 02 - 01));
        assert_eq!(deposits_withdraws[0].deposits, 100.0);
        assert_eq!(deposits_withdraws[0].withdraws, 50.0);
        assert_eq!(deposits_withdraws[1].deposits, 20.0);
        assert_eq!(deposits_withdraws[1].withdraws, 0.0);
    }

    #[test]
    fn daily_series_agree_for_every_day() {
        let transactions = mixed_transactions();

        let cash_flow = daily_cash_flow(&transactions);
        let deposits_withdraws = daily_deposits_withdraws(&transactions);

        assert_eq!(cash_flow.len(), deposits_withdraws.len());
        for (net, split) in cash_flow.iter().zip(&deposits_withdraws) {
            assert_eq!(net.date, split.date);
            assert!(
                (split.deposits - split.withdraws - net.total).abs() < 1e-9,
                "{} disagrees: {} - {} != {}",
                net.label(),
                split.deposits,
                split.withdraws,
                net.total
            );
        }
    }

    #[test]
    fn monthly_totals_are_signed_and_labelled() {
        let mut transactions = scenario_transactions();
        transactions.push(create_test_transaction(
            9000,
            datetime!(2024-02-20 00:00 UTC),
            TransactionType::Withdraw,
        ));

        let result = monthly_totals(&transactions);

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].label(), "1/2024");
        assert_eq!(result[0].total, 50.0);
        assert_eq!(result[1].label(), "2/2024");
        assert_eq!(result[1].total, -70.0);
    }

    #[test]
    fn monthly_totals_keep_first_occurrence_order() {
        let transactions = vec![
            create_test_transaction(
                100,
                datetime!(2024-03-05 00:00 UTC),
                TransactionType::Deposit,
            ),
            create_test_transaction(
                100,
                datetime!(2023-12-05 00:00 UTC),
                TransactionType::Deposit,
            ),
            create_test_transaction(
                100,
                datetime!(2024-03-25 00:00 UTC),
                TransactionType::Deposit,
            ),
        ];

        let labels: Vec<String> = monthly_totals(&transactions)
            .iter()
            .map(|month| month.label())
            .collect();
        assert_eq!(labels, vec!["3/2024", "12/2023"]);

        let mut sorted = transactions;
        sort_chronologically(&mut sorted);
        let labels: Vec<String> = monthly_totals(&sorted)
            .iter()
            .map(|month| month.label())
            .collect();
        assert_eq!(labels, vec!["12/2023", "3/2024"]);
    }

    #[test]
    fn sort_chronologically_is_stable() {
        let mut transactions = vec![
            Transaction::build(1, datetime!(2024-02-01 00:00 UTC), TransactionType::Deposit)
                .id("late")
                .finalize(),
            Transaction::build(2, datetime!(2024-01-01 00:00 UTC), TransactionType::Deposit)
                .id("first")
                .finalize(),
            Transaction::build(3, datetime!(2024-01-01 00:00 UTC), TransactionType::Deposit)
                .id("second")
                .finalize(),
        ];

        sort_chronologically(&mut transactions);

        let ids: Vec<&str> = transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "late"]);
    }

    #[test]
    fn top_category_totals_sums_unsigned_and_sorts_descending() {
        let transactions = vec![
            Transaction::build(1000, datetime!(2024-01-01 00:00 UTC), TransactionType::Deposit)
                .industry("Retail")
                .finalize(),
            Transaction::build(500, datetime!(2024-01-02 00:00 UTC), TransactionType::Withdraw)
                .industry("Retail")
                .finalize(),
            Transaction::build(2000, datetime!(2024-01-03 00:00 UTC), TransactionType::Withdraw)
                .industry("Energy")
                .finalize(),
        ];

        let result = top_category_totals(&transactions, Category::Industry.accessor());

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Energy");
        assert_eq!(result[0].total, 20.0);
        assert_eq!(result[1].name, "Retail");
        assert_eq!(result[1].total, 15.0);
    }

    #[test]
    fn top_category_totals_is_capped_and_non_increasing() {
        let transactions = mixed_transactions();

        let result = top_category_totals(&transactions, Category::Industry.accessor());

        assert_eq!(result.len(), TOP_CATEGORY_LIMIT);
        assert!(
            result
                .windows(2)
                .all(|pair| pair[0].total >= pair[1].total),
            "totals are not sorted: {result:?}"
        );
    }

    #[test]
    fn top_category_totals_ties_keep_first_seen_order() {
        let transactions: Vec<Transaction> = ["TX", "CA", "NY"]
            .into_iter()
            .map(|state| {
                Transaction::build(100, datetime!(2024-01-01 00:00 UTC), TransactionType::Deposit)
                    .state(state)
                    .finalize()
            })
            .collect();

        let result = top_category_totals(&transactions, |transaction| transaction.state.as_str());

        let names: Vec<&str> = result.iter().map(|total| total.name.as_str()).collect();
        assert_eq!(names, vec!["TX", "CA", "NY"]);
    }

    #[test]
    fn pending_means_strictly_after_now() {
        let now = datetime!(2024-03-01 12:00 UTC);
        let transactions = vec![
            create_test_transaction(100, now, TransactionType::Deposit),
            create_test_transaction(
                100,
                now + Duration::milliseconds(1),
                TransactionType::Deposit,
            ),
            create_test_transaction(100, now + Duration::days(30), TransactionType::Withdraw),
        ];

        assert_eq!(summary_totals_at(&transactions, now).pending_count, 2);
    }

    #[test]
    fn balance_is_deposits_minus_withdraws() {
        for transactions in [vec![], scenario_transactions(), mixed_transactions()] {
            let totals = summary_totals(&transactions);

            assert_eq!(totals.balance, totals.total_deposits - totals.total_withdraws);
        }
    }

    #[test]
    fn empty_input_gives_empty_results() {
        assert!(daily_cash_flow(&[]).is_empty());
        assert!(daily_deposits_withdraws(&[]).is_empty());
        assert!(monthly_totals(&[]).is_empty());
        assert!(top_category_totals(&[], Category::State.accessor()).is_empty());
        assert_eq!(summary_totals(&[]), SummaryTotals::default());
    }

    #[test]
    fn series_serialize_with_labels() {
        let json = serde_json::to_value(daily_cash_flow(&scenario_transactions())).unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                {"date": "1/1/2024", "total": 50.0},
                {"date": "2/1/2024", "total": 20.0}
            ])
        );
    }
}
