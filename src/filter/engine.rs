use crate::{filter::FilterCriteria, transaction::Transaction};

/// Return the transactions that match `criteria`, in their original order.
///
/// The input is left untouched. Matching records are cloned into the result.
pub fn filter_transactions(
    transactions: &[Transaction],
    criteria: &FilterCriteria,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|transaction| criteria.matches(transaction))
        .cloned()
        .collect()
}
