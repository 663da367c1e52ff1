use std::collections::BTreeSet;

use serde::Serialize;

use crate::{filter::Category, transaction::Transaction};

/// The labels that can be picked in the filter form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    /// Every account in the data, sorted and without duplicates.
    pub accounts: Vec<String>,
    /// Every industry in the data, sorted and without duplicates.
    pub industries: Vec<String>,
    /// Every state in the data, sorted and without duplicates.
    pub states: Vec<String>,
}

impl FilterOptions {
    /// Collect the distinct labels of each category in `transactions`.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let distinct = |category: Category| -> Vec<String> {
            let accessor = category.accessor();
            transactions
                .iter()
                .map(accessor)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(str::to_owned)
                .collect()
        };

        Self {
            accounts: distinct(Category::Account),
            industries: distinct(Category::Industry),
            states: distinct(Category::State),
        }
    }

    /// The labels for `category`.
    pub fn labels(&self, category: Category) -> &[String] {
        match category {
            Category::Account => &self.accounts,
            Category::Industry => &self.industries,
            Category::State => &self.states,
        }
    }
}
