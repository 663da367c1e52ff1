//! The user's filter selection and the predicate it defines over transactions.

use std::collections::BTreeSet;

use serde::Serialize;
use time::OffsetDateTime;

use crate::transaction::Transaction;

/// An optional pair of inclusive bounds on the transaction date.
///
/// The range only restricts anything when both ends are set. A range with a
/// single end behaves as if neither end were set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// The earliest date to include.
    pub start: Option<OffsetDateTime>,
    /// The latest date to include.
    pub end: Option<OffsetDateTime>,
}

impl DateRange {
    /// A range with both ends set.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// The inclusive bounds if both ends are set.
    pub fn bounds(&self) -> Option<(OffsetDateTime, OffsetDateTime)> {
        self.start.zip(self.end)
    }

    /// The range with a lone end dropped, so it is either two-sided or empty.
    pub fn normalized(self) -> Self {
        match self.bounds() {
            Some(_) => self,
            None => Self::default(),
        }
    }

    /// Whether `date` falls in the range. Always true unless both ends are set.
    pub fn contains(&self, date: OffsetDateTime) -> bool {
        match self.bounds() {
            Some((start, end)) => start <= date && date <= end,
            None => true,
        }
    }
}

/// The categorical fields a transaction can be filtered or grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// [Transaction::account]
    Account,
    /// [Transaction::industry]
    Industry,
    /// [Transaction::state]
    State,
}

impl Category {
    /// A function that reads this category's label from a transaction.
    pub fn accessor(self) -> fn(&Transaction) -> &str {
        match self {
            Category::Account => account,
            Category::Industry => industry,
            Category::State => state,
        }
    }
}

fn account(transaction: &Transaction) -> &str {
    &transaction.account
}

fn industry(transaction: &Transaction) -> &str {
    &transaction.industry
}

fn state(transaction: &Transaction) -> &str {
    &transaction.state
}

/// The user's current filter selection.
///
/// Each set holds the selected labels for one category. An empty set places
/// no restriction on that category. All four parts are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    /// Selected account labels.
    pub accounts: BTreeSet<String>,
    /// Selected industry labels.
    pub industries: BTreeSet<String>,
    /// Selected state labels.
    pub states: BTreeSet<String>,
    /// Bounds on the transaction date.
    pub date_range: DateRange,
}

impl FilterCriteria {
    /// The criteria with a one-sided date range dropped.
    pub fn normalized(mut self) -> Self {
        self.date_range = self.date_range.normalized();
        self
    }

    /// Whether these criteria let every transaction through.
    pub fn is_unrestricted(&self) -> bool {
        self.accounts.is_empty()
            && self.industries.is_empty()
            && self.states.is_empty()
            && self.date_range.bounds().is_none()
    }

    /// The selected labels for `category`.
    pub fn selected(&self, category: Category) -> &BTreeSet<String> {
        match category {
            Category::Account => &self.accounts,
            Category::Industry => &self.industries,
            Category::State => &self.states,
        }
    }

    /// Whether `transaction` passes every part of the criteria.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        [Category::Account, Category::Industry, Category::State]
            .into_iter()
            .all(|category| {
                let selected = self.selected(category);
                selected.is_empty() || selected.contains(category.accessor()(transaction))
            })
            && self.date_range.contains(transaction.date)
    }
}
