//! The container for the active filter criteria and its change notifications.

use std::fmt;

use crate::filter::FilterCriteria;

/// A change to the filter state, sent to listeners after it has happened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterEvent<'a> {
    /// The criteria were replaced with the given criteria.
    Applied(&'a FilterCriteria),
    /// The criteria were reset to their defaults.
    Cleared,
}

/// Something that reacts to changes of the filter state.
pub trait FilterListener {
    /// Called synchronously after every change to the filter state.
    fn on_filter_event(&mut self, event: &FilterEvent);
}

/// Holds the user's active filter criteria.
///
/// Every change goes through [FilterState::apply] or [FilterState::clear],
/// which notify the subscribed listeners once the new criteria are in place.
#[derive(Default)]
pub struct FilterState {
    criteria: FilterCriteria,
    listeners: Vec<Box<dyn FilterListener + Send>>,
}

impl fmt::Debug for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterState")
            .field("criteria", &self.criteria)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FilterState {
    /// Create a filter state with unrestricted criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter state starting from `criteria`, e.g. criteria restored
    /// from storage. A one-sided date range is dropped.
    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self {
            criteria: criteria.normalized(),
            listeners: Vec::new(),
        }
    }

    /// The active criteria.
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Register `listener` for all future changes.
    pub fn subscribe(&mut self, listener: Box<dyn FilterListener + Send>) {
        self.listeners.push(listener);
    }

    /// Replace the active criteria with `criteria`.
    ///
    /// A date range with only one end set is applied as no date restriction.
    pub fn apply(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria.normalized();
        tracing::debug!("Applied filter criteria {:?}", self.criteria);

        let event = FilterEvent::Applied(&self.criteria);
        for listener in &mut self.listeners {
            listener.on_filter_event(&event);
        }
    }

    /// Reset the criteria to their unrestricted defaults.
    pub fn clear(&mut self) {
        self.criteria = FilterCriteria::default();
        tracing::debug!("Cleared filter criteria");

        for listener in &mut self.listeners {
            listener.on_filter_event(&FilterEvent::Cleared);
        }
    }
}
