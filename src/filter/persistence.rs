//! Keeps the filter criteria in a [KeyValueStore] slot so they survive restarts.
//!
//! The slot holds a JSON object of the form
//! `{"dateRange": [startMillis, endMillis], "accounts": [..], "industries": [..], "states": [..]}`
//! where either end of the date range may be `null`. Older snapshots that store
//! the dates as ISO 8601 strings are also understood.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    filter::{DateRange, FilterCriteria, FilterEvent, FilterListener},
    storage::{FILTERS_KEY, KeyValueStore},
    transaction::{RawDate, to_epoch_millis},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FilterSnapshot<'a> {
    date_range: [Option<i64>; 2],
    accounts: &'a BTreeSet<String>,
    industries: &'a BTreeSet<String>,
    states: &'a BTreeSet<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredFilters {
    #[serde(default)]
    date_range: [Option<RawDate>; 2],
    #[serde(default)]
    accounts: BTreeSet<String>,
    #[serde(default)]
    industries: BTreeSet<String>,
    #[serde(default)]
    states: BTreeSet<String>,
}

/// Serialize `criteria` to the JSON stored in the filters slot.
///
/// # Errors
/// Returns [Error::JSONSerializationError] if serialization fails.
pub fn encode_criteria(criteria: &FilterCriteria) -> Result<String, Error> {
    let snapshot = FilterSnapshot {
        date_range: [
            criteria.date_range.start.map(to_epoch_millis),
            criteria.date_range.end.map(to_epoch_millis),
        ],
        accounts: &criteria.accounts,
        industries: &criteria.industries,
        states: &criteria.states,
    };

    serde_json::to_string(&snapshot).map_err(|error| Error::JSONSerializationError(error.to_string()))
}

/// Parse the JSON stored in the filters slot.
///
/// # Errors
/// Returns [Error::InvalidFilterSnapshot] if the text is not valid JSON, has
/// the wrong shape or holds a date that cannot be represented.
pub fn decode_criteria(text: &str) -> Result<FilterCriteria, Error> {
    let stored: StoredFilters = serde_json::from_str(text)
        .map_err(|error| Error::InvalidFilterSnapshot(error.to_string()))?;

    let [start, end] = stored.date_range;
    let convert = |raw: Option<RawDate>| match raw {
        None => Ok(None),
        Some(raw) => raw.into_date_time().map(Some).ok_or_else(|| {
            Error::InvalidFilterSnapshot("date range holds an invalid date".to_owned())
        }),
    };

    let criteria = FilterCriteria {
        accounts: stored.accounts,
        industries: stored.industries,
        states: stored.states,
        date_range: DateRange {
            start: convert(start)?,
            end: convert(end)?,
        },
    };

    Ok(criteria.normalized())
}

/// Mirrors the filter state into the [FILTERS_KEY] slot of a [KeyValueStore].
///
/// Call [FilterPersistence::restore] once at startup to get the saved
/// criteria, then subscribe the persistence to the
/// [FilterState](crate::FilterState) so that every change is written back.
#[derive(Debug)]
pub struct FilterPersistence<S> {
    store: S,
}

impl<S: KeyValueStore> FilterPersistence<S> {
    /// Persist filter criteria in `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the saved criteria.
    ///
    /// Falls back to unrestricted criteria if nothing was saved or the saved
    /// data cannot be read. This never fails.
    pub fn restore(&self) -> FilterCriteria {
        let text = match self.store.get(FILTERS_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return FilterCriteria::default(),
            Err(error) => {
                tracing::warn!("Could not read saved filters, using defaults: {error}");
                return FilterCriteria::default();
            }
        };

        match decode_criteria(&text) {
            Ok(criteria) => {
                tracing::info!("Restored saved filters {criteria:?}");
                criteria
            }
            Err(error) => {
                tracing::warn!("Ignoring malformed saved filters: {error}");
                FilterCriteria::default()
            }
        }
    }

    fn save(&self, criteria: &FilterCriteria) -> Result<(), Error> {
        let text = encode_criteria(criteria)?;
        self.store.set(FILTERS_KEY, &text)
    }
}

impl<S: KeyValueStore> FilterListener for FilterPersistence<S> {
    fn on_filter_event(&mut self, event: &FilterEvent) {
        let result = match event {
            FilterEvent::Applied(criteria) => self.save(criteria),
            FilterEvent::Cleared => self.store.remove(FILTERS_KEY),
        };

        if let Err(error) = result {
            tracing::error!("Could not save filters: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        filter::{DateRange, FilterCriteria, FilterState},
        storage::{FILTERS_KEY, KeyValueStore, SqliteKeyValueStore, test_store::SharedMemoryStore},
    };

    use super::{FilterPersistence, decode_criteria, encode_criteria};

    fn criteria() -> FilterCriteria {
        FilterCriteria {
            accounts: ["Acme".to_owned(), "Globex".to_owned()].into(),
            industries: ["Retail".to_owned()].into(),
            states: ["NY".to_owned()].into(),
            date_range: DateRange::new(
                datetime!(2024-01-01 00:00 UTC),
                datetime!(2024-01-31 23:59:59.999 UTC),
            ),
        }
    }

    #[test]
    fn encodes_dates_as_epoch_millis() {
        let text = encode_criteria(&criteria()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(
            value["dateRange"],
            serde_json::json!([1704067200000_i64, 1706745599999_i64])
        );
        assert_eq!(value["accounts"], serde_json::json!(["Acme", "Globex"]));
        assert_eq!(value["states"], serde_json::json!(["NY"]));
    }

    #[test]
    fn encodes_open_range_as_nulls() {
        let text = encode_criteria(&FilterCriteria::default()).unwrap();

        assert_eq!(
            text,
            r#"{"dateRange":[null,null],"accounts":[],"industries":[],"states":[]}"#
        );
    }

    #[test]
    fn decodes_iso_date_strings() {
        let criteria = decode_criteria(
            r#"{"dateRange":["2024-01-01T00:00:00.000Z","2024-01-31T23:59:59.999Z"],
                "accounts":["Acme"],"industries":[],"states":[]}"#,
        )
        .unwrap();

        assert_eq!(
            criteria.date_range,
            DateRange::new(
                datetime!(2024-01-01 00:00 UTC),
                datetime!(2024-01-31 23:59:59.999 UTC)
            )
        );
        assert_eq!(criteria.accounts, BTreeSet::from(["Acme".to_owned()]));
    }

    #[test]
    fn decoding_drops_one_sided_range() {
        let criteria =
            decode_criteria(r#"{"dateRange":[1704844800000,null],"accounts":[]}"#).unwrap();

        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn decoding_rejects_wrong_shape() {
        assert!(decode_criteria("not json").is_err());
        assert!(decode_criteria(r#"{"accounts":"Acme"}"#).is_err());
        assert!(decode_criteria(r#"{"dateRange":[1,2,3]}"#).is_err());
        assert!(decode_criteria(r#"{"dateRange":["yesterday",null]}"#).is_err());
        assert!(decode_criteria(r#"{"dateRange":[1e300,1e300]}"#).is_err());
    }

    #[test]
    fn restore_defaults_when_slot_is_empty_or_malformed() {
        let store = SharedMemoryStore::default();
        let persistence = FilterPersistence::new(store.clone());
        assert_eq!(persistence.restore(), FilterCriteria::default());

        store.set(FILTERS_KEY, "{\"accounts\": 42}").unwrap();
        assert_eq!(persistence.restore(), FilterCriteria::default());
    }

    #[test]
    fn applied_criteria_survive_restart() {
        let store = SharedMemoryStore::default();
        let mut state = FilterState::new();
        state.subscribe(Box::new(FilterPersistence::new(store.clone())));

        state.apply(criteria());

        let restarted = FilterPersistence::new(store.clone());
        assert_eq!(restarted.restore(), criteria());
    }

    #[test]
    fn clear_then_restart_gives_defaults_and_removes_slot() {
        let store = SharedMemoryStore::default();
        let mut state = FilterState::new();
        state.subscribe(Box::new(FilterPersistence::new(store.clone())));
        state.apply(criteria());
        assert!(store.contains(FILTERS_KEY));

        state.clear();

        assert!(!store.contains(FILTERS_KEY));
        let restarted = FilterPersistence::new(store.clone());
        assert_eq!(restarted.restore(), FilterCriteria::default());
        assert!(!store.contains(FILTERS_KEY));
    }

    #[test]
    fn works_with_sqlite_store() {
        let connection = Connection::open_in_memory().unwrap();
        let persistence = FilterPersistence::new(SqliteKeyValueStore::new(connection).unwrap());
        let mut state = FilterState::with_criteria(persistence.restore());
        assert!(state.criteria().is_unrestricted());
        state.subscribe(Box::new(persistence));

        state.apply(criteria());

        assert_eq!(state.criteria(), &criteria());
    }
}
