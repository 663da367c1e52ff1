//! Durable key/value slots for small pieces of user state.
//!
//! Each slot holds one string which is overwritten wholesale on every write.
//! The dashboard uses a single slot, [FILTERS_KEY], for the filter criteria.

use rusqlite::{Connection, OptionalExtension};

use crate::Error;

/// The slot holding the JSON snapshot of the user's filter criteria.
pub const FILTERS_KEY: &str = "filters";

/// A string-keyed store of string values.
pub trait KeyValueStore {
    /// Get the value stored under `key`, or `None` if the slot is empty.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove the slot `key` entirely. Removing an empty slot is not an error.
    ///
    /// # Errors
    /// Returns an error if the underlying storage cannot be written.
    fn remove(&self, key: &str) -> Result<(), Error>;
}

/// Create the key_value table in the database.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_key_value_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS key_value (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

/// A [KeyValueStore] backed by a table in a SQLite database.
#[derive(Debug)]
pub struct SqliteKeyValueStore {
    connection: Connection,
}

impl SqliteKeyValueStore {
    /// Create a store using `connection`, creating the table if needed.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the table cannot be created.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        create_key_value_table(&connection)?;

        Ok(Self { connection })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, Error> {
        self.connection
            .query_row("SELECT value FROM key_value WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Error::from)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.connection.execute(
            "INSERT INTO key_value (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), Error> {
        self.connection
            .execute("DELETE FROM key_value WHERE key = ?1", [key])?;

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{FILTERS_KEY, KeyValueStore, SqliteKeyValueStore};

    fn get_test_store() -> SqliteKeyValueStore {
        let connection = Connection::open_in_memory().unwrap();
        SqliteKeyValueStore::new(connection).unwrap()
    }

    #[test]
    fn get_returns_none_for_empty_slot() {
        let store = get_test_store();

        assert_eq!(store.get(FILTERS_KEY).unwrap(), None);
    }

    #[test]
    fn set_then_get_returns_value() {
        let store = get_test_store();

        store.set(FILTERS_KEY, "{\"accounts\":[]}").unwrap();

        assert_eq!(
            store.get(FILTERS_KEY).unwrap().as_deref(),
            Some("{\"accounts\":[]}")
        );
    }

    #[test]
    fn set_replaces_previous_value() {
        let store = get_test_store();

        store.set(FILTERS_KEY, "first").unwrap();
        store.set(FILTERS_KEY, "second").unwrap();

        assert_eq!(store.get(FILTERS_KEY).unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn remove_empties_the_slot() {
        let store = get_test_store();
        store.set(FILTERS_KEY, "value").unwrap();

        store.remove(FILTERS_KEY).unwrap();

        assert_eq!(store.get(FILTERS_KEY).unwrap(), None);
        // Removing again is fine.
        store.remove(FILTERS_KEY).unwrap();
    }

    #[test]
    fn slots_are_independent() {
        let store = get_test_store();

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.remove("a").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }
}
