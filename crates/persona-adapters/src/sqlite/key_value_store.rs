use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use persona_core::{KeyValueStore, KeyValueStoreError};

/// Key-value table used by VS Code based editors in `state.vscdb`.
pub struct SqliteKeyValueStore {
    connection: Mutex<Connection>,
}

impl SqliteKeyValueStore {
    /// Opens an existing database for reading and writing. Never creates one.
    pub fn open(path: &Path) -> Result<Self, KeyValueStoreError> {
        Self::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_WRITE)
    }

    pub fn open_read_only(path: &Path) -> Result<Self, KeyValueStoreError> {
        Self::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
    }

    /// Opens or creates a database and makes sure the table exists.
    pub fn create(path: &Path) -> Result<Self, KeyValueStoreError> {
        let connection = Connection::open(path).map_err(|error| open_error(path, error))?;

        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;

        Ok(store)
    }

    pub fn in_memory() -> Result<Self, KeyValueStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|error| open_error(Path::new(":memory:"), error))?;

        let store = Self {
            connection: Mutex::new(connection),
        };
        store.initialize_schema()?;

        Ok(store)
    }

    fn open_with_flags(path: &Path, flags: OpenFlags) -> Result<Self, KeyValueStoreError> {
        let connection =
            Connection::open_with_flags(path, flags).map_err(|error| open_error(path, error))?;

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(&self) -> Result<(), KeyValueStoreError> {
        let connection = self.connection()?;
        connection
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS ItemTable (
                    key TEXT UNIQUE ON CONFLICT REPLACE,
                    value BLOB
                );",
            )
            .map_err(query_error)
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>, KeyValueStoreError> {
        self.connection
            .lock()
            .map_err(|_| KeyValueStoreError::Query {
                message: "database connection lock poisoned".to_string(),
            })
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError> {
        let connection = self.connection()?;

        let value = connection
            .query_row(
                "SELECT value FROM ItemTable WHERE key = ?1",
                params![key],
                |row| row.get::<_, Value>(0),
            )
            .optional()
            .map_err(query_error)?;

        Ok(value.and_then(value_to_string))
    }

    fn put(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError> {
        let connection = self.connection()?;

        connection
            .execute(
                "INSERT OR REPLACE INTO ItemTable (key, value) VALUES (?1, ?2)",
                params![key, value],
            )
            .map_err(query_error)?;

        Ok(())
    }

    fn delete_keys(&self, keys: &[String]) -> Result<usize, KeyValueStoreError> {
        let mut connection = self.connection()?;
        let transaction = connection.transaction().map_err(query_error)?;

        let mut deleted = 0;
        for key in keys {
            deleted += transaction
                .execute("DELETE FROM ItemTable WHERE key = ?1", params![key])
                .map_err(query_error)?;
        }

        transaction.commit().map_err(query_error)?;
        Ok(deleted)
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(number) => Some(number.to_string()),
        Value::Real(number) => Some(number.to_string()),
        Value::Text(text) => Some(text),
        Value::Blob(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

fn open_error(path: &Path, error: rusqlite::Error) -> KeyValueStoreError {
    KeyValueStoreError::Open {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

fn query_error(error: rusqlite::Error) -> KeyValueStoreError {
    KeyValueStoreError::Query {
        message: error.to_string(),
    }
}
