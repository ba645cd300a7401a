use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyValueStoreError {
    #[error("cannot open database {path}: {message}")]
    Open { path: String, message: String },

    #[error("database query failed: {message}")]
    Query { message: String },
}

/// The application's embedded key-value database.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, KeyValueStoreError>;

    fn put(&self, key: &str, value: &str) -> Result<(), KeyValueStoreError>;

    /// Deletes every key in one committed transaction and returns how many
    /// rows went away.
    fn delete_keys(&self, keys: &[String]) -> Result<usize, KeyValueStoreError>;
}
