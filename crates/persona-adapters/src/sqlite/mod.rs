mod key_value_store;

use std::path::Path;

use persona_core::paths::journal_files_of;
use persona_core::{KeyValueStore, ProfileError, UNKNOWN_EMAIL};
use tracing::debug;

pub use key_value_store::SqliteKeyValueStore;

/// Removes the `-wal`/`-shm` files next to `database`. Missing files are fine.
pub fn remove_journal_files(database: &Path) -> Result<(), ProfileError> {
    for journal in journal_files_of(database) {
        match std::fs::remove_file(&journal) {
            Ok(()) => debug!(path = %journal.display(), "removed journal file"),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => return Err(ProfileError::io_at("remove", &journal, error)),
        }
    }
    Ok(())
}

/// Cached login email of a database copy, or the "Unknown" sentinel when the
/// file is missing, unreadable or has no such key.
pub fn read_cached_email(database: &Path, email_key: &str) -> String {
    if !database.is_file() {
        return UNKNOWN_EMAIL.to_string();
    }

    let email = SqliteKeyValueStore::open_read_only(database)
        .and_then(|store| store.get(email_key));

    match email {
        Ok(Some(email)) => email,
        Ok(None) => UNKNOWN_EMAIL.to_string(),
        Err(error) => {
            debug!(%error, path = %database.display(), "cannot read cached email");
            UNKNOWN_EMAIL.to_string()
        }
    }
}
