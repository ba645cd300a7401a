//! Persona adapters - Infrastructure implementations
//!
//! Concrete implementations of the ports defined in persona-core (SQLite,
//! JSON settings, tar archives, process control) plus the `ProfileManager`
//! that sequences them into user-facing operations.

pub mod archive;
pub mod filesystem;
pub mod identity_rotator;
pub mod manager;
pub mod process;
pub mod settings_document;
pub mod sqlite;
pub mod testing;

pub use archive::TarGzArchiver;
pub use filesystem::FileProfileStore;
pub use identity_rotator::IdentityRotator;
pub use manager::{CancellationFlag, ProfileManager, StopPolicy};
pub use process::SystemProcessController;
pub use settings_document::SettingsDocument;
pub use sqlite::{read_cached_email, remove_journal_files, SqliteKeyValueStore};
pub use testing::{FailingProcessController, StubProcessController};
