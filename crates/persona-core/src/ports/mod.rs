mod archiver;
mod key_value_store;
mod process_controller;

pub use archiver::{ArchiveError, Archiver};
pub use key_value_store::{KeyValueStore, KeyValueStoreError};
pub use process_controller::{ProcessControlError, ProcessController};
