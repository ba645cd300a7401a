//! Persona core library
//!
//! Contains domain types, port definitions (traits), configuration and the
//! operation error taxonomy. This crate has no knowledge of SQLite, archives
//! or process control.

pub mod config;
pub mod domain;
pub mod error;
pub mod i18n;
pub mod paths;
pub mod ports;

pub use config::{
    ApplicationConfig, Config, ConfigError, GeneralConfig, IdentityConfig, ProfilesConfig,
};
pub use domain::{
    LiveState, MachineIdentity, ProfileName, ProfileNameError, ProfileSummary, StatusReport,
    UNKNOWN_EMAIL,
};
pub use error::{ProfileError, Step};
pub use i18n::{Language, Translator, UnsupportedLanguageError};
pub use paths::{LiveStatePaths, ProfilesRoot};
pub use ports::{
    ArchiveError, Archiver, KeyValueStore, KeyValueStoreError, ProcessControlError,
    ProcessController,
};
