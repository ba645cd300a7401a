use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::domain::ProfileName;

pub const POINTER_FILE_NAME: &str = "current_profile.txt";
pub const LAST_ACTIVE_FILE_NAME: &str = "last_active.txt";

pub const PROFILES_DIR_ENV: &str = "PERSONA_PROFILES_DIR";
pub const APP_DATA_DIR_ENV: &str = "PERSONA_APP_DATA_DIR";

const JOURNAL_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

/// Directory holding one subdirectory per saved profile and the pointer file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfilesRoot {
    root: PathBuf,
    settings_file: String,
    database_file: String,
}

impl ProfilesRoot {
    pub fn new(
        root: impl Into<PathBuf>,
        settings_file: impl Into<String>,
        database_file: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            settings_file: settings_file.into(),
            database_file: database_file.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::resolve(config, std::env::var_os(PROFILES_DIR_ENV).map(PathBuf::from))
    }

    fn resolve(config: &Config, env_override: Option<PathBuf>) -> Self {
        let root = env_override
            .or_else(|| config.profiles.root.clone())
            .unwrap_or_else(default_profiles_root);

        Self::new(
            root,
            config.application.settings_file.clone(),
            config.application.database_file.clone(),
        )
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn pointer_path(&self) -> PathBuf {
        self.root.join(POINTER_FILE_NAME)
    }

    pub fn profile_dir(&self, name: &ProfileName) -> PathBuf {
        self.root.join(name.as_str())
    }

    pub fn settings_copy(&self, name: &ProfileName) -> PathBuf {
        self.profile_dir(name).join(&self.settings_file)
    }

    pub fn database_copy(&self, name: &ProfileName) -> PathBuf {
        self.profile_dir(name).join(&self.database_file)
    }

    pub fn last_active_marker(&self, name: &ProfileName) -> PathBuf {
        self.profile_dir(name).join(LAST_ACTIVE_FILE_NAME)
    }
}

/// Locations of the target application's in-use files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveStatePaths {
    pub settings: PathBuf,
    pub database: PathBuf,
}

impl LiveStatePaths {
    pub fn new(settings: impl Into<PathBuf>, database: impl Into<PathBuf>) -> Self {
        Self {
            settings: settings.into(),
            database: database.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::resolve(config, std::env::var_os(APP_DATA_DIR_ENV).map(PathBuf::from))
    }

    fn resolve(config: &Config, env_override: Option<PathBuf>) -> Self {
        let data_dir = env_override
            .or_else(|| config.application.data_dir.clone())
            .unwrap_or_else(|| default_data_dir(&config.application.process_name));

        Self::new(
            data_dir.join(&config.application.settings_file),
            data_dir.join(&config.application.database_file),
        )
    }

    pub fn exists(&self) -> bool {
        self.settings.is_file() && self.database.is_file()
    }

    /// The first of the two files that is missing, if any.
    pub fn first_missing(&self) -> Option<&Path> {
        [&self.settings, &self.database]
            .into_iter()
            .find(|path| !path.is_file())
            .map(PathBuf::as_path)
    }

    pub fn journal_files(&self) -> Vec<PathBuf> {
        journal_files_of(&self.database)
    }
}

/// Write-ahead-log side files that SQLite keeps next to `database`.
pub fn journal_files_of(database: &Path) -> Vec<PathBuf> {
    JOURNAL_SUFFIXES
        .iter()
        .map(|suffix| {
            let mut name = database.as_os_str().to_owned();
            name.push(suffix);
            PathBuf::from(name)
        })
        .collect()
}

fn default_profiles_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cursor_profiles")
}

fn default_data_dir(process_name: &str) -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(process_name)
        .join("User")
        .join("globalStorage")
}
