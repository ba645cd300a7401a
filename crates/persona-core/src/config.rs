use crate::i18n::Language;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration file not found: {path}")]
    NotFound { path: String },

    #[error("read error: {source}")]
    Read {
        #[from]
        source: std::io::Error,
    },

    #[error("TOML parse error: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub application: ApplicationConfig,
    pub profiles: ProfilesConfig,
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    pub language: Language,
}

/// Where the target application keeps its state and how to drive it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub process_name: String,
    pub data_dir: Option<PathBuf>,
    pub settings_file: String,
    pub database_file: String,
    pub launch_command: String,
    pub quit_poll_attempts: u32,
    pub quit_poll_interval_ms: u64,
    pub force_kill_grace_ms: u64,
    pub relaunch_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfilesConfig {
    pub root: Option<PathBuf>,
    pub backup_name: String,
}

/// Settings-document fields and database keys that identify a machine or
/// an account.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub machine_id_field: String,
    pub mac_machine_id_field: String,
    pub device_id_field: String,
    pub email_key: String,
    pub auth_keys: Vec<String>,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            process_name: "Cursor".to_string(),
            data_dir: None,
            settings_file: "storage.json".to_string(),
            database_file: "state.vscdb".to_string(),
            launch_command: "cursor".to_string(),
            quit_poll_attempts: 5,
            quit_poll_interval_ms: 500,
            force_kill_grace_ms: 1000,
            relaunch_delay_ms: 1000,
        }
    }
}

impl ApplicationConfig {
    pub fn quit_poll_interval(&self) -> Duration {
        Duration::from_millis(self.quit_poll_interval_ms)
    }

    pub fn force_kill_grace(&self) -> Duration {
        Duration::from_millis(self.force_kill_grace_ms)
    }

    pub fn relaunch_delay(&self) -> Duration {
        Duration::from_millis(self.relaunch_delay_ms)
    }
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            root: None,
            backup_name: "backup_before_switch".to_string(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            machine_id_field: "telemetry.machineId".to_string(),
            mac_machine_id_field: "telemetry.macMachineId".to_string(),
            device_id_field: "telemetry.devDeviceId".to_string(),
            email_key: "cursorAuth/cachedEmail".to_string(),
            auth_keys: vec![
                "cursorAuth/accessToken".to_string(),
                "cursorAuth/refreshToken".to_string(),
                "cursorAuth/cachedEmail".to_string(),
                "cursorAuth/stripeMembershipType".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("persona")
            .join("config.toml")
    }
}
