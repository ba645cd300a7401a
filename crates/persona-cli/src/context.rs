use std::sync::Arc;

use persona_adapters::{CancellationFlag, ProfileManager, SystemProcessController, TarGzArchiver};
use persona_core::{Config, LiveStatePaths, ProfilesRoot, Translator};
use tracing::warn;

/// Configuration and translator shared by every command.
pub struct CommandContext {
    config: Config,
    translator: Translator,
}

impl CommandContext {
    /// A broken configuration file is reported and replaced by defaults so
    /// that read-only commands keep working.
    pub fn load() -> Self {
        let config = Config::load().unwrap_or_else(|error| {
            warn!(%error, "failed to load config, using defaults");
            Config::default()
        });
        Self::new(config)
    }

    pub fn new(config: Config) -> Self {
        let translator = Translator::new(config.general.language);
        Self { config, translator }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn manager(&self, cancellation: CancellationFlag) -> ProfileManager {
        ProfileManager::new(
            ProfilesRoot::from_config(&self.config),
            LiveStatePaths::from_config(&self.config),
            &self.config,
            Arc::new(SystemProcessController::from_config(&self.config.application)),
            Arc::new(TarGzArchiver::new()),
        )
        .with_cancellation(cancellation)
    }
}
