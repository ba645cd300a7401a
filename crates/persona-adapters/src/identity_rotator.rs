use persona_core::{IdentityConfig, KeyValueStore, LiveStatePaths, MachineIdentity, ProfileError};
use tracing::{debug, info};

use crate::filesystem::FileProfileStore;
use crate::settings_document::SettingsDocument;
use crate::sqlite::{remove_journal_files, SqliteKeyValueStore};

/// Outcome of one rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotation {
    pub identity: MachineIdentity,
    pub removed_auth_keys: usize,
}

/// Regenerates the machine identifiers of the live settings document and,
/// unless the login is preserved, purges authentication keys.
pub struct IdentityRotator<'a> {
    live: &'a LiveStatePaths,
    fields: &'a IdentityConfig,
    store: &'a FileProfileStore,
}

impl<'a> IdentityRotator<'a> {
    pub fn new(
        live: &'a LiveStatePaths,
        fields: &'a IdentityConfig,
        store: &'a FileProfileStore,
    ) -> Self {
        Self {
            live,
            fields,
            store,
        }
    }

    /// The settings document is parsed before anything is written, so an
    /// unreadable document leaves both files untouched.
    pub fn rotate(&self, preserve_login: bool) -> Result<Rotation, ProfileError> {
        let mut document = SettingsDocument::load(&self.live.settings)?;

        debug!(
            previous = document.get_str(&self.fields.machine_id_field).unwrap_or("none"),
            "replacing machine identity"
        );
        let identity = MachineIdentity::generate();
        document.set_str(&self.fields.machine_id_field, &identity.machine_id);
        document.set_str(&self.fields.mac_machine_id_field, &identity.mac_machine_id);
        document.set_str(&self.fields.device_id_field, &identity.dev_device_id);

        let removed_auth_keys = if preserve_login {
            0
        } else {
            self.purge_auth_keys()?
        };

        document.save()?;
        remove_journal_files(&self.live.database)?;

        if !preserve_login {
            self.store.clear_current()?;
        }

        info!(preserve_login, removed_auth_keys, "machine identity rotated");
        Ok(Rotation {
            identity,
            removed_auth_keys,
        })
    }

    fn purge_auth_keys(&self) -> Result<usize, ProfileError> {
        if !self.live.database.is_file() {
            debug!(path = %self.live.database.display(), "no database, nothing to log out");
            return Ok(0);
        }

        let database = SqliteKeyValueStore::open(&self.live.database)?;
        Ok(database.delete_keys(&self.fields.auth_keys)?)
    }
}
