use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Local};
use persona_core::domain::format_last_active;
use persona_core::{LiveStatePaths, ProfileError, ProfileName, ProfileSummary, ProfilesRoot};
use tracing::{debug, info, warn};

use crate::sqlite::read_cached_email;

/// Profile directories, the current-profile pointer and last-active markers
/// under a `ProfilesRoot`.
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    root: ProfilesRoot,
    email_key: String,
}

impl FileProfileStore {
    pub fn new(root: ProfilesRoot, email_key: impl Into<String>) -> Self {
        Self {
            root,
            email_key: email_key.into(),
        }
    }

    pub fn root(&self) -> &ProfilesRoot {
        &self.root
    }

    pub fn email_key(&self) -> &str {
        &self.email_key
    }

    pub fn exists(&self, name: &ProfileName) -> bool {
        self.root.profile_dir(name).is_dir()
    }

    /// Both the settings copy and the database copy are present.
    pub fn is_complete(&self, name: &ProfileName) -> bool {
        self.root.settings_copy(name).is_file() && self.root.database_copy(name).is_file()
    }

    /// Profile named by the pointer file. A pointer naming a directory that
    /// no longer exists counts as no pointer.
    pub fn current(&self) -> Option<ProfileName> {
        let name = self.read_pointer()?;

        if !self.exists(&name) {
            warn!(profile = %name, "current profile pointer names a missing profile");
            return None;
        }

        Some(name)
    }

    pub fn set_current(&self, name: &ProfileName) -> Result<(), ProfileError> {
        self.ensure_root()?;
        let pointer = self.root.pointer_path();
        fs::write(&pointer, name.as_str()).map_err(|error| ProfileError::io_at("write", &pointer, error))
    }

    pub fn clear_current(&self) -> Result<(), ProfileError> {
        let pointer = self.root.pointer_path();
        match fs::remove_file(&pointer) {
            Ok(()) => {
                debug!("current profile pointer cleared");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(ProfileError::io_at("remove", &pointer, error)),
        }
    }

    /// Complete profiles sorted by name.
    pub fn list(&self) -> Result<Vec<ProfileSummary>, ProfileError> {
        let current = self.current();
        let mut summaries = Vec::new();

        for name in self.profile_names()? {
            if !self.is_complete(&name) {
                warn!(profile = %name, "skipping incomplete profile directory");
                continue;
            }

            summaries.push(ProfileSummary {
                email: read_cached_email(&self.root.database_copy(&name), &self.email_key),
                is_current: current.as_ref() == Some(&name),
                last_active: self.last_active(&name),
                name: name.to_string(),
            });
        }

        summaries.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(summaries)
    }

    /// Every directory under the root whose name is a valid profile name,
    /// complete or not.
    pub fn profile_names(&self) -> Result<Vec<ProfileName>, ProfileError> {
        let root = self.root.path();
        let entries = match fs::read_dir(root) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(ProfileError::io_at("read", root, error)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|error| ProfileError::io_at("read", root, error))?;
            if !entry.path().is_dir() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(raw_name) = file_name.to_str() else {
                debug!(path = %entry.path().display(), "skipping non UTF-8 directory");
                continue;
            };

            match ProfileName::parse(raw_name) {
                Ok(name) => names.push(name),
                Err(error) => debug!(%error, name = raw_name, "skipping directory"),
            }
        }

        names.sort();
        Ok(names)
    }

    /// Last-active marker, falling back to the directory's modification time.
    /// The fallback is written back so it is computed only once.
    pub fn last_active(&self, name: &ProfileName) -> String {
        let marker = self.root.last_active_marker(name);

        if let Ok(content) = fs::read_to_string(&marker) {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }

        let fallback = directory_modified(&self.root.profile_dir(name))
            .map(format_last_active)
            .unwrap_or_default();

        if !fallback.is_empty() {
            if let Err(error) = fs::write(&marker, &fallback) {
                debug!(%error, profile = %name, "cannot persist last-active fallback");
            }
        }

        fallback
    }

    pub fn stamp_last_active(&self, name: &ProfileName) -> Result<(), ProfileError> {
        let marker = self.root.last_active_marker(name);
        fs::write(&marker, format_last_active(Local::now()))
            .map_err(|error| ProfileError::io_at("write", &marker, error))
    }

    /// Copies the live settings document and database into the profile
    /// directory, creating it when needed.
    pub fn capture(&self, name: &ProfileName, live: &LiveStatePaths) -> Result<(), ProfileError> {
        if let Some(missing) = live.first_missing() {
            return Err(ProfileError::LiveStateMissing {
                path: missing.display().to_string(),
            });
        }

        let directory = self.root.profile_dir(name);
        fs::create_dir_all(&directory)
            .map_err(|error| ProfileError::io_at("create", &directory, error))?;

        copy_file(&live.settings, &self.root.settings_copy(name))?;
        copy_file(&live.database, &self.root.database_copy(name))?;

        info!(profile = %name, "live state captured");
        Ok(())
    }

    /// Copies the profile's files over the live settings document and database.
    pub fn restore(&self, name: &ProfileName, live: &LiveStatePaths) -> Result<(), ProfileError> {
        if !self.is_complete(name) {
            return Err(ProfileError::Incomplete {
                name: name.to_string(),
            });
        }

        for target in [&live.settings, &live.database] {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .map_err(|error| ProfileError::io_at("create", parent, error))?;
            }
        }

        copy_file(&self.root.settings_copy(name), &live.settings)?;
        copy_file(&self.root.database_copy(name), &live.database)?;

        info!(profile = %name, "profile restored over live state");
        Ok(())
    }

    /// Removes the profile directory. Returns `false` when there was nothing
    /// to delete.
    pub fn delete(&self, name: &ProfileName) -> Result<bool, ProfileError> {
        let directory = self.root.profile_dir(name);
        if !directory.is_dir() {
            return Ok(false);
        }

        let was_current = self.read_pointer().as_ref() == Some(name);

        fs::remove_dir_all(&directory)
            .map_err(|error| ProfileError::io_at("remove", &directory, error))?;

        if was_current {
            self.clear_current()?;
        }

        info!(profile = %name, was_current, "profile deleted");
        Ok(true)
    }

    pub fn rename(&self, old: &ProfileName, new: &ProfileName) -> Result<(), ProfileError> {
        if !self.exists(old) {
            return Err(ProfileError::NotFound {
                name: old.to_string(),
            });
        }

        let target = self.root.profile_dir(new);
        if target.exists() {
            return Err(ProfileError::Conflict {
                name: new.to_string(),
            });
        }

        let was_current = self.read_pointer().as_ref() == Some(old);

        let source = self.root.profile_dir(old);
        fs::rename(&source, &target).map_err(|error| ProfileError::io_at("rename", &source, error))?;

        if was_current {
            self.set_current(new)?;
        }

        info!(old = %old, new = %new, "profile renamed");
        Ok(())
    }

    fn read_pointer(&self) -> Option<ProfileName> {
        let content = fs::read_to_string(self.root.pointer_path()).ok()?;
        let trimmed = content.trim();

        if trimmed.is_empty() {
            return None;
        }

        match ProfileName::parse(trimmed) {
            Ok(name) => Some(name),
            Err(error) => {
                warn!(%error, "ignoring invalid current profile pointer");
                None
            }
        }
    }

    fn ensure_root(&self) -> Result<(), ProfileError> {
        let root = self.root.path();
        fs::create_dir_all(root).map_err(|error| ProfileError::io_at("create", root, error))
    }
}

fn copy_file(source: &Path, destination: &Path) -> Result<(), ProfileError> {
    fs::copy(source, destination).map_err(|error| {
        ProfileError::io(
            format!(
                "cannot copy {} to {}",
                source.display(),
                destination.display()
            ),
            error,
        )
    })?;
    Ok(())
}

fn directory_modified(path: &Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(path).and_then(|metadata| metadata.modified()).ok()?;
    Some(DateTime::<Local>::from(modified))
}
