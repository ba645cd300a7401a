use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use persona_core::paths::POINTER_FILE_NAME;
use persona_core::{
    ApplicationConfig, Archiver, Config, IdentityConfig, LiveState, LiveStatePaths,
    ProcessControlError, ProcessController, ProfileError, ProfileName, ProfileSummary,
    ProfilesRoot, StatusReport, Step,
};
use tracing::{debug, info, warn};

use crate::filesystem::FileProfileStore;
use crate::identity_rotator::{IdentityRotator, Rotation};
use crate::sqlite::{read_cached_email, remove_journal_files};

/// How long to wait for the application to quit before killing it, and how
/// long to pause before relaunching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    pub force_kill_grace: Duration,
    pub relaunch_delay: Duration,
}

impl StopPolicy {
    pub fn from_config(config: &ApplicationConfig) -> Self {
        Self {
            poll_attempts: config.quit_poll_attempts,
            poll_interval: config.quit_poll_interval(),
            force_kill_grace: config.force_kill_grace(),
            relaunch_delay: config.relaunch_delay(),
        }
    }

    pub fn immediate() -> Self {
        Self {
            poll_attempts: 1,
            poll_interval: Duration::ZERO,
            force_kill_grace: Duration::ZERO,
            relaunch_delay: Duration::ZERO,
        }
    }
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self::from_config(&ApplicationConfig::default())
    }
}

/// Shared flag checked between the steps of an operation.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sequences the profile store, the identity rotator, the archiver and the
/// process controller into the user-facing operations.
///
/// Multi-step operations report the step that failed and never roll back
/// the steps that already completed.
pub struct ProfileManager {
    store: FileProfileStore,
    live: LiveStatePaths,
    identity: IdentityConfig,
    backup_name: String,
    process: Arc<dyn ProcessController>,
    archiver: Arc<dyn Archiver>,
    policy: StopPolicy,
    cancellation: CancellationFlag,
}

impl ProfileManager {
    pub fn new(
        root: ProfilesRoot,
        live: LiveStatePaths,
        config: &Config,
        process: Arc<dyn ProcessController>,
        archiver: Arc<dyn Archiver>,
    ) -> Self {
        Self {
            store: FileProfileStore::new(root, &config.identity.email_key),
            live,
            identity: config.identity.clone(),
            backup_name: config.profiles.backup_name.clone(),
            process,
            archiver,
            policy: StopPolicy::from_config(&config.application),
            cancellation: CancellationFlag::new(),
        }
    }

    pub fn with_policy(mut self, policy: StopPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn store(&self) -> &FileProfileStore {
        &self.store
    }

    pub fn live_paths(&self) -> &LiveStatePaths {
        &self.live
    }

    pub fn live_state(&self) -> LiveState {
        LiveState::from_pointer(self.store.current())
    }

    pub fn list(&self) -> Result<Vec<ProfileSummary>, ProfileError> {
        self.store.list()
    }

    pub fn status(&self) -> StatusReport {
        let email = self
            .live
            .database
            .is_file()
            .then(|| read_cached_email(&self.live.database, self.store.email_key()));

        StatusReport::new(&self.live_state(), email)
    }

    /// Snapshots the live state under `name` and binds the live state to it.
    /// Returns the email stored in the new snapshot.
    pub fn save(&self, name: &str) -> Result<String, ProfileError> {
        let name = parse_name(name)?;

        if let Some(missing) = self.live.first_missing() {
            return Err(ProfileError::LiveStateMissing {
                path: missing.display().to_string(),
            });
        }

        self.stop_application()?;
        self.checkpoint()?;
        self.capture(&name)?;

        Ok(read_cached_email(
            &self.store.root().database_copy(&name),
            self.store.email_key(),
        ))
    }

    /// Replaces the live state with a saved profile, gives it a fresh machine
    /// identity and relaunches the application. Unmanaged live state is
    /// backed up first. Returns the email now logged in.
    pub fn switch(&self, name: &str) -> Result<String, ProfileError> {
        let name = parse_name(name)?;

        if !self.store.exists(&name) {
            return Err(ProfileError::NotFound {
                name: name.to_string(),
            });
        }
        if !self.store.is_complete(&name) {
            return Err(ProfileError::Incomplete {
                name: name.to_string(),
            });
        }

        self.stop_application()?;

        self.checkpoint()?;
        self.backup_unmanaged_state(&name)
            .map_err(|error| error.at_step(Step::BackupLiveState))?;

        self.checkpoint()?;
        self.store
            .restore(&name, &self.live)
            .map_err(|error| error.at_step(Step::CopyProfile))?;
        remove_journal_files(&self.live.database)
            .map_err(|error| error.at_step(Step::ClearJournal))?;
        self.store
            .set_current(&name)
            .map_err(|error| error.at_step(Step::UpdatePointer))?;
        self.store
            .stamp_last_active(&name)
            .map_err(|error| error.at_step(Step::StampLastActive))?;

        self.checkpoint()?;
        self.rotate(true)
            .map_err(|error| error.at_step(Step::RotateIdentity))?;

        self.checkpoint()?;
        self.launch_application()
            .map_err(|error| error.at_step(Step::LaunchApplication))?;

        info!(profile = %name, "switched profile");
        Ok(read_cached_email(&self.live.database, self.store.email_key()))
    }

    /// Logs the application out, gives it a fresh machine identity, unbinds
    /// the live state and relaunches the application.
    pub fn reset(&self) -> Result<Rotation, ProfileError> {
        self.stop_application()?;

        self.checkpoint()?;
        let rotation = self
            .rotate(false)
            .map_err(|error| error.at_step(Step::RotateIdentity))?;

        self.checkpoint()?;
        self.launch_application()
            .map_err(|error| error.at_step(Step::LaunchApplication))?;

        Ok(rotation)
    }

    /// Regenerates identifiers of the live state without touching the
    /// application process.
    pub fn rotate(&self, preserve_login: bool) -> Result<Rotation, ProfileError> {
        IdentityRotator::new(&self.live, &self.identity, &self.store).rotate(preserve_login)
    }

    /// Returns `false` when no such profile exists.
    pub fn delete(&self, name: &str) -> Result<bool, ProfileError> {
        let name = parse_name(name)?;
        self.store.delete(&name)
    }

    pub fn rename(&self, old: &str, new: &str) -> Result<(), ProfileError> {
        let old = parse_name(old)?;
        let new = parse_name(new)?;
        self.store.rename(&old, &new)
    }

    pub fn export(&self, archive: &Path) -> Result<(), ProfileError> {
        if self.store.profile_names()?.is_empty() {
            return Err(ProfileError::NothingToExport);
        }

        self.archiver
            .compress_directory(self.store.root().path(), archive, &[POINTER_FILE_NAME])?;

        info!(archive = %archive.display(), "profiles exported");
        Ok(())
    }

    /// Extracts the profiles of `archive` into the profiles root. Without
    /// `overwrite`, any name collision aborts the import before extraction.
    /// Returns the imported profile names.
    pub fn import(&self, archive: &Path, overwrite: bool) -> Result<Vec<String>, ProfileError> {
        if !archive.is_file() {
            return Err(ProfileError::ArchiveNotFound {
                path: archive.display().to_string(),
            });
        }

        let names = self
            .archiver
            .list_top_level_directories(archive)?
            .iter()
            .map(|raw| parse_name(raw))
            .collect::<Result<Vec<_>, _>>()?;

        let collisions: Vec<&ProfileName> =
            names.iter().filter(|name| self.store.exists(name)).collect();

        if !collisions.is_empty() && !overwrite {
            return Err(ProfileError::ImportConflict {
                names: collisions.iter().map(|name| name.to_string()).collect(),
            });
        }

        let state = self.live_state();
        if let Some(current) = collisions.iter().find(|name| state.is_bound_to(name)) {
            info!(profile = %current, "current profile overwritten by import, unbinding live state");
            self.store.clear_current()?;
        }

        let root = self.store.root().path();
        std::fs::create_dir_all(root).map_err(|error| ProfileError::io_at("create", root, error))?;
        self.archiver.extract(archive, root)?;

        info!(archive = %archive.display(), count = names.len(), "profiles imported");
        Ok(names.into_iter().map(String::from).collect())
    }

    fn capture(&self, name: &ProfileName) -> Result<(), ProfileError> {
        remove_journal_files(&self.live.database)
            .map_err(|error| error.at_step(Step::ClearJournal))?;
        self.store
            .capture(name, &self.live)
            .map_err(|error| error.at_step(Step::CopyProfile))?;
        self.store
            .set_current(name)
            .map_err(|error| error.at_step(Step::UpdatePointer))?;
        self.store
            .stamp_last_active(name)
            .map_err(|error| error.at_step(Step::StampLastActive))?;

        info!(profile = %name, "profile saved");
        Ok(())
    }

    fn backup_unmanaged_state(&self, target: &ProfileName) -> Result<(), ProfileError> {
        if self.store.current().is_some() {
            return Ok(());
        }

        if !self.live.exists() {
            debug!("no live state to back up");
            return Ok(());
        }

        let backup = parse_name(&self.backup_name)?;
        if &backup == target {
            warn!(profile = %backup, "switching to the backup profile, unsaved live state is discarded");
            return Ok(());
        }

        info!(profile = %backup, "live state is unsaved, backing it up");
        remove_journal_files(&self.live.database)?;
        self.store.capture(&backup, &self.live)?;
        self.store.stamp_last_active(&backup)
    }

    fn stop_application(&self) -> Result<(), ProfileError> {
        let process = self.process.as_ref();

        if !process.is_running()? {
            debug!(process = process.process_name(), "application not running");
            return Ok(());
        }

        info!(process = process.process_name(), "asking application to quit");
        process.request_quit()?;

        for _ in 0..self.policy.poll_attempts {
            if !process.is_running()? {
                info!(process = process.process_name(), "application stopped");
                return Ok(());
            }
            self.checkpoint()?;
            thread::sleep(self.policy.poll_interval);
        }

        warn!(process = process.process_name(), "application did not quit, forcing termination");
        process.force_terminate()?;
        thread::sleep(self.policy.force_kill_grace);

        if process.is_running()? {
            return Err(ProcessControlError::StillRunning {
                process: process.process_name().to_string(),
            }
            .into());
        }

        Ok(())
    }

    fn launch_application(&self) -> Result<(), ProfileError> {
        thread::sleep(self.policy.relaunch_delay);
        info!(process = self.process.process_name(), "relaunching application");
        self.process.launch()?;
        Ok(())
    }

    fn checkpoint(&self) -> Result<(), ProfileError> {
        if self.cancellation.is_cancelled() {
            return Err(ProfileError::Cancelled);
        }
        Ok(())
    }
}

fn parse_name(name: &str) -> Result<ProfileName, ProfileError> {
    ProfileName::parse(name).map_err(|reason| ProfileError::invalid_name(name, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::TarGzArchiver;
    use crate::sqlite::SqliteKeyValueStore;
    use crate::testing::{FailingProcessController, ProcessCall, StubProcessController};
    use persona_core::KeyValueStore;
    use serde_json::{Map, Value};
    use std::fs;
    use tempfile::TempDir;

    const EMAIL_KEY: &str = "cursorAuth/cachedEmail";

    struct Fixture {
        directory: TempDir,
        process: Arc<StubProcessController>,
        manager: ProfileManager,
    }

    impl Fixture {
        fn live(&self) -> &LiveStatePaths {
            self.manager.live_paths()
        }

        fn log_in(&self, email: &str, theme: &str) {
            let live = self.live();
            fs::write(
                &live.settings,
                format!(
                    r#"{{"telemetry.machineId": "m", "telemetry.macMachineId": "mm", "telemetry.devDeviceId": "d", "editor.theme": "{}"}}"#,
                    theme
                ),
            )
            .unwrap();
            let _ = fs::remove_file(&live.database);
            let database = SqliteKeyValueStore::create(&live.database).unwrap();
            database.put(EMAIL_KEY, email).unwrap();
            database.put("cursorAuth/accessToken", "token").unwrap();
            database.put("workbench.layout", theme).unwrap();
        }

        fn live_value(&self, key: &str) -> Option<String> {
            SqliteKeyValueStore::open_read_only(&self.live().database)
                .unwrap()
                .get(key)
                .unwrap()
        }

        fn live_settings(&self) -> Map<String, Value> {
            match serde_json::from_str(&fs::read_to_string(&self.live().settings).unwrap())
                .unwrap()
            {
                Value::Object(map) => map,
                other => panic!("unexpected settings: {other}"),
            }
        }
    }

    fn fixture_with(process: Arc<StubProcessController>) -> Fixture {
        let directory = tempfile::tempdir().unwrap();
        let live_dir = directory.path().join("live");
        fs::create_dir_all(&live_dir).unwrap();

        let root = ProfilesRoot::new(directory.path().join("profiles"), "storage.json", "state.vscdb");
        let live = LiveStatePaths::new(live_dir.join("storage.json"), live_dir.join("state.vscdb"));

        let manager = ProfileManager::new(
            root,
            live,
            &Config::default(),
            process.clone(),
            Arc::new(TarGzArchiver::new()),
        )
        .with_policy(StopPolicy::immediate());

        Fixture {
            directory,
            process,
            manager,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(StubProcessController::new()))
    }

    #[test]
    fn empty_root_lists_nothing_and_reports_unmanaged() {
        let fixture = fixture();

        assert!(fixture.manager.list().unwrap().is_empty());
        let status = fixture.manager.status();
        assert_eq!(status.current_profile, None);
        assert_eq!(status.current_email, "Unknown");
    }

    #[test]
    fn save_without_live_state_fails_before_stopping() {
        let fixture = fixture_with(Arc::new(StubProcessController::running()));

        let result = fixture.manager.save("work");

        assert!(matches!(result, Err(ProfileError::LiveStateMissing { .. })));
        assert!(fixture.process.calls().is_empty());
    }

    #[test]
    fn save_rejects_invalid_names() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");

        let result = fixture.manager.save("../escape");

        assert!(matches!(result, Err(ProfileError::InvalidName { .. })));
    }

    #[test]
    fn save_stops_application_and_binds_live_state() {
        let fixture = fixture_with(Arc::new(StubProcessController::running()));
        fixture.log_in("a@x.com", "dark");

        let email = fixture.manager.save("work").unwrap();

        assert_eq!(email, "a@x.com");
        assert_eq!(fixture.process.calls(), vec![ProcessCall::RequestQuit]);
        assert_eq!(fixture.process.launch_count(), 0);
        assert_eq!(fixture.manager.status().current_profile.as_deref(), Some("work"));
        let profiles = fixture.manager.list().unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(profiles[0].is_current);
    }

    #[test]
    fn save_is_idempotent_per_name() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();
        fixture.log_in("b@x.com", "light");

        let email = fixture.manager.save("work").unwrap();

        assert_eq!(email, "b@x.com");
        assert_eq!(fixture.manager.list().unwrap().len(), 1);
    }

    #[test]
    fn stubborn_application_is_force_terminated() {
        let fixture = fixture_with(Arc::new(StubProcessController::stubborn()));
        fixture.log_in("a@x.com", "dark");

        fixture.manager.save("work").unwrap();

        assert_eq!(
            fixture.process.calls(),
            vec![ProcessCall::RequestQuit, ProcessCall::ForceTerminate]
        );
    }

    #[test]
    fn unkillable_application_aborts_without_changes() {
        let directory = tempfile::tempdir().unwrap();
        let root = ProfilesRoot::new(directory.path().join("profiles"), "storage.json", "state.vscdb");
        let live = LiveStatePaths::new(
            directory.path().join("storage.json"),
            directory.path().join("state.vscdb"),
        );
        fs::write(&live.settings, "{}").unwrap();
        SqliteKeyValueStore::create(&live.database).unwrap();
        let manager = ProfileManager::new(
            root,
            live,
            &Config::default(),
            Arc::new(FailingProcessController::unkillable()),
            Arc::new(TarGzArchiver::new()),
        )
        .with_policy(StopPolicy::immediate());

        let result = manager.save("work");

        assert!(matches!(
            result,
            Err(ProfileError::ExternalProcess(ProcessControlError::StillRunning { .. }))
        ));
        assert!(manager.list().unwrap().is_empty());
    }

    #[test]
    fn switch_to_missing_profile_is_not_found() {
        let fixture = fixture();

        let result = fixture.manager.switch("ghost");

        assert!(matches!(result, Err(ProfileError::NotFound { .. })));
        assert!(fixture.process.calls().is_empty());
    }

    #[test]
    fn save_then_switch_round_trips_non_identity_state() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();
        let saved_settings = fixture.live_settings();

        fixture.log_in("b@x.com", "light");
        fixture.manager.save("home").unwrap();
        fixture.manager.switch("work").unwrap();

        let mut restored = fixture.live_settings();
        let mut expected = saved_settings;
        for field in [
            "telemetry.machineId",
            "telemetry.macMachineId",
            "telemetry.devDeviceId",
        ] {
            assert_ne!(restored.remove(field), expected.remove(field));
        }
        assert_eq!(restored, expected);
        assert_eq!(fixture.live_value("workbench.layout").as_deref(), Some("dark"));
        assert_eq!(fixture.live_value("cursorAuth/accessToken").as_deref(), Some("token"));
    }

    #[test]
    fn switch_scenario_reports_profile_and_email() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();
        fixture.log_in("b@x.com", "light");
        fixture.manager.save("home").unwrap();

        let email = fixture.manager.switch("work").unwrap();

        assert_eq!(email, "a@x.com");
        let status = fixture.manager.status();
        assert_eq!(status.current_profile.as_deref(), Some("work"));
        assert_eq!(status.current_email, "a@x.com");
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({"current_profile": "work", "current_email": "a@x.com"})
        );
        assert_eq!(fixture.process.launch_count(), 1);
    }

    #[test]
    fn switch_from_unmanaged_state_backs_it_up() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();
        fixture.manager.reset().unwrap();
        fixture.log_in("stranger@x.com", "light");

        fixture.manager.switch("work").unwrap();

        let profiles = fixture.manager.list().unwrap();
        let backup = profiles
            .iter()
            .find(|profile| profile.name == "backup_before_switch")
            .expect("backup profile");
        assert_eq!(backup.email, "stranger@x.com");
        assert!(!backup.is_current);
        assert_eq!(fixture.manager.status().current_profile.as_deref(), Some("work"));
    }

    #[test]
    fn failed_backup_is_reported_as_backup_step() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();
        fixture.manager.reset().unwrap();
        fixture.log_in("stranger@x.com", "light");
        let backup_dir = fixture.directory.path().join("profiles/backup_before_switch");
        fs::write(&backup_dir, b"not a directory").unwrap();

        let error = fixture.manager.switch("work").unwrap_err();

        assert_eq!(error.failed_step(), Some(Step::BackupLiveState));
        assert_eq!(fixture.live_value(EMAIL_KEY).as_deref(), Some("stranger@x.com"));
        assert_eq!(fixture.manager.live_state(), LiveState::Unmanaged);
    }

    #[test]
    fn names_with_surrounding_whitespace_are_rejected() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");

        let result = fixture.manager.save("work ");

        assert!(matches!(result, Err(ProfileError::InvalidName { .. })));
        assert!(fixture.manager.list().unwrap().is_empty());

        fixture.manager.save("my work").unwrap();
        assert_eq!(fixture.manager.status().current_profile.as_deref(), Some("my work"));
    }

    #[test]
    fn switch_from_bound_state_does_not_back_up() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();
        fixture.log_in("b@x.com", "light");
        fixture.manager.save("home").unwrap();

        fixture.manager.switch("work").unwrap();

        assert_eq!(fixture.manager.list().unwrap().len(), 2);
    }

    #[test]
    fn switch_removes_stale_journal_files() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();
        let wal = fixture.live().journal_files()[0].clone();
        fs::write(&wal, b"stale").unwrap();

        fixture.manager.switch("work").unwrap();

        assert!(!wal.exists());
    }

    #[test]
    fn switch_reports_failed_launch_step() {
        let directory = tempfile::tempdir().unwrap();
        let root = ProfilesRoot::new(directory.path().join("profiles"), "storage.json", "state.vscdb");
        let live = LiveStatePaths::new(
            directory.path().join("storage.json"),
            directory.path().join("state.vscdb"),
        );
        fs::write(&live.settings, "{}").unwrap();
        SqliteKeyValueStore::create(&live.database).unwrap();
        let manager = ProfileManager::new(
            root,
            live,
            &Config::default(),
            Arc::new(FailingProcessController::launch_failure()),
            Arc::new(TarGzArchiver::new()),
        )
        .with_policy(StopPolicy::immediate());
        manager.save("work").unwrap();

        let error = manager.switch("work").unwrap_err();

        assert_eq!(error.failed_step(), Some(Step::LaunchApplication));
        assert_eq!(manager.status().current_profile.as_deref(), Some("work"));
    }

    #[test]
    fn reset_logs_out_and_unbinds() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();

        let rotation = fixture.manager.reset().unwrap();

        assert!(rotation.identity.is_well_formed());
        assert_eq!(fixture.manager.live_state(), LiveState::Unmanaged);
        assert_eq!(fixture.live_value(EMAIL_KEY), None);
        assert_eq!(fixture.live_value("workbench.layout").as_deref(), Some("dark"));
        assert_eq!(fixture.manager.status().current_email, "Unknown");
        assert_eq!(fixture.process.launch_count(), 1);
        assert_eq!(fixture.manager.list().unwrap()[0].email, "a@x.com");
    }

    #[test]
    fn reset_without_settings_reports_rotation_step() {
        let fixture = fixture();

        let error = fixture.manager.reset().unwrap_err();

        assert_eq!(error.failed_step(), Some(Step::RotateIdentity));
        assert!(matches!(error.root(), ProfileError::LiveStateMissing { .. }));
        assert_eq!(fixture.process.launch_count(), 0);
    }

    #[test]
    fn delete_current_profile_returns_to_unmanaged() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();

        assert!(fixture.manager.delete("work").unwrap());

        assert_eq!(fixture.manager.live_state(), LiveState::Unmanaged);
        assert!(!fixture.manager.delete("work").unwrap());
    }

    #[test]
    fn rename_current_profile_rebinds() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();

        fixture.manager.rename("work", "office").unwrap();

        assert_eq!(fixture.manager.status().current_profile.as_deref(), Some("office"));
    }

    #[test]
    fn export_without_profiles_fails() {
        let fixture = fixture();
        let archive = fixture.directory.path().join("out.tar.gz");

        let result = fixture.manager.export(&archive);

        assert!(matches!(result, Err(ProfileError::NothingToExport)));
        assert!(!archive.exists());
    }

    #[test]
    fn import_missing_archive_is_not_found() {
        let fixture = fixture();

        let result = fixture
            .manager
            .import(&fixture.directory.path().join("missing.tar.gz"), false);

        assert!(matches!(result, Err(ProfileError::ArchiveNotFound { .. })));
    }

    #[test]
    fn export_then_import_into_fresh_root() {
        let source = fixture();
        source.log_in("a@x.com", "dark");
        source.manager.save("work").unwrap();
        source.log_in("b@x.com", "light");
        source.manager.save("home").unwrap();
        let archive = source.directory.path().join("profiles.tar.gz");
        source.manager.export(&archive).unwrap();

        let target = fixture();
        let imported = target.manager.import(&archive, false).unwrap();

        assert_eq!(imported, vec!["home".to_string(), "work".to_string()]);
        let emails: Vec<_> = target
            .manager
            .list()
            .unwrap()
            .into_iter()
            .map(|profile| (profile.name, profile.email, profile.is_current))
            .collect();
        assert_eq!(
            emails,
            vec![
                ("home".to_string(), "b@x.com".to_string(), false),
                ("work".to_string(), "a@x.com".to_string(), false),
            ]
        );
        assert_eq!(target.manager.live_state(), LiveState::Unmanaged);
    }

    #[test]
    fn import_refuses_to_overwrite_without_flag() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();
        let archive = fixture.directory.path().join("profiles.tar.gz");
        fixture.manager.export(&archive).unwrap();
        fixture.log_in("b@x.com", "light");
        fixture.manager.save("work").unwrap();

        let error = fixture.manager.import(&archive, false).unwrap_err();

        match error {
            ProfileError::ImportConflict { names } => assert_eq!(names, vec!["work".to_string()]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(fixture.manager.list().unwrap()[0].email, "b@x.com");
    }

    #[test]
    fn import_with_overwrite_replaces_and_unbinds_current() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        fixture.manager.save("work").unwrap();
        let archive = fixture.directory.path().join("profiles.tar.gz");
        fixture.manager.export(&archive).unwrap();
        fixture.log_in("b@x.com", "light");
        fixture.manager.save("work").unwrap();

        fixture.manager.import(&archive, true).unwrap();

        assert_eq!(fixture.manager.list().unwrap()[0].email, "a@x.com");
        assert_eq!(fixture.manager.live_state(), LiveState::Unmanaged);
    }

    #[test]
    fn cancelled_operation_stops_before_side_effects() {
        let fixture = fixture();
        fixture.log_in("a@x.com", "dark");
        let cancellation = CancellationFlag::new();
        let manager = ProfileManager::new(
            fixture.manager.store().root().clone(),
            fixture.live().clone(),
            &Config::default(),
            fixture.process.clone(),
            Arc::new(TarGzArchiver::new()),
        )
        .with_policy(StopPolicy::immediate())
        .with_cancellation(cancellation.clone());

        cancellation.cancel();
        let result = manager.save("work");

        assert!(matches!(result, Err(ProfileError::Cancelled)));
        assert!(manager.list().unwrap().is_empty());
    }
}
