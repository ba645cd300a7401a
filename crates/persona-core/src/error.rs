use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::domain::ProfileNameError;
use crate::ports::{ArchiveError, KeyValueStoreError, ProcessControlError};

/// A stage of a multi-step operation, named when a later stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    BackupLiveState,
    ClearJournal,
    CopyProfile,
    UpdatePointer,
    StampLastActive,
    RotateIdentity,
    LaunchApplication,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::BackupLiveState => "back up live state",
            Step::ClearJournal => "clear write-ahead log",
            Step::CopyProfile => "copy profile files",
            Step::UpdatePointer => "update current profile",
            Step::StampLastActive => "stamp last active",
            Step::RotateIdentity => "rotate machine identity",
            Step::LaunchApplication => "launch application",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("profile not found: {name}")]
    NotFound { name: String },

    #[error("archive not found: {path}")]
    ArchiveNotFound { path: String },

    #[error("profile already exists: {name}")]
    Conflict { name: String },

    #[error("import would overwrite existing profiles: {}", names.join(", "))]
    ImportConflict { names: Vec<String> },

    #[error("no application data found at {path}")]
    LiveStateMissing { path: String },

    #[error("profile {name} is incomplete")]
    Incomplete { name: String },

    #[error("invalid profile name '{name}': {reason}")]
    InvalidName {
        name: String,
        #[source]
        reason: ProfileNameError,
    },

    #[error("no profiles to export")]
    NothingToExport,

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot update settings document {path}: {message}")]
    Document { path: String, message: String },

    #[error(transparent)]
    Storage(#[from] KeyValueStoreError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    ExternalProcess(#[from] ProcessControlError),

    #[error("operation cancelled")]
    Cancelled,

    #[error("step '{step}' failed: {source}")]
    StepFailed {
        step: Step,
        #[source]
        source: Box<ProfileError>,
    },
}

impl ProfileError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ProfileError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn io_at(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::io(format!("cannot {} {}", action, path.display()), source)
    }

    pub fn invalid_name(name: &str, reason: ProfileNameError) -> Self {
        ProfileError::InvalidName {
            name: name.to_string(),
            reason,
        }
    }

    /// Tags the error with the step it happened in. Cancellation and errors
    /// that already carry a step are left untouched.
    pub fn at_step(self, step: Step) -> Self {
        match self {
            ProfileError::Cancelled | ProfileError::StepFailed { .. } => self,
            other => ProfileError::StepFailed {
                step,
                source: Box::new(other),
            },
        }
    }

    pub fn failed_step(&self) -> Option<Step> {
        match self {
            ProfileError::StepFailed { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// The innermost error, with any step wrapper removed.
    pub fn root(&self) -> &ProfileError {
        match self {
            ProfileError::StepFailed { source, .. } => source.root(),
            other => other,
        }
    }
}
