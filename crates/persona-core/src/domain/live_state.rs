use serde::Serialize;

use super::ProfileName;

/// Shown when no login email can be read from a database.
pub const UNKNOWN_EMAIL: &str = "Unknown";

/// Relationship between the application's live files and the saved profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveState {
    Unmanaged,
    Bound(ProfileName),
}

impl LiveState {
    pub fn from_pointer(pointer: Option<ProfileName>) -> Self {
        match pointer {
            Some(name) => LiveState::Bound(name),
            None => LiveState::Unmanaged,
        }
    }

    pub fn profile(&self) -> Option<&ProfileName> {
        match self {
            LiveState::Unmanaged => None,
            LiveState::Bound(name) => Some(name),
        }
    }

    pub fn is_bound_to(&self, name: &ProfileName) -> bool {
        self.profile() == Some(name)
    }
}

/// Result of `status` / `status_json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub current_profile: Option<String>,
    pub current_email: String,
}

impl StatusReport {
    pub fn new(state: &LiveState, email: Option<String>) -> Self {
        Self {
            current_profile: state.profile().map(|name| name.to_string()),
            current_email: email.unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
        }
    }
}
