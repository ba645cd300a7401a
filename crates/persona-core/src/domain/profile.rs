use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths::POINTER_FILE_NAME;

/// Format of the last-active marker, local time.
pub const LAST_ACTIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileNameError {
    #[error("profile name is empty")]
    Empty,

    #[error("profile name must not contain '{0}'")]
    ForbiddenCharacter(char),

    #[error("profile name must not start with '.'")]
    Hidden,

    #[error("profile name must not start or end with whitespace")]
    SurroundingWhitespace,

    #[error("'{0}' is reserved")]
    Reserved(String),
}

/// Name of a saved profile. Doubles as the profile's directory name, so it
/// must be a single, visible path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProfileName(String);

impl ProfileName {
    pub fn parse(value: &str) -> Result<Self, ProfileNameError> {
        if value.trim().is_empty() {
            return Err(ProfileNameError::Empty);
        }

        if value.trim() != value {
            return Err(ProfileNameError::SurroundingWhitespace);
        }

        if let Some(character) = value.chars().find(|c| matches!(c, '/' | '\\' | '\0')) {
            return Err(ProfileNameError::ForbiddenCharacter(character));
        }

        if value.starts_with('.') {
            return Err(ProfileNameError::Hidden);
        }

        if value == POINTER_FILE_NAME {
            return Err(ProfileNameError::Reserved(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProfileName {
    type Err = ProfileNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ProfileName {
    type Error = ProfileNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProfileName> for String {
    fn from(name: ProfileName) -> Self {
        name.0
    }
}

impl AsRef<str> for ProfileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One row of `list` / `list_json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub name: String,
    pub email: String,
    pub is_current: bool,
    pub last_active: String,
}

pub fn format_last_active(moment: DateTime<Local>) -> String {
    moment.format(LAST_ACTIVE_FORMAT).to_string()
}
