use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Interface language of the CLI. Stored as its code in `[general]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

#[derive(Error, Debug)]
#[error("unsupported language: {0}. Available languages: en, zh")]
pub struct UnsupportedLanguageError(String);

struct LanguageInfo {
    language: Language,
    code: &'static str,
    display_name: &'static str,
    aliases: &'static [&'static str],
    catalog: &'static str,
}

static LANGUAGES: [LanguageInfo; 2] = [
    LanguageInfo {
        language: Language::En,
        code: "en",
        display_name: "English",
        aliases: &["english"],
        catalog: include_str!("locales/en.toml"),
    },
    LanguageInfo {
        language: Language::Zh,
        code: "zh",
        display_name: "中文",
        aliases: &["chinese", "中文", "zh-cn", "zh-hans"],
        catalog: include_str!("locales/zh.toml"),
    },
];

impl Language {
    fn info(self) -> &'static LanguageInfo {
        match self {
            Language::En => &LANGUAGES[0],
            Language::Zh => &LANGUAGES[1],
        }
    }

    pub fn code(&self) -> &'static str {
        self.info().code
    }

    pub fn display_name(&self) -> &'static str {
        self.info().display_name
    }

    /// Embedded TOML message catalog.
    pub(crate) fn catalog(&self) -> &'static str {
        self.info().catalog
    }

    pub fn available_languages() -> impl Iterator<Item = Language> {
        LANGUAGES.iter().map(|info| info.language)
    }

    /// Accepts codes, aliases and POSIX locale names such as `zh_CN.UTF-8`.
    pub fn from_locale(locale: &str) -> Option<Language> {
        let lowered = locale.trim().to_lowercase();
        let base = lowered.split(['.', '@']).next().unwrap_or_default();
        let primary = base.split(['_', '-']).next().unwrap_or_default();

        LANGUAGES
            .iter()
            .find(|info| {
                info.code == base
                    || info.aliases.contains(&base)
                    || info.code == primary
            })
            .map(|info| info.language)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_locale(s).ok_or_else(|| UnsupportedLanguageError(s.to_string()))
    }
}
