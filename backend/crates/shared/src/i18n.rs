//! Languages and translated text

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported UI / content language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Fr, Language::Ar];

    pub const fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "fr" => Some(Language::Fr),
            "ar" => Some(Language::Ar),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported language: {0}")]
pub struct UnknownLanguage(pub String);

/// Text with up to one translation per [`Language`]
///
/// Stored as a JSON object (`{"en": "...", "fr": "...", "ar": "..."}`).
/// Blank translations are normalized to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ar: Option<String>,
}

impl LocalizedText {
    pub fn english(text: impl Into<String>) -> Self {
        Self {
            en: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn get(&self, lang: Language) -> Option<&str> {
        match lang {
            Language::En => self.en.as_deref(),
            Language::Fr => self.fr.as_deref(),
            Language::Ar => self.ar.as_deref(),
        }
        .filter(|s| !s.trim().is_empty())
    }

    /// Requested translation, else the first present one in en, fr, ar order.
    pub fn resolve(&self, lang: Language) -> &str {
        self.get(lang)
            .or_else(|| Language::ALL.iter().find_map(|l| self.get(*l)))
            .unwrap_or("")
    }

    /// No non-blank translation
    pub fn is_empty(&self) -> bool {
        Language::ALL.iter().all(|l| self.get(*l).is_none())
    }

    /// Trims every translation and drops blank ones.
    pub fn normalized(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        Self {
            en: clean(self.en),
            fr: clean(self.fr),
            ar: clean(self.ar),
        }
    }

    /// Longest translation in characters
    pub fn max_chars(&self) -> usize {
        Language::ALL
            .iter()
            .filter_map(|l| self.get(*l))
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Case-insensitive substring match against any translation
    pub fn contains_ignore_case(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        Language::ALL
            .iter()
            .filter_map(|l| self.get(*l))
            .any(|s| s.to_lowercase().contains(&needle))
    }
}
