use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Supported content locales. The declaration order doubles as the
/// "first non-empty" scan order, with [`Locale::Uz`] as the default.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Uz,
    Ru,
    En,
}

impl Locale {
    /// All supported locales in fallback-scan order.
    pub const ALL: [Locale; 3] = [Locale::Uz, Locale::Ru, Locale::En];

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Uz => "uz",
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown locale '{0}' (expected one of: uz, ru, en)")]
pub struct ParseLocaleError(String);

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uz" => Ok(Locale::Uz),
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(ParseLocaleError(other.to_string())),
        }
    }
}

/// Per-locale text values with explicit fallback resolution.
///
/// Empty strings are treated as absent: `set` drops them and the accessors
/// never return one. Serialized as a plain `{"uz": "...", "ru": "..."}` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<Locale, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style constructor: `LocalizedText::new().with(Locale::Uz, "Telefonlar")`.
    pub fn with(mut self, locale: Locale, text: impl Into<String>) -> Self {
        self.set(locale, text);
        self
    }

    /// Sets the value for a locale; an empty or whitespace-only value
    /// removes the entry instead.
    pub fn set(&mut self, locale: Locale, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            self.0.remove(&locale);
        } else {
            self.0.insert(locale, text);
        }
    }

    /// Value for exactly this locale, without fallback.
    pub fn get(&self, locale: Locale) -> Option<&str> {
        self.0
            .get(&locale)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Value for the requested locale, falling back to the default locale
    /// and then to the first non-empty value in locale order.
    pub fn resolve(&self, locale: Locale) -> Option<&str> {
        self.get(locale)
            .or_else(|| self.get(Locale::default()))
            .or_else(|| self.first())
    }

    /// First non-empty value in [`Locale::ALL`] order.
    pub fn first(&self) -> Option<&str> {
        Locale::ALL.iter().find_map(|locale| self.get(*locale))
    }

    /// Iterates present (locale, value) pairs in locale order.
    pub fn values(&self) -> impl Iterator<Item = (Locale, &str)> {
        self.0.iter().map(|(locale, text)| (*locale, text.as_str()))
    }

    /// True when no locale has a non-empty value.
    pub fn is_blank(&self) -> bool {
        self.first().is_none()
    }
}
