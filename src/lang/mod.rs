//! Page/query language tagging.
//!
//! The domain is bilingual: anything that is not confidently French is treated
//! as English, the default language.


use serde::{Deserialize, Serialize};
use whatlang::Lang;

use crate::constants::LANGUAGE_SAMPLE_CHARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// Language tag carried by pages, segments and queries.
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
}

impl Language {
    /// The language embeddings and answers default to.
    pub const DEFAULT: Language = Language::English;

    /// Two-letter code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }

    /// Collapses any language code to the bilingual tag set (`fr*` or English).
    pub fn from_code(code: &str) -> Self {
        if code.trim().to_ascii_lowercase().starts_with("fr") {
            Language::French
        } else {
            Language::English
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Language identification capability. Never fails: unknown input is English.
pub trait LanguageIdentifier: Send + Sync {
    fn detect(&self, text: &str) -> Language;
}

/// Statistical identifier backed by `whatlang`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangIdentifier;

impl LanguageIdentifier for WhatlangIdentifier {
    fn detect(&self, text: &str) -> Language {
        let sample = language_sample(text);
        match whatlang::detect(sample).map(|info| info.lang()) {
            Some(Lang::Fra) => Language::French,
            _ => Language::English,
        }
    }
}

/// Deterministic identifier that always answers the same language.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedLanguage(pub Language);

impl LanguageIdentifier for FixedLanguage {
    fn detect(&self, _text: &str) -> Language {
        self.0
    }
}

/// Returns the first [`LANGUAGE_SAMPLE_CHARS`] characters of `text`.
pub fn language_sample(text: &str) -> &str {
    match text.char_indices().nth(LANGUAGE_SAMPLE_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
