//! Supported study languages.

use serde::Serialize;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

impl Language {
    /// English name, followed by the native name in parentheses when they differ.
    pub fn display_name(&self) -> String {
        if self.name == self.native_name {
            self.name.to_string()
        } else {
            format!("{} ({})", self.name, self.native_name)
        }
    }
}

pub static LANGUAGES: [Language; 15] = [
    Language { code: "en", name: "English", native_name: "English" },
    Language { code: "ja", name: "Japanese", native_name: "日本語" },
    Language { code: "fa", name: "Persian", native_name: "فارسی" },
    Language { code: "ar", name: "Arabic", native_name: "العربية" },
    Language { code: "hi", name: "Hindi", native_name: "हिन्दी" },
    Language { code: "my", name: "Myanmar (Burmese)", native_name: "မြန်မာ" },
    Language { code: "es", name: "Spanish", native_name: "Español" },
    Language { code: "fr", name: "French", native_name: "Français" },
    Language { code: "de", name: "German", native_name: "Deutsch" },
    Language { code: "zh", name: "Chinese (Mandarin)", native_name: "中文" },
    Language { code: "ko", name: "Korean", native_name: "한국어" },
    Language { code: "pt", name: "Portuguese", native_name: "Português" },
    Language { code: "ru", name: "Russian", native_name: "Русский" },
    Language { code: "it", name: "Italian", native_name: "Italiano" },
    Language { code: "tr", name: "Turkish", native_name: "Türkçe" },
];

pub fn language_by_code(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.code == code)
}

/// Like [`language_by_code`], but an unknown code is an error.
pub fn require_language(code: &str) -> Result<&'static Language, CoreError> {
    language_by_code(code).ok_or_else(|| CoreError::UnsupportedLanguage(code.to_string()))
}

/// English name for `code`, or the code itself when unknown.
pub fn language_name(code: &str) -> String {
    language_by_code(code)
        .map(|lang| lang.name.to_string())
        .unwrap_or_else(|| code.to_string())
}
