use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Message for blank input that never reached the backend.
pub const EMPTY_TEXT_ERROR: &str = "Nothing to translate";

/// Normalized outcome of one translation request.
///
/// `success` is true exactly when `translation` is present and `error` is
/// absent. Results decoded from the wire go through [`TranslationResult::normalize`]
/// before they reach callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub source_lang: String,
    #[serde(default)]
    pub target_lang: String,
    #[serde(default)]
    pub original_text: String,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl TranslationResult {
    #[cfg(test)]
    pub fn succeeded(
        original_text: &str,
        translation: String,
        source_lang: &str,
        target_lang: &str,
        cached: bool,
    ) -> Self {
        Self {
            success: true,
            translation: Some(translation),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            original_text: original_text.to_string(),
            cached,
            error: None,
        }
    }

    pub fn failed(original_text: &str, source_lang: &str, target_lang: &str, error: String) -> Self {
        Self {
            success: false,
            translation: None,
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            original_text: original_text.to_string(),
            cached: false,
            error: Some(error),
        }
    }

    /// Fill request fields the server left out and enforce the
    /// success/translation/error invariant.
    pub fn normalize(mut self, original_text: &str, source_lang: &str, target_lang: &str) -> Self {
        if self.original_text.is_empty() {
            self.original_text = original_text.to_string();
        }
        if self.source_lang.is_empty() {
            self.source_lang = source_lang.to_string();
        }
        if self.target_lang.is_empty() {
            self.target_lang = target_lang.to_string();
        }

        let translation = self.translation.take().filter(|t| !t.is_empty());
        let error = self.error.take().filter(|e| !e.trim().is_empty());

        match (self.success, translation) {
            (true, Some(translation)) => {
                self.translation = Some(translation);
                self.error = None;
            }
            (true, None) => {
                self.success = false;
                self.cached = false;
                self.error = Some(error.unwrap_or_else(|| "Empty translation returned".to_string()));
            }
            (false, _) => {
                self.cached = false;
                self.error = Some(error.unwrap_or_else(|| "Translation failed".to_string()));
            }
        }
        self
    }

    pub fn translation(&self) -> Option<&str> {
        self.translation.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[cfg(test)]
    pub fn satisfies_invariant(&self) -> bool {
        if self.success {
            self.translation.is_some() && self.error.is_none()
        } else {
            self.translation.is_none() && self.error.is_some()
        }
    }
}

/// Writing direction used when rendering a translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn for_language<S: AsRef<str>>(code: &str, rtl_languages: &[S]) -> Self {
        if rtl_languages.iter().any(|l| l.as_ref().eq_ignore_ascii_case(code)) {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translated text paired with the direction it should be displayed in.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTranslation {
    pub text: String,
    pub language: String,
    pub direction: TextDirection,
}

/// Operations every translation consumer relies on.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate_text(&self, text: &str, target_lang: &str, source_lang: &str) -> TranslationResult;

    async fn translate_technical(&self, text: &str, target_lang: &str, domain: &str) -> TranslationResult;

    async fn translate_with_context(&self, text: &str, target_lang: &str, context: &str) -> TranslationResult;

    async fn supported_languages(&self) -> BTreeMap<String, String>;

    /// Whether any request is currently in flight.
    fn is_loading(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_hold_invariant() {
        let ok = TranslationResult::succeeded("hello", "ہیلو".to_string(), "en", "ur", false);
        let err = TranslationResult::failed("hello", "en", "ur", "boom".to_string());
        assert!(ok.satisfies_invariant());
        assert!(err.satisfies_invariant());
        assert_eq!(ok.translation(), Some("ہیلو"));
        assert_eq!(err.error(), Some("boom"));
    }

    #[test]
    fn test_normalize_over_wire_shapes() {
        let bodies = [
            r#"{"success": true, "translation": "x", "error": null}"#,
            r#"{"success": true, "translation": "x", "error": "ignored"}"#,
            r#"{"success": true, "translation": null}"#,
            r#"{"success": true, "translation": ""}"#,
            r#"{"success": true}"#,
            r#"{"success": false, "error": "API key not configured"}"#,
            r#"{"success": false, "translation": "stale", "error": null}"#,
            r#"{"success": false, "error": "   "}"#,
            r#"{}"#,
        ];
        for body in bodies {
            let raw: TranslationResult = serde_json::from_str(body).unwrap();
            let result = raw.normalize("hi", "en", "ur");
            assert!(result.satisfies_invariant(), "invariant broken for {}", body);
            assert_eq!(result.original_text, "hi");
            assert_eq!(result.source_lang, "en");
            assert_eq!(result.target_lang, "ur");
        }
    }

    #[test]
    fn test_normalize_keeps_server_fields() {
        let raw: TranslationResult = serde_json::from_str(
            r#"{"success": true, "translation": "ہیلو", "source_lang": "en", "target_lang": "ur", "original_text": "hello", "cached": true}"#,
        )
        .unwrap();
        let result = raw.normalize("other", "fr", "de");
        assert!(result.cached);
        assert_eq!(result.original_text, "hello");
        assert_eq!(result.target_lang, "ur");
    }

    #[test]
    fn test_failure_keeps_server_message() {
        let raw: TranslationResult =
            serde_json::from_str(r#"{"success": false, "error": "Unsupported target language: xx"}"#).unwrap();
        let result = raw.normalize("hi", "en", "xx");
        assert_eq!(result.error(), Some("Unsupported target language: xx"));
        assert!(!result.cached);
    }

    #[test]
    fn test_text_direction() {
        let rtl = ["ur", "ar"];
        assert_eq!(TextDirection::for_language("ur", &rtl), TextDirection::Rtl);
        assert_eq!(TextDirection::for_language("AR", &rtl), TextDirection::Rtl);
        assert_eq!(TextDirection::for_language("hi", &rtl), TextDirection::Ltr);
        assert_eq!(TextDirection::Rtl.to_string(), "rtl");
    }
}
