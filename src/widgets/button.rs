use std::sync::Arc;

use crate::translate::interface::{RenderedTranslation, TextDirection, TranslationResult, Translator};
use super::route_translation;

/// Toggle between a passage and its translation.
pub struct TranslateButton {
    translator: Arc<dyn Translator>,
    text: String,
    target_lang: String,
    source_lang: String,
    domain: Option<String>,
    context: Option<String>,
    rtl_languages: Vec<String>,
    translated: Option<String>,
    showing_translation: bool,
}

impl TranslateButton {
    pub fn new(translator: Arc<dyn Translator>, text: &str, target_lang: &str) -> Self {
        Self {
            translator,
            text: text.to_string(),
            target_lang: target_lang.to_string(),
            source_lang: "en".to_string(),
            domain: None,
            context: None,
            rtl_languages: vec!["ur".to_string(), "ar".to_string()],
            translated: None,
            showing_translation: false,
        }
    }

    pub fn with_source_lang(mut self, source_lang: &str) -> Self {
        self.source_lang = source_lang.to_string();
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    pub fn with_rtl_languages(mut self, rtl_languages: Vec<String>) -> Self {
        self.rtl_languages = rtl_languages;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.translator.is_loading() || self.text.trim().is_empty()
    }

    pub fn label(&self) -> &'static str {
        if self.showing_translation {
            "Show Original"
        } else {
            "Translate"
        }
    }

    /// Flip back to the original, or translate. Returns the result when a
    /// request was made.
    pub async fn press(&mut self) -> Option<TranslationResult> {
        if self.showing_translation {
            self.showing_translation = false;
            return None;
        }
        if self.text.trim().is_empty() {
            return None;
        }

        let result = route_translation(
            self.translator.as_ref(),
            &self.text,
            &self.target_lang,
            &self.source_lang,
            self.domain.as_deref(),
            self.context.as_deref(),
        )
        .await;

        if let Some(translation) = result.translation() {
            self.translated = Some(translation.to_string());
            self.showing_translation = true;
        }
        Some(result)
    }

    /// What the widget currently shows.
    pub fn display(&self) -> RenderedTranslation {
        match (&self.translated, self.showing_translation) {
            (Some(translated), true) => RenderedTranslation {
                text: translated.clone(),
                language: self.target_lang.clone(),
                direction: TextDirection::for_language(&self.target_lang, &self.rtl_languages),
            },
            _ => RenderedTranslation {
                text: self.text.clone(),
                language: self.source_lang.clone(),
                direction: TextDirection::for_language(&self.source_lang, &self.rtl_languages),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EchoTranslator;

    #[tokio::test]
    async fn test_press_toggles() {
        let fake = Arc::new(EchoTranslator::default());
        let mut button = TranslateButton::new(fake.clone(), "hello", "ur");
        assert_eq!(button.label(), "Translate");

        let result = button.press().await.unwrap();
        assert!(result.success);
        assert_eq!(button.label(), "Show Original");
        assert_eq!(button.display().text, "ur:HELLO");
        assert_eq!(button.display().direction, TextDirection::Rtl);

        assert!(button.press().await.is_none());
        assert_eq!(button.display().text, "hello");
        assert_eq!(button.display().direction, TextDirection::Ltr);
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_text_is_disabled() {
        let fake = Arc::new(EchoTranslator::default());
        let mut button = TranslateButton::new(fake.clone(), "  ", "ur");
        assert!(button.is_disabled());
        assert!(button.press().await.is_none());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_original() {
        let fake = Arc::new(EchoTranslator::default());
        let mut button = TranslateButton::new(fake.clone(), "please fail", "ur").with_domain("ai");

        let result = button.press().await.unwrap();
        assert_eq!(result.error(), Some("backend said no"));
        assert_eq!(button.label(), "Translate");
        assert_eq!(button.display().text, "please fail");
        assert_eq!(fake.calls(), vec!["technical[ai]:please fail"]);
    }

    #[tokio::test]
    async fn test_context_routes_to_context_endpoint() {
        let fake = Arc::new(EchoTranslator::default());
        let mut button = TranslateButton::new(fake.clone(), "joint", "hi").with_context("URDF chapter");
        button.press().await;
        assert_eq!(fake.calls(), vec!["context[URDF chapter]:joint"]);
    }
}
