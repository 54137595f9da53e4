use std::sync::Arc;

use crate::translate::history::TranslationHistory;
use crate::translate::interface::{RenderedTranslation, TextDirection, TranslationResult, Translator};
use super::{route_translation, GENERAL_DOMAIN};

/// Technical domains the workspace offers, as `(value, label)`.
pub const DOMAINS: [(&str, &str); 4] = [
    ("general", "General"),
    ("robotics", "Robotics"),
    ("ai", "AI/Machine Learning"),
    ("programming", "Programming"),
];

/// The full translate page: language pair, optional domain and context,
/// and a bounded history of successful translations.
pub struct TranslateWorkspace {
    translator: Arc<dyn Translator>,
    rtl_languages: Vec<String>,
    pub source_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub domain: String,
    pub context: String,
    translated: String,
    history: TranslationHistory,
}

impl TranslateWorkspace {
    pub fn new(translator: Arc<dyn Translator>, source_lang: &str, target_lang: &str, history_limit: usize) -> Self {
        Self {
            translator,
            rtl_languages: vec!["ur".to_string(), "ar".to_string()],
            source_text: String::new(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            domain: GENERAL_DOMAIN.to_string(),
            context: String::new(),
            translated: String::new(),
            history: TranslationHistory::new(history_limit),
        }
    }

    pub fn with_rtl_languages(mut self, rtl_languages: Vec<String>) -> Self {
        self.rtl_languages = rtl_languages;
        self
    }

    pub fn history(&self) -> &TranslationHistory {
        &self.history
    }

    pub fn rendered(&self) -> Option<RenderedTranslation> {
        if self.translated.is_empty() {
            return None;
        }
        Some(RenderedTranslation {
            text: self.translated.clone(),
            language: self.target_lang.clone(),
            direction: TextDirection::for_language(&self.target_lang, &self.rtl_languages),
        })
    }

    pub async fn translate(&mut self) -> Option<TranslationResult> {
        if self.source_text.trim().is_empty() {
            return None;
        }

        let result = route_translation(
            self.translator.as_ref(),
            &self.source_text,
            &self.target_lang,
            &self.source_lang,
            Some(&self.domain),
            Some(&self.context),
        )
        .await;

        if let Some(translation) = result.translation() {
            self.translated = translation.to_string();
            self.history
                .record(&self.source_text, translation, &self.source_lang, &self.target_lang);
        }
        Some(result)
    }

    /// Swap the language pair; when a translation is showing, swap the texts too.
    pub fn swap_languages(&mut self) {
        std::mem::swap(&mut self.source_lang, &mut self.target_lang);
        if !self.translated.is_empty() {
            std::mem::swap(&mut self.source_text, &mut self.translated);
        }
    }
}
