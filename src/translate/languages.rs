use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

use super::interface::Translator;

/// Language picker backed by the supported-language list.
///
/// The list is fetched on first use and kept for the life of this selector
/// only. A failed fetch yields an empty list, which is cached like any other.
pub struct LanguageSelector {
    translator: Arc<dyn Translator>,
    languages: OnceCell<BTreeMap<String, String>>,
    selected: String,
    open: bool,
}

impl LanguageSelector {
    pub fn new(translator: Arc<dyn Translator>, selected: &str) -> Self {
        Self {
            translator,
            languages: OnceCell::new(),
            selected: selected.to_string(),
            open: false,
        }
    }

    pub async fn languages(&self) -> &BTreeMap<String, String> {
        self.languages
            .get_or_init(|| async { self.translator.supported_languages().await })
            .await
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Pick a language and close the dropdown.
    pub fn select(&mut self, code: &str) {
        self.selected = code.to_string();
        self.open = false;
    }

    /// Display name for `code`, or the code itself when it isn't listed.
    pub async fn display_name(&self, code: &str) -> String {
        self.languages()
            .await
            .get(code)
            .cloned()
            .unwrap_or_else(|| code.to_string())
    }

    pub async fn selected_name(&self) -> String {
        self.display_name(&self.selected).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::interface::TranslationResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLanguages {
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl Translator for CountingLanguages {
        async fn translate_text(&self, text: &str, target_lang: &str, source_lang: &str) -> TranslationResult {
            TranslationResult::failed(text, source_lang, target_lang, "unused".to_string())
        }

        async fn translate_technical(&self, text: &str, target_lang: &str, _domain: &str) -> TranslationResult {
            TranslationResult::failed(text, "en", target_lang, "unused".to_string())
        }

        async fn translate_with_context(&self, text: &str, target_lang: &str, _context: &str) -> TranslationResult {
            TranslationResult::failed(text, "en", target_lang, "unused".to_string())
        }

        async fn supported_languages(&self) -> BTreeMap<String, String> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            BTreeMap::from([
                ("en".to_string(), "English".to_string()),
                ("ur".to_string(), "Urdu".to_string()),
            ])
        }
    }

    #[tokio::test]
    async fn test_fetches_once_per_instance() {
        let source = Arc::new(CountingLanguages {
            fetches: AtomicUsize::new(0),
        });
        let selector = LanguageSelector::new(source.clone(), "ur");

        assert_eq!(selector.selected_name().await, "Urdu");
        assert_eq!(selector.display_name("en").await, "English");
        assert_eq!(selector.languages().await.len(), 2);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        let other = LanguageSelector::new(source.clone(), "en");
        assert_eq!(other.selected_name().await, "English");
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unknown_code_falls_back_to_code() {
        let source = Arc::new(CountingLanguages {
            fetches: AtomicUsize::new(0),
        });
        let mut selector = LanguageSelector::new(source, "en");
        selector.toggle();
        assert!(selector.is_open());

        selector.select("xx");
        assert!(!selector.is_open());
        assert_eq!(selector.selected_name().await, "xx");
    }
}
