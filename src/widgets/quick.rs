use std::sync::Arc;

use crate::translate::interface::{RenderedTranslation, TextDirection, Translator};

/// Quick-translate modal opened from the navigation bar.
pub struct QuickTranslator {
    translator: Arc<dyn Translator>,
    rtl_languages: Vec<String>,
    open: bool,
    input: String,
    target_lang: String,
    output: Option<RenderedTranslation>,
    error: Option<String>,
}

impl QuickTranslator {
    pub fn new(translator: Arc<dyn Translator>, target_lang: &str) -> Self {
        Self {
            translator,
            rtl_languages: vec!["ur".to_string(), "ar".to_string()],
            open: false,
            input: String::new(),
            target_lang: target_lang.to_string(),
            output: None,
            error: None,
        }
    }

    pub fn with_rtl_languages(mut self, rtl_languages: Vec<String>) -> Self {
        self.rtl_languages = rtl_languages;
        self
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close the modal and drop its input and output.
    pub fn close(&mut self) {
        self.open = false;
        self.clear();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.output = None;
        self.error = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_input(&mut self, input: &str) {
        self.input = input.to_string();
    }

    pub fn set_target_lang(&mut self, target_lang: &str) {
        self.target_lang = target_lang.to_string();
    }

    pub fn output(&self) -> Option<&RenderedTranslation> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self) -> Option<&RenderedTranslation> {
        self.error = None;
        if self.input.trim().is_empty() {
            return None;
        }

        let result = self.translator.translate_text(&self.input, &self.target_lang, "en").await;
        match result.translation {
            Some(text) => {
                self.output = Some(RenderedTranslation {
                    text,
                    language: self.target_lang.clone(),
                    direction: TextDirection::for_language(&self.target_lang, &self.rtl_languages),
                });
            }
            None => self.error = result.error,
        }
        self.output.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::EchoTranslator;

    #[tokio::test]
    async fn test_submit_and_close() {
        let fake = Arc::new(EchoTranslator::default());
        let mut modal = QuickTranslator::new(fake.clone(), "ar");
        modal.open();
        modal.set_input("robot");

        let output = modal.submit().await.unwrap();
        assert_eq!(output.text, "ar:ROBOT");
        assert_eq!(output.direction, TextDirection::Rtl);

        modal.close();
        assert!(!modal.is_open());
        assert!(modal.output().is_none());
    }

    #[tokio::test]
    async fn test_failure_sets_error_and_keeps_previous_output() {
        let fake = Arc::new(EchoTranslator::default());
        let mut modal = QuickTranslator::new(fake.clone(), "ta");
        modal.set_input("ok");
        modal.submit().await;
        modal.set_input("fail now");
        modal.submit().await;

        assert_eq!(modal.error(), Some("backend said no"));
        assert_eq!(modal.output().unwrap().text, "ta:OK");
    }

    #[tokio::test]
    async fn test_blank_input_ignored() {
        let fake = Arc::new(EchoTranslator::default());
        let mut modal = QuickTranslator::new(fake.clone(), "ur");
        assert!(modal.submit().await.is_none());
        assert!(fake.calls().is_empty());
    }
}
