use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::auth::AuthSession;
use crate::backend_service::BackendClient;
use crate::chat::ChatSession;
use crate::config::Config;
use crate::translate::{LanguageSelector, LiveTranslator, TranslationClient, Translator};
use crate::widgets::{PageTranslator, QuickTranslator, TranslateButton, TranslateWorkspace};

/// Everything built once at startup and handed to consumers by handle.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Arc<BackendClient>,
    pub translator: Arc<TranslationClient>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let backend = Arc::new(BackendClient::from_config(&config.backend)?);
        let translator = Arc::new(TranslationClient::new(backend.clone()));
        info!("Backend at {}", backend.base_url());

        Ok(Self {
            config,
            backend,
            translator,
        })
    }

    fn shared_translator(&self) -> Arc<dyn Translator> {
        self.translator.clone()
    }

    fn rtl_languages(&self) -> Vec<String> {
        self.config.translation.rtl_languages.clone()
    }

    pub fn live_translator(&self, target_lang: &str) -> LiveTranslator {
        let translation = &self.config.translation;
        LiveTranslator::new(
            self.shared_translator(),
            target_lang,
            Duration::from_millis(translation.debounce_ms),
        )
        .with_source_lang(&translation.default_source_language)
        .with_rtl_languages(self.rtl_languages())
    }

    pub fn translate_button(&self, text: &str, target_lang: &str) -> TranslateButton {
        TranslateButton::new(self.shared_translator(), text, target_lang)
            .with_source_lang(&self.config.translation.default_source_language)
            .with_rtl_languages(self.rtl_languages())
    }

    pub fn page_translator(&self, content: &str) -> PageTranslator {
        PageTranslator::new(self.shared_translator(), content).with_rtl_languages(self.rtl_languages())
    }

    pub fn quick_translator(&self) -> QuickTranslator {
        QuickTranslator::new(
            self.shared_translator(),
            &self.config.translation.default_target_language,
        )
        .with_rtl_languages(self.rtl_languages())
    }

    pub fn workspace(&self) -> TranslateWorkspace {
        let translation = &self.config.translation;
        TranslateWorkspace::new(
            self.shared_translator(),
            &translation.default_source_language,
            &translation.default_target_language,
            translation.history_limit,
        )
        .with_rtl_languages(self.rtl_languages())
    }

    pub fn language_selector(&self, selected: &str) -> LanguageSelector {
        LanguageSelector::new(self.shared_translator(), selected)
    }

    pub fn chat_session(&self) -> ChatSession {
        ChatSession::new(self.backend.clone(), &self.config.chat.background)
    }

    pub fn auth_session(&self) -> AuthSession {
        AuthSession::new(self.backend.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumers_share_one_client() {
        let state = AppState::new(Config::default()).unwrap();
        let _button = state.translate_button("hi", "ur");
        let _modal = state.quick_translator();
        // state + two widgets
        assert_eq!(Arc::strong_count(&state.translator), 3);
    }

    #[test]
    fn test_workspace_uses_configured_languages() {
        let mut config = Config::default();
        config.translation.default_target_language = "hi".to_string();
        let state = AppState::new(config).unwrap();

        let workspace = state.workspace();
        assert_eq!(workspace.source_lang, "en");
        assert_eq!(workspace.target_lang, "hi");
    }
}
