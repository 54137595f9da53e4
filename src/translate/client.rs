use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use crate::backend_service::{
    BackendClient, TranslateBatchRequest, TranslateContextRequest, TranslateRequest,
    TranslateTechnicalRequest,
};
use super::interface::{TranslationResult, Translator, EMPTY_TEXT_ERROR};

const DEFAULT_SOURCE_LANG: &str = "en";

/// Single point of contact with the translation endpoints.
///
/// Every call hands back its own result. The shared status (`is_loading`,
/// `last_error`) is only a summary for consumers that poll it: loading is an
/// in-flight counter, and the error is whatever the most recent failure said.
pub struct TranslationClient {
    backend: Arc<BackendClient>,
    in_flight: AtomicUsize,
    last_error: Mutex<Option<String>>,
}

/// Keeps the in-flight counter raised for the lifetime of one request,
/// including when the request future is dropped early.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn start(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TranslationClient {
    pub fn new(backend: Arc<BackendClient>) -> Self {
        debug!("Translation client bound to {}", backend.base_url());
        Self {
            backend,
            in_flight: AtomicUsize::new(0),
            last_error: Mutex::new(None),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_error(&self, error: Option<String>) {
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = error;
    }

    fn blank(text: &str) -> bool {
        text.trim().is_empty()
    }

    pub async fn translate_text(&self, text: &str, target_lang: &str, source_lang: &str) -> TranslationResult {
        if Self::blank(text) {
            return TranslationResult::failed(text, source_lang, target_lang, EMPTY_TEXT_ERROR.to_string());
        }

        let _loading = LoadingGuard::start(&self.in_flight);
        self.set_error(None);

        let request = TranslateRequest {
            text: text.to_string(),
            target_language: target_lang.to_string(),
            source_language: source_lang.to_string(),
        };
        debug!("Translating {} chars {} -> {}", text.chars().count(), source_lang, target_lang);

        match self.backend.translate(&request).await {
            Ok(raw) => self.finish(raw.normalize(text, source_lang, target_lang)),
            Err(e) => self.fail(text, source_lang, target_lang, e.user_message("Translation failed")),
        }
    }

    /// Translate many texts in one request. The output always lines up with
    /// `texts`: blank entries are never sent and come back as failures in place.
    pub async fn translate_batch(
        &self,
        texts: &[String],
        target_lang: &str,
        source_lang: &str,
    ) -> Vec<TranslationResult> {
        let mut slots: Vec<Option<TranslationResult>> = texts
            .iter()
            .map(|t| {
                Self::blank(t).then(|| {
                    TranslationResult::failed(t, source_lang, target_lang, EMPTY_TEXT_ERROR.to_string())
                })
            })
            .collect();

        let pending: Vec<usize> = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(i, _)| i)
            .collect();

        if pending.is_empty() {
            return slots.into_iter().flatten().collect();
        }

        let _loading = LoadingGuard::start(&self.in_flight);
        self.set_error(None);

        let request = TranslateBatchRequest {
            texts: pending.iter().map(|&i| texts[i].clone()).collect(),
            target_language: target_lang.to_string(),
            source_language: source_lang.to_string(),
        };
        debug!("Translating batch of {} texts -> {}", request.texts.len(), target_lang);

        match self.backend.translate_batch(&request).await {
            Ok(response) => {
                let mut returned = response.results.into_iter();
                for &i in &pending {
                    let result = match returned.next() {
                        Some(raw) => raw.normalize(&texts[i], source_lang, target_lang),
                        None => TranslationResult::failed(
                            &texts[i],
                            source_lang,
                            target_lang,
                            "Missing result in batch response".to_string(),
                        ),
                    };
                    slots[i] = Some(result);
                }
                if let Some(first_error) = slots
                    .iter()
                    .flatten()
                    .filter(|r| !r.success && r.error() != Some(EMPTY_TEXT_ERROR))
                    .find_map(|r| r.error.clone())
                {
                    self.set_error(Some(first_error));
                }
            }
            Err(e) => {
                let message = e.user_message("Batch translation failed");
                warn!("Batch translation failed: {}", message);
                self.set_error(Some(message.clone()));
                for &i in &pending {
                    slots[i] = Some(TranslationResult::failed(
                        &texts[i],
                        source_lang,
                        target_lang,
                        message.clone(),
                    ));
                }
            }
        }

        slots.into_iter().flatten().collect()
    }

    pub async fn translate_technical(&self, text: &str, target_lang: &str, domain: &str) -> TranslationResult {
        if Self::blank(text) {
            return TranslationResult::failed(text, DEFAULT_SOURCE_LANG, target_lang, EMPTY_TEXT_ERROR.to_string());
        }

        let _loading = LoadingGuard::start(&self.in_flight);
        self.set_error(None);

        let request = TranslateTechnicalRequest {
            text: text.to_string(),
            target_language: target_lang.to_string(),
            domain: domain.to_string(),
        };
        debug!("Technical translation ({}) -> {}", domain, target_lang);

        match self.backend.translate_technical(&request).await {
            Ok(raw) => self.finish(raw.normalize(text, DEFAULT_SOURCE_LANG, target_lang)),
            Err(e) => self.fail(
                text,
                DEFAULT_SOURCE_LANG,
                target_lang,
                e.user_message("Technical translation failed"),
            ),
        }
    }

    pub async fn translate_with_context(&self, text: &str, target_lang: &str, context: &str) -> TranslationResult {
        if Self::blank(text) {
            return TranslationResult::failed(text, DEFAULT_SOURCE_LANG, target_lang, EMPTY_TEXT_ERROR.to_string());
        }

        let _loading = LoadingGuard::start(&self.in_flight);
        self.set_error(None);

        let request = TranslateContextRequest {
            text: text.to_string(),
            target_language: target_lang.to_string(),
            context: context.to_string(),
        };
        debug!("Context translation -> {}", target_lang);

        match self.backend.translate_with_context(&request).await {
            Ok(raw) => self.finish(raw.normalize(text, DEFAULT_SOURCE_LANG, target_lang)),
            Err(e) => self.fail(
                text,
                DEFAULT_SOURCE_LANG,
                target_lang,
                e.user_message("Context translation failed"),
            ),
        }
    }

    /// Supported languages, or an empty map when the backend can't be reached.
    pub async fn get_supported_languages(&self) -> BTreeMap<String, String> {
        match self.backend.supported_languages().await {
            Ok(response) => response.languages,
            Err(e) => {
                let message = e.user_message("Failed to fetch languages");
                warn!("Failed to fetch languages: {}", message);
                self.set_error(Some(message));
                BTreeMap::new()
            }
        }
    }

    pub async fn get_cache_stats(&self) -> Option<serde_json::Value> {
        match self.backend.cache_stats().await {
            Ok(response) => response.stats,
            Err(e) => {
                let message = e.user_message("Failed to fetch cache stats");
                warn!("Failed to fetch cache stats: {}", message);
                self.set_error(Some(message));
                None
            }
        }
    }

    pub async fn clear_cache(&self) {
        if let Err(e) = self.backend.clear_cache().await {
            let message = e.user_message("Failed to clear cache");
            warn!("Failed to clear cache: {}", message);
            self.set_error(Some(message));
        }
    }

    fn finish(&self, result: TranslationResult) -> TranslationResult {
        if let Some(error) = result.error() {
            warn!("Backend reported translation failure: {}", error);
            self.set_error(Some(error.to_string()));
        }
        result
    }

    fn fail(&self, text: &str, source_lang: &str, target_lang: &str, message: String) -> TranslationResult {
        warn!("Translation request failed: {}", message);
        self.set_error(Some(message.clone()));
        TranslationResult::failed(text, source_lang, target_lang, message)
    }
}

#[async_trait]
impl Translator for TranslationClient {
    async fn translate_text(&self, text: &str, target_lang: &str, source_lang: &str) -> TranslationResult {
        TranslationClient::translate_text(self, text, target_lang, source_lang).await
    }

    async fn translate_technical(&self, text: &str, target_lang: &str, domain: &str) -> TranslationResult {
        TranslationClient::translate_technical(self, text, target_lang, domain).await
    }

    async fn translate_with_context(&self, text: &str, target_lang: &str, context: &str) -> TranslationResult {
        TranslationClient::translate_with_context(self, text, target_lang, context).await
    }

    async fn supported_languages(&self) -> BTreeMap<String, String> {
        self.get_supported_languages().await
    }

    fn is_loading(&self) -> bool {
        TranslationClient::is_loading(self)
    }
}
