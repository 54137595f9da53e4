use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::interface::{RenderedTranslation, TextDirection, Translator};

/// Called with `(original, translated)` after a fresh translation is applied.
pub type UpdateCallback = Arc<dyn Fn(&str, &str) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    /// No settle timer pending.
    Idle,
    /// A settle timer is running and will issue a request when it fires.
    Armed,
}

#[derive(Debug, Default)]
struct LiveView {
    translated: String,
    is_translating: bool,
    armed: bool,
    latest_seq: u64,
}

/// Live translator for free-typed text with a trailing-edge debounce.
///
/// Every edit restarts the settle timer; only a timer that runs out issues a
/// request, for the text current at that moment. Requests are numbered and a
/// response is applied only while its number is the latest one issued.
/// Must be driven from inside a tokio runtime.
pub struct LiveTranslator {
    translator: Arc<dyn Translator>,
    target_lang: String,
    source_lang: String,
    settle: Duration,
    rtl_languages: Vec<String>,
    text: String,
    enabled: bool,
    view: Arc<Mutex<LiveView>>,
    timer: Option<JoinHandle<()>>,
    on_update: Option<UpdateCallback>,
}

fn lock(view: &Mutex<LiveView>) -> MutexGuard<'_, LiveView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LiveTranslator {
    pub fn new(translator: Arc<dyn Translator>, target_lang: &str, settle: Duration) -> Self {
        Self {
            translator,
            target_lang: target_lang.to_string(),
            source_lang: "en".to_string(),
            settle,
            rtl_languages: vec!["ur".to_string(), "ar".to_string()],
            text: String::new(),
            enabled: true,
            view: Arc::new(Mutex::new(LiveView::default())),
            timer: None,
            on_update: None,
        }
    }

    pub fn with_source_lang(mut self, source_lang: &str) -> Self {
        self.source_lang = source_lang.to_string();
        self
    }

    pub fn with_rtl_languages(mut self, rtl_languages: Vec<String>) -> Self {
        self.rtl_languages = rtl_languages;
        self
    }

    pub fn on_update(mut self, callback: UpdateCallback) -> Self {
        self.on_update = Some(callback);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self) -> DebounceState {
        if lock(&self.view).armed {
            DebounceState::Armed
        } else {
            DebounceState::Idle
        }
    }

    pub fn translated_text(&self) -> String {
        lock(&self.view).translated.clone()
    }

    /// True from the first keystroke until the latest request resolves.
    pub fn is_translating(&self) -> bool {
        lock(&self.view).is_translating
    }

    pub fn rendered(&self) -> Option<RenderedTranslation> {
        let translated = self.translated_text();
        if translated.is_empty() {
            return None;
        }
        Some(RenderedTranslation {
            text: translated,
            language: self.target_lang.clone(),
            direction: TextDirection::for_language(&self.target_lang, &self.rtl_languages),
        })
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.rearm();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.rearm();
    }

    pub fn toggle(&mut self) {
        self.set_enabled(!self.enabled);
    }

    pub fn set_target_lang(&mut self, target_lang: &str) {
        self.target_lang = target_lang.to_string();
        self.rearm();
    }

    pub fn clear(&mut self) {
        self.set_text("");
    }

    fn cancel_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
        lock(&self.view).armed = false;
    }

    fn rearm(&mut self) {
        self.cancel_timer();

        if !self.enabled || self.text.trim().is_empty() {
            let mut view = lock(&self.view);
            view.translated.clear();
            view.is_translating = false;
            // Responses still in flight belong to text that is gone.
            view.latest_seq += 1;
            return;
        }

        {
            let mut view = lock(&self.view);
            view.armed = true;
            view.is_translating = true;
        }
        debug!("Live translation armed for {:?}", self.settle);

        let translator = self.translator.clone();
        let view = self.view.clone();
        let on_update = self.on_update.clone();
        let text = self.text.clone();
        let target_lang = self.target_lang.clone();
        let source_lang = self.source_lang.clone();
        let settle = self.settle;

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(settle).await;

            let seq = {
                let mut view = lock(&view);
                view.armed = false;
                view.latest_seq += 1;
                view.latest_seq
            };
            debug!("Live translation fired (request #{})", seq);

            // The request outlives the timer: re-arming must not cancel it.
            tokio::spawn(async move {
                let result = translator.translate_text(&text, &target_lang, &source_lang).await;

                let mut guard = lock(&view);
                if guard.latest_seq != seq {
                    debug!("Dropping stale live translation #{}", seq);
                    return;
                }
                guard.is_translating = guard.armed;

                if let (true, Some(translated)) = (result.success, result.translation) {
                    guard.translated = translated.clone();
                    drop(guard);
                    if let Some(callback) = on_update {
                        callback(&text, &translated);
                    }
                }
            });
        }));
    }
}

impl Drop for LiveTranslator {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
        lock(&self.view).latest_seq += 1;
    }
}
