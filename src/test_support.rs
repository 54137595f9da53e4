//! Mock backend and translator doubles shared by tests.

use async_trait::async_trait;
use axum::Router;
use std::collections::BTreeMap;

use crate::translate::interface::{TranslationResult, Translator};

/// Serve `app` on an ephemeral local port and return its base URL.
pub async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL of a local port with nothing listening on it.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// Translator double: records `route:text` per call, answers `<lang>:<TEXT>`,
/// and fails any text containing "fail".
#[derive(Default)]
pub struct EchoTranslator {
    pub calls: std::sync::Mutex<Vec<String>>,
}

impl EchoTranslator {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer(&self, route: &str, text: &str, target_lang: &str, source_lang: &str) -> TranslationResult {
        self.calls.lock().unwrap().push(format!("{}:{}", route, text));
        if text.contains("fail") {
            TranslationResult::failed(text, source_lang, target_lang, "backend said no".to_string())
        } else {
            TranslationResult::succeeded(
                text,
                format!("{}:{}", target_lang, text.to_uppercase()),
                source_lang,
                target_lang,
                false,
            )
        }
    }
}

#[async_trait]
impl Translator for EchoTranslator {
    async fn translate_text(&self, text: &str, target_lang: &str, source_lang: &str) -> TranslationResult {
        self.answer("text", text, target_lang, source_lang)
    }

    async fn translate_technical(&self, text: &str, target_lang: &str, domain: &str) -> TranslationResult {
        self.answer(&format!("technical[{}]", domain), text, target_lang, "en")
    }

    async fn translate_with_context(&self, text: &str, target_lang: &str, context: &str) -> TranslationResult {
        self.answer(&format!("context[{}]", context), text, target_lang, "en")
    }

    async fn supported_languages(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("en".to_string(), "English".to_string()),
            ("ur".to_string(), "Urdu".to_string()),
            ("hi".to_string(), "Hindi".to_string()),
        ])
    }
}
