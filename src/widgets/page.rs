use std::sync::Arc;
use tracing::{debug, warn};

use crate::translate::interface::{RenderedTranslation, TextDirection, Translator};

/// Whole-page translator: translates content paragraph by paragraph.
pub struct PageTranslator {
    translator: Arc<dyn Translator>,
    content: String,
    target_lang: String,
    rtl_languages: Vec<String>,
    translated: Option<String>,
}

/// Non-blank paragraphs of `content`, split on blank lines and trimmed.
pub fn split_paragraphs(content: &str) -> Vec<String> {
    content
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl PageTranslator {
    pub fn new(translator: Arc<dyn Translator>, content: &str) -> Self {
        Self {
            translator,
            content: content.to_string(),
            target_lang: "ur".to_string(),
            rtl_languages: vec!["ur".to_string(), "ar".to_string()],
            translated: None,
        }
    }

    pub fn with_rtl_languages(mut self, rtl_languages: Vec<String>) -> Self {
        self.rtl_languages = rtl_languages;
        self
    }

    /// Dismiss the translated view.
    pub fn close(&mut self) {
        self.translated = None;
    }

    pub fn set_target_lang(&mut self, target_lang: &str) {
        self.target_lang = target_lang.to_string();
    }

    fn direction(&self) -> TextDirection {
        TextDirection::for_language(&self.target_lang, &self.rtl_languages)
    }

    /// Translate every paragraph in order. A paragraph that fails keeps its
    /// original text. Returns `None` for blank content.
    pub async fn translate_page(&mut self) -> Option<RenderedTranslation> {
        if self.content.trim().is_empty() {
            return None;
        }
        self.translated = None;

        let paragraphs = split_paragraphs(&self.content);
        debug!("Translating page of {} paragraphs -> {}", paragraphs.len(), self.target_lang);

        let mut out = Vec::with_capacity(paragraphs.len());
        for paragraph in paragraphs {
            let result = self.translator.translate_text(&paragraph, &self.target_lang, "en").await;
            match result.translation {
                Some(translation) => out.push(translation),
                None => {
                    warn!(
                        "Paragraph translation failed, keeping original: {}",
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                    out.push(paragraph);
                }
            }
        }

        let joined = out.join("\n\n");
        self.translated = Some(joined.clone());
        Some(RenderedTranslation {
            text: joined,
            language: self.target_lang.clone(),
            direction: self.direction(),
        })
    }

    /// The translated page as an HTML fragment carrying the text direction.
    pub fn to_html(&self) -> Option<String> {
        let translated = self.translated.as_ref()?;
        let direction = self.direction();
        let align = match direction {
            TextDirection::Rtl => "right",
            TextDirection::Ltr => "left",
        };
        let body: String = split_paragraphs(translated)
            .iter()
            .map(|p| format!("<p>{}</p>", escape_html(p)))
            .collect();
        Some(format!(
            "<div class=\"translated-content\" style=\"direction: {}; text-align: {};\">{}</div>",
            direction, align, body
        ))
    }
}
