//! Trigger widgets: thin front-ends that call a [`Translator`] and keep only
//! visibility and input state.

pub mod button;
pub mod page;
pub mod quick;
pub mod workspace;

pub use button::TranslateButton;
pub use page::PageTranslator;
pub use quick::QuickTranslator;
pub use workspace::TranslateWorkspace;

use crate::translate::interface::{TranslationResult, Translator};

pub const GENERAL_DOMAIN: &str = "general";

/// Pick the endpoint for a request: a non-empty context wins, then a
/// non-general domain, then plain translation.
pub async fn route_translation(
    translator: &dyn Translator,
    text: &str,
    target_lang: &str,
    source_lang: &str,
    domain: Option<&str>,
    context: Option<&str>,
) -> TranslationResult {
    if let Some(context) = context.filter(|c| !c.trim().is_empty()) {
        return translator.translate_with_context(text, target_lang, context).await;
    }
    if let Some(domain) = domain.filter(|d| !d.trim().is_empty() && *d != GENERAL_DOMAIN) {
        return translator.translate_technical(text, target_lang, domain).await;
    }
    translator.translate_text(text, target_lang, source_lang).await
}
