pub mod client;
pub mod debounce;
pub mod history;
pub mod interface;
pub mod languages;

pub use client::TranslationClient;
pub use debounce::LiveTranslator;
pub use interface::{RenderedTranslation, Translator};
pub use languages::LanguageSelector;
