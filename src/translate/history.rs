use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub original: String,
    pub translated: String,
    pub source_lang: String,
    pub target_lang: String,
    pub timestamp: DateTime<Utc>,
}

/// Recent translations, newest first, never longer than `limit`.
#[derive(Debug, Clone)]
pub struct TranslationHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for TranslationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl TranslationHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    pub fn record(&mut self, original: &str, translated: &str, source_lang: &str, target_lang: &str) {
        self.push(HistoryEntry {
            original: original.to_string(),
            translated: translated.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.limit == 0 {
            return;
        }
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eleventh_entry_evicts_oldest() {
        let mut history = TranslationHistory::default();
        for i in 0..11 {
            history.record(&format!("text {}", i), &format!("ترجمہ {}", i), "en", "ur");
        }

        assert_eq!(history.len(), 10);
        assert_eq!(history.latest().unwrap().original, "text 10");
        let originals: Vec<&str> = history.entries().map(|e| e.original.as_str()).collect();
        assert_eq!(originals.last(), Some(&"text 1"));
        assert!(!originals.contains(&"text 0"));
    }

    #[test]
    fn test_newest_first_under_limit() {
        let mut history = TranslationHistory::new(3);
        history.record("a", "A", "en", "hi");
        history.record("b", "B", "en", "hi");

        let originals: Vec<&str> = history.entries().map(|e| e.original.as_str()).collect();
        assert_eq!(originals, vec!["b", "a"]);
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = TranslationHistory::new(0);
        history.record("a", "A", "en", "hi");
        assert!(history.is_empty());
    }

    #[test]
    fn test_huge_limit_does_not_preallocate() {
        let mut history = TranslationHistory::new(usize::MAX);
        for i in 0..12 {
            history.record(&format!("text {}", i), "t", "en", "ur");
        }
        assert_eq!(history.len(), 12);
        assert_eq!(history.latest().unwrap().original, "text 11");

        let mut capped = TranslationHistory::new(1_000_000_000);
        capped.record("a", "A", "en", "ur");
        capped.record("b", "B", "en", "ur");
        assert_eq!(capped.len(), 2);
    }
}
