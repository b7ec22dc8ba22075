//! Mock Machine Translator for testing
//!
//! A deterministic, network-free translator for exercising the tree walker
//! and the generator without a translation endpoint.
//!
//! # Example
//!
//! ```ignore
//! use lang_generator::mt::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//!     assert_eq!(mock.call_count(), 1);
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation, falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Simulate API errors
    Error(String),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that records every call it receives
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Build a `Mappings` translator from `(text, target, translation)` triples
    pub fn with_mappings(mappings: &[(&str, &str, &str)]) -> Self {
        let map = mappings
            .iter()
            .map(|(text, target, translation)| {
                ((text.to_string(), target.to_string()), translation.to_string())
            })
            .collect();
        Self::new(MockMode::Mappings(map))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Texts received so far, in call order
    pub fn texts(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.iter().map(|(text, _, _)| text.clone()).collect())
            .unwrap_or_default()
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, _source: &str, target: &str) -> MtResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::NoOp => Ok(text.to_string()),
            MockMode::Error(msg) => Err(MtError::RetriesExhausted {
                attempts: 1,
                last_error: msg.clone(),
            }),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((
                text.to_string(),
                source_locale.to_string(),
                target_locale.to_string(),
            ));
        }
        self.apply_translation(text, source_locale, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "en", "fr").await.unwrap();
        assert_eq!(result, "hello_fr");
    }

    #[tokio::test]
    async fn test_suffix_different_targets() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "hello_fr");
        assert_eq!(mock.translate("hello", "en", "de").await.unwrap(), "hello_de");
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mapping_single_translation() {
        let mock = MockTranslator::with_mappings(&[("hello", "fr", "bonjour")]);
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "bonjour");
        // Unknown mapping falls back to suffix mode
        assert_eq!(mock.translate("hello", "en", "es").await.unwrap(), "hello_es");
    }

    #[tokio::test]
    async fn test_error_mode() {
        let mock = MockTranslator::new(MockMode::Error("service down".to_string()));
        let result = mock.translate("hello", "en", "fr").await;
        assert!(matches!(result, Err(MtError::RetriesExhausted { .. })));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_records_texts_in_order() {
        let mock = MockTranslator::new(MockMode::NoOp);
        mock.translate("one", "en", "fr").await.unwrap();
        mock.translate("two", "en", "fr").await.unwrap();
        assert_eq!(mock.texts(), vec!["one", "two"]);
    }

    #[test]
    fn test_provider_name() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.provider_name(), "Mock Translator");
    }
}
