//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait the tree walker talks
//! to. The production implementation is [`GoogleTranslateProvider`]; tests
//! use [`MockTranslator`].
//!
//! [`GoogleTranslateProvider`]: crate::mt::GoogleTranslateProvider
//! [`MockTranslator`]: crate::mt::MockTranslator
//!
//! # Example
//!
//! ```ignore
//! use lang_generator::mt::{GoogleTranslateProvider, MachineTranslator};
//! use lang_generator::GeneratorConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::new(&GeneratorConfig::default())?;
//!     let result = provider.translate("Hello, world!", "en", "fr").await?;
//!     println!("{}", result); // "Bonjour le monde!"
//!     Ok(())
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use async_trait::async_trait;

/// Translation backend used by the tree walker
///
/// Calls are issued one at a time and awaited before the next leaf is
/// visited, so implementations need no internal synchronisation beyond
/// `Send + Sync`.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate, never empty
    /// * `source_locale` - Source language code (e.g., "en")
    /// * `target_locale` - Target language code (e.g., "fr", "zh-CN")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text, or `text` itself when the
    ///   service had nothing to offer
    /// * `Err(MtError)` - If translation fails
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a translation.
    fn provider_name(&self) -> &str;
}

/// Validate that a locale code is in acceptable format
///
/// Checks that the locale code contains only alphanumeric characters,
/// hyphens, and underscores. Codes are also used as directory and file
/// names, so this keeps them to a single safe path segment.
///
/// # Example
///
/// ```ignore
/// validate_locale("en")?; // OK
/// validate_locale("zh-CN")?; // OK
/// validate_locale("../etc").unwrap_err(); // Error
/// ```
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
