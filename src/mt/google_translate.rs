//! Google Translate provider for machine translation
//!
//! Talks to the keyless `translate_a/single` endpoint used by the browser
//! extension (`client=gtx`). One GET per string:
//!
//! ```text
//! GET <endpoint>?client=gtx&sl=en&tl=fr&dt=t&q=Hello.%20Goodbye.
//! ```
//!
//! The response is a JSON array whose first element lists translated
//! segments; each segment starts with a text fragment:
//!
//! ```text
//! [[["Bonjour. ","Hello. ",null,null,10],["Au revoir.","Goodbye.",null,null,10]],null,"en"]
//! ```
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
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, warn};

use crate::config::GeneratorConfig;
use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::{MachineTranslator, validate_locale};

/// Google Translate (gtx) provider
///
/// Retries failed requests a fixed number of times with a fixed pause.
/// Holds no state between calls apart from the pooled HTTP client.
#[derive(Debug, Clone)]
pub struct GoogleTranslateProvider {
    /// HTTP client for async requests
    client: reqwest::Client,
    endpoint: Url,
    /// Total attempts per string
    retry_attempts: u32,
    retry_interval: Duration,
}

impl GoogleTranslateProvider {
    /// Create a provider from the endpoint, retry and timeout settings
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If the endpoint is not a URL, the attempt count is
    ///   zero, or the HTTP client cannot be built
    pub fn new(config: &GeneratorConfig) -> MtResult<Self> {
        let endpoint = Url::parse(config.api_endpoint.trim()).map_err(|e| {
            MtError::ConfigError(format!(
                "Invalid API endpoint '{}': {}",
                config.api_endpoint, e
            ))
        })?;

        if config.retry_attempts == 0 {
            return Err(MtError::ConfigError(
                "retry_attempts must be at least 1".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            retry_attempts: config.retry_attempts,
            retry_interval: Duration::from_millis(config.retry_interval_ms),
        })
    }

    fn request_url(&self, text: &str, source_locale: &str, target_locale: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client", "gtx")
            .append_pair("sl", source_locale)
            .append_pair("tl", target_locale)
            .append_pair("dt", "t")
            .append_pair("q", text);
        url
    }

    /// Send the request, retrying on transport errors and non-success
    /// statuses until the attempt budget is spent
    async fn fetch_with_retry(&self, url: &Url) -> MtResult<String> {
        let mut last_error = String::new();

        for attempt in 1..=self.retry_attempts {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    warn!(
                        attempt,
                        attempts = self.retry_attempts,
                        error = %err,
                        "Translation request failed"
                    );
                    last_error = err.to_string();
                    if attempt < self.retry_attempts {
                        tokio::time::sleep(self.retry_interval).await;
                    }
                }
            }
        }

        Err(MtError::RetriesExhausted {
            attempts: self.retry_attempts,
            last_error,
        })
    }

    async fn fetch_once(&self, url: &Url) -> MtResult<String> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MtError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

/// Concatenate the text fragments of a gtx response
///
/// Anything that does not have the expected shape contributes nothing, so
/// a malformed body yields an empty string.
pub fn extract_translation(body: &str) -> String {
    let json: serde_json::Value = match serde_json::from_str(body) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Translation response is not JSON");
            return String::new();
        }
    };

    json[0]
        .as_array()
        .map(|segments| {
            segments
                .iter()
                .filter_map(|segment| segment[0].as_str())
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;

        if text.is_empty() {
            return Err(MtError::TranslationError(
                "Cannot translate an empty string".to_string(),
            ));
        }

        let url = self.request_url(text, source_locale, target_locale);
        let body = self.fetch_with_retry(&url).await?;
        let translated = extract_translation(&body);

        if translated.is_empty() {
            warn!(text, "Empty translation returned, keeping source text");
            return Ok(text.to_string());
        }

        debug!(source = text, translated = %translated, "Translated");
        Ok(translated)
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubServer, unreachable_url};

    fn config(endpoint: &str, attempts: u32) -> GeneratorConfig {
        GeneratorConfig {
            api_endpoint: endpoint.to_string(),
            retry_attempts: attempts,
            retry_interval_ms: 1,
            request_timeout_secs: 5,
            ..GeneratorConfig::default()
        }
    }

    // ========== Initialization Tests ==========

    #[test]
    fn test_new_with_defaults() {
        let provider = GoogleTranslateProvider::new(&GeneratorConfig::default()).unwrap();
        assert_eq!(provider.provider_name(), "Google Translate");
        assert_eq!(provider.retry_attempts, 3);
        assert_eq!(provider.retry_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_new_with_invalid_endpoint() {
        match GoogleTranslateProvider::new(&config("not a url", 3)) {
            Err(MtError::ConfigError(msg)) => assert!(msg.contains("Invalid API endpoint")),
            _ => panic!("Expected ConfigError"),
        }
    }

    #[test]
    fn test_new_with_zero_attempts() {
        let result = GoogleTranslateProvider::new(&config("http://localhost/t", 0));
        assert!(matches!(result, Err(MtError::ConfigError(_))));
    }

    #[test]
    fn test_request_url_parameters() {
        let provider =
            GoogleTranslateProvider::new(&config("http://localhost/translate_a/single", 1)).unwrap();
        let url = provider.request_url("Hello & goodbye", "en", "fr");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("client".to_string(), "gtx".to_string()),
                ("sl".to_string(), "en".to_string()),
                ("tl".to_string(), "fr".to_string()),
                ("dt".to_string(), "t".to_string()),
                ("q".to_string(), "Hello & goodbye".to_string()),
            ]
        );
    }

    // ========== Response Parsing Tests ==========

    #[test]
    fn test_extract_concatenates_segments() {
        let body = r#"[[["Bonjour. ","Hello. ",null,null,10],["Au revoir.","Goodbye.",null,null,10]],null,"en"]"#;
        assert_eq!(extract_translation(body), "Bonjour. Au revoir.");
    }

    #[test]
    fn test_extract_skips_segments_without_text() {
        let body = r#"[[["Hola",null],[null,"x"],["!","!"]],null,"en"]"#;
        assert_eq!(extract_translation(body), "Hola!");
    }

    #[test]
    fn test_extract_missing_segments() {
        assert_eq!(extract_translation(r#"[null,null,"en"]"#), "");
        assert_eq!(extract_translation("[]"), "");
        assert_eq!(extract_translation("<html>"), "");
    }

    // ========== Validation Tests ==========

    #[tokio::test]
    async fn test_translate_empty_text() {
        let provider = GoogleTranslateProvider::new(&config(&unreachable_url(), 1)).unwrap();
        let result = provider.translate("", "en", "fr").await;
        assert!(matches!(result, Err(MtError::TranslationError(_))));
    }

    #[tokio::test]
    async fn test_translate_invalid_target_locale() {
        let provider = GoogleTranslateProvider::new(&config(&unreachable_url(), 1)).unwrap();
        let result = provider.translate("hello", "en", "fr/../x").await;
        assert!(matches!(result, Err(MtError::InvalidLocale(_))));
    }

    // ========== Stub Endpoint Tests ==========

    #[tokio::test]
    async fn test_translate_against_stub() {
        let server = StubServer::start(&[("Hello", "Bonjour")], 0).await;
        let provider = GoogleTranslateProvider::new(&config(&server.url, 3)).unwrap();

        let result = provider.translate("Hello", "en", "fr").await.unwrap();
        assert_eq!(result, "Bonjour");

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].get("client").map(String::as_str), Some("gtx"));
        assert_eq!(requests[0].get("sl").map(String::as_str), Some("en"));
        assert_eq!(requests[0].get("tl").map(String::as_str), Some("fr"));
        assert_eq!(requests[0].get("dt").map(String::as_str), Some("t"));
        assert_eq!(requests[0].get("q").map(String::as_str), Some("Hello"));
    }

    #[tokio::test]
    async fn test_translate_multi_segment_response() {
        let server =
            StubServer::start(&[("Hello. Goodbye.", "Bonjour. Au revoir.")], 0).await;
        let provider = GoogleTranslateProvider::new(&config(&server.url, 1)).unwrap();
        let result = provider.translate("Hello. Goodbye.", "en", "fr").await.unwrap();
        assert_eq!(result, "Bonjour. Au revoir.");
    }

    #[tokio::test]
    async fn test_empty_result_falls_back_to_source() {
        let server = StubServer::start(&[], 0).await;
        let provider = GoogleTranslateProvider::new(&config(&server.url, 1)).unwrap();
        let result = provider.translate("Untranslatable", "en", "fr").await.unwrap();
        assert_eq!(result, "Untranslatable");
    }

    #[tokio::test]
    async fn test_retry_recovers_before_limit() {
        let server = StubServer::start(&[("Hello", "Hallo")], 2).await;
        let provider = GoogleTranslateProvider::new(&config(&server.url, 3)).unwrap();
        let result = provider.translate("Hello", "en", "de").await.unwrap();
        assert_eq!(result, "Hallo");
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let server = StubServer::start(&[("Hello", "Hallo")], 3).await;
        let provider = GoogleTranslateProvider::new(&config(&server.url, 3)).unwrap();
        match provider.translate("Hello", "en", "de").await {
            Err(MtError::RetriesExhausted {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 3);
                assert!(last_error.contains("500"));
            }
            other => panic!("Expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(server.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_connection_refused_is_retried_then_fatal() {
        let provider = GoogleTranslateProvider::new(&config(&unreachable_url(), 2)).unwrap();
        match provider.translate("Hello", "en", "de").await {
            Err(MtError::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("Expected RetriesExhausted, got {:?}", other),
        }
    }

    // ========== Integration Tests (require network access) ==========

    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_real_api_single_translation() {
        let provider = GoogleTranslateProvider::new(&GeneratorConfig::default()).unwrap();
        let result = provider.translate("Hello", "en", "fr").await.unwrap();
        println!("Translation: {} → {}", "Hello", result);
        assert!(!result.is_empty());
    }
}
