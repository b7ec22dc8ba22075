//! Generator configuration
//!
//! Settings come from, in increasing priority: built-in defaults, a TOML
//! file (`--config <path>`, or `lang-generator.toml` in the working
//! directory when present), and `LANG_GENERATOR_*` environment variables.
//!
//! ```toml
//! api_endpoint = "https://translate.googleapis.com/translate_a/single"
//! retry_attempts = 3
//! retry_interval_ms = 100
//! request_timeout_secs = 30
//! progress_bar_format = " %current%/%max% [%bar%] %percent:3s%% -- %message%"
//! lang_path = "lang"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GeneratorError, Result};

/// File picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "lang-generator.toml";

fn default_api_endpoint() -> String {
    "https://translate.googleapis.com/translate_a/single".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_interval_ms() -> u64 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_progress_bar_format() -> String {
    " %current%/%max% [%bar%] %percent:3s%% -- %message%".to_string()
}

fn default_lang_path() -> PathBuf {
    PathBuf::from("lang")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Translation endpoint queried with `client=gtx`
    #[serde(default = "default_api_endpoint")]
    pub api_endpoint: String,
    /// Total number of attempts per string, first try included
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Pause between attempts
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_progress_bar_format")]
    pub progress_bar_format: String,
    /// Root holding `<lang>/` directories and `<lang>.json` dictionaries
    #[serde(default = "default_lang_path")]
    pub lang_path: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_api_endpoint(),
            retry_attempts: default_retry_attempts(),
            retry_interval_ms: default_retry_interval_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            progress_bar_format: default_progress_bar_format(),
            lang_path: default_lang_path(),
        }
    }
}

impl GeneratorConfig {
    /// Load the configuration
    ///
    /// An explicit `path` must exist. Without one, `lang-generator.toml` in
    /// the working directory is used if present. Environment overrides are
    /// applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| GeneratorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
            .map_err(|e| GeneratorError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Override individual fields from `LANG_GENERATOR_*` variables
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(endpoint) = lookup("LANG_GENERATOR_API_ENDPOINT") {
            self.api_endpoint = endpoint;
        }
        if let Some(attempts) = lookup("LANG_GENERATOR_RETRY_ATTEMPTS") {
            self.retry_attempts = parse_var("LANG_GENERATOR_RETRY_ATTEMPTS", &attempts)?;
        }
        if let Some(interval) = lookup("LANG_GENERATOR_RETRY_INTERVAL_MS") {
            self.retry_interval_ms = parse_var("LANG_GENERATOR_RETRY_INTERVAL_MS", &interval)?;
        }
        if let Some(timeout) = lookup("LANG_GENERATOR_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_var("LANG_GENERATOR_REQUEST_TIMEOUT_SECS", &timeout)?;
        }
        if let Some(format) = lookup("LANG_GENERATOR_PROGRESS_BAR_FORMAT") {
            self.progress_bar_format = format;
        }
        if let Some(path) = lookup("LANG_GENERATOR_LANG_PATH") {
            self.lang_path = PathBuf::from(path);
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GeneratorError::Config(format!("{} has an invalid value: {}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_interval_ms, 100);
        assert_eq!(config.lang_path, PathBuf::from("lang"));
        assert!(config.api_endpoint.starts_with("https://translate.googleapis.com"));
        assert!(config.progress_bar_format.contains("%message%"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GeneratorConfig::from_toml("retry_attempts = 5\nlang_path = \"resources/lang\"").unwrap();
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.lang_path, PathBuf::from("resources/lang"));
        assert_eq!(config.retry_interval_ms, 100);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(GeneratorConfig::from_toml("retry_attempts = \"many\"").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "api_endpoint = \"http://localhost:9000/t\"\n").unwrap();
        let config = GeneratorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.api_endpoint, "http://localhost:9000/t");
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = GeneratorConfig::load(Some(Path::new("/nonexistent/lang-generator.toml")));
        assert!(matches!(result, Err(GeneratorError::Io { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("LANG_GENERATOR_RETRY_ATTEMPTS", "7"),
            ("LANG_GENERATOR_RETRY_INTERVAL_MS", " 250 "),
            ("LANG_GENERATOR_LANG_PATH", "i18n"),
        ]);
        let mut config = GeneratorConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.retry_attempts, 7);
        assert_eq!(config.retry_interval_ms, 250);
        assert_eq!(config.lang_path, PathBuf::from("i18n"));
    }

    #[test]
    fn test_env_override_invalid_number() {
        let mut config = GeneratorConfig::default();
        let result = config.apply_overrides(|name| {
            (name == "LANG_GENERATOR_RETRY_ATTEMPTS").then(|| "lots".to_string())
        });
        match result {
            Err(GeneratorError::Config(msg)) => assert!(msg.contains("RETRY_ATTEMPTS")),
            _ => panic!("Expected Config error"),
        }
    }
}
