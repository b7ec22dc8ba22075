//! Structure-preserving tree translation
//!
//! [`TreeTranslator`] visits every leaf of a [`Value`] in key order and
//! replaces each non-empty string with its translation. Keys, nesting and
//! non-string scalars are left untouched. An empty or null leaf aborts the
//! walk with [`GeneratorError::MissingValue`]; nothing after it is
//! translated.
//!
//! # Example
//!
//! ```ignore
//! use lang_generator::mt::{MockMode, MockTranslator};
//! use lang_generator::resource::parse_json;
//! use lang_generator::TreeTranslator;
//!
//! let mock = MockTranslator::new(MockMode::Suffix);
//! let walker = TreeTranslator::new(&mock, "en", "fr");
//! let value = parse_json(r#"{"greeting": "hello"}"#)?;
//! let translated = walker.translate(value).await?;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;

use crate::error::{GeneratorError, Result};
use crate::mt::MachineTranslator;
use crate::resource::{Key, ResourceTree, Value};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Translates resource trees from one language to another
pub struct TreeTranslator<'a> {
    translator: &'a dyn MachineTranslator,
    source: &'a str,
    target: &'a str,
    translated: AtomicUsize,
}

impl<'a> TreeTranslator<'a> {
    pub fn new(translator: &'a dyn MachineTranslator, source: &'a str, target: &'a str) -> Self {
        Self {
            translator,
            source,
            target,
            translated: AtomicUsize::new(0),
        }
    }

    /// Number of strings sent to the translator so far
    pub fn translated_count(&self) -> usize {
        self.translated.load(Ordering::Relaxed)
    }

    /// Translate a value and hand it back with the same shape
    pub async fn translate(&self, mut value: Value) -> Result<Value> {
        self.translate_value(&mut value, String::new()).await?;
        Ok(value)
    }

    /// Translate every entry of a tree in place
    pub async fn translate_tree(&self, tree: &mut ResourceTree) -> Result<()> {
        for (key, value) in tree.iter_mut() {
            self.translate_entry(key, value).await?;
        }
        Ok(())
    }

    /// Translate one top-level entry in place
    pub async fn translate_entry(&self, key: &Key, value: &mut Value) -> Result<()> {
        self.translate_value(value, key.to_string()).await
    }

    /// Recursive step; `path` is the dotted key path of `value`
    pub fn translate_value<'b>(
        &'b self,
        value: &'b mut Value,
        path: String,
    ) -> BoxFuture<'b, Result<()>> {
        Box::pin(async move {
            match value {
                Value::Tree(tree) => {
                    for (key, child) in tree.iter_mut() {
                        let child_path = join_path(&path, key);
                        self.translate_value(child, child_path).await?;
                    }
                }
                Value::Text(text) if !text.is_empty() => {
                    let translated = self
                        .translator
                        .translate(text, self.source, self.target)
                        .await?;
                    debug!(
                        key = %path,
                        source = %text,
                        translated = %translated,
                        target = self.target,
                        "Translated entry"
                    );
                    self.translated.fetch_add(1, Ordering::Relaxed);
                    *text = translated;
                }
                Value::Text(_) | Value::Null => {
                    return Err(GeneratorError::MissingValue {
                        key_path: path,
                        file: None,
                    });
                }
                // Already final, no translation needed
                Value::Number(_) | Value::Bool(_) => {}
            }
            Ok(())
        })
    }
}

/// Find the first empty or null leaf without translating anything
pub fn validate(value: &Value) -> Result<()> {
    validate_at(value, String::new())
}

fn validate_at(value: &Value, path: String) -> Result<()> {
    match value {
        Value::Tree(tree) => {
            for (key, child) in tree.iter() {
                validate_at(child, join_path(&path, key))?;
            }
            Ok(())
        }
        Value::Text(text) if !text.is_empty() => Ok(()),
        Value::Text(_) | Value::Null => Err(GeneratorError::MissingValue {
            key_path: path,
            file: None,
        }),
        Value::Number(_) | Value::Bool(_) => Ok(()),
    }
}

fn join_path(parent: &str, key: &Key) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}
