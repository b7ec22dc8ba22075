//! Resource tree model shared by the serializers and the translation walker
//!
//! A language resource is a nested, ordered mapping from string or integer
//! keys to leaf values. Order matters: translated files are written back with
//! their entries in exactly the order they were read.
//!
//! # Example
//!
//! ```ignore
//! use lang_generator::resource::{Key, ResourceTree, Value};
//!
//! let mut nested = ResourceTree::new();
//! nested.insert("farewell", "bye");
//!
//! let mut tree = ResourceTree::new();
//! tree.insert("greeting", "hello");
//! tree.insert("nested", nested);
//!
//! assert_eq!(tree.get(&Key::from("greeting")), Some(&Value::from("hello")));
//! ```

pub mod json;
pub mod lang_file;

use std::fmt;

pub use json::{parse_json, render_json};
pub use lang_file::{Envelope, LangFile, ParseError, parse, render};

/// Key of a single resource entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// Quoted key: `'title' => ...`
    Str(String),
    /// Bare integer key: `0 => ...`
    Int(i64),
}

impl Key {
    /// Key for a string used as an array key: canonical decimal integers
    /// (`"0"`, `"42"`, `"-7"`) become integer keys, as PHP arrays store them;
    /// everything else (`"007"`, `"-0"`, `"1.5"`) stays a string key.
    pub fn from_array_key(key: String) -> Key {
        let digits = key.strip_prefix('-').unwrap_or(&key);
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'))
            && key != "-0";
        match key.parse::<i64>() {
            Ok(n) if canonical => Key::Int(n),
            _ => Key::Str(key),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{}", s),
            Key::Int(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_string())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<i64> for Key {
    fn from(value: i64) -> Self {
        Key::Int(value)
    }
}

/// A node of a resource tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Translatable string leaf
    Text(String),
    /// Numeric leaf, passed through untranslated
    Number(serde_json::Number),
    /// Boolean leaf, passed through untranslated
    Bool(bool),
    /// Absent value; rejected by the translator
    Null,
    /// Nested structure
    Tree(ResourceTree),
}

impl Value {
    pub fn as_tree(&self) -> Option<&ResourceTree> {
        match self {
            Value::Tree(tree) => Some(tree),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<ResourceTree> for Value {
    fn from(value: ResourceTree) -> Self {
        Value::Tree(value)
    }
}

/// Ordered mapping of keys to values
///
/// Entries keep their insertion order. Re-inserting an existing key replaces
/// its value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceTree {
    entries: Vec<(Key, Value)>,
}

impl ResourceTree {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Key, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (&*k, v))
    }

    /// Next implicit integer key, as assigned to entries written without one
    pub fn next_index(&self) -> i64 {
        self.entries
            .iter()
            .filter_map(|(k, _)| match k {
                Key::Int(n) => Some(*n + 1),
                Key::Str(_) => None,
            })
            .max()
            .unwrap_or(0)
            .max(0)
    }

    /// True when the keys are exactly `0..len` in order, i.e. a plain list
    pub fn is_sequential(&self) -> bool {
        self.entries
            .iter()
            .enumerate()
            .all(|(i, (k, _))| *k == Key::Int(i as i64))
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for ResourceTree {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = ResourceTree::new();
        for (key, value) in iter {
            tree.insert(key, value);
        }
        tree
    }
}
