//! Machine-translated language files
//!
//! Reads the resource files of one source language, sends every string
//! through a [`mt::MachineTranslator`], and writes the same tree, keys and
//! order intact, for each target language.

pub mod config;
pub mod error;
pub mod generator;
pub mod mt;
pub mod progress;
pub mod resource;
pub mod walker;

#[cfg(test)]
mod test_support;

pub use config::GeneratorConfig;
pub use error::{GeneratorError, Result};
pub use generator::{GenerateRequest, LanguageGenerator, RunSummary};
pub use walker::TreeTranslator;
