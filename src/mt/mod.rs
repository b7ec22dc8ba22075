//! Machine Translation Module
//!
//! Sends single strings to a translation backend. The generator only ever
//! talks to the [`MachineTranslator`] trait; [`GoogleTranslateProvider`] is
//! the one real backend and [`MockTranslator`] stands in for it in tests.
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
//!     let translated = provider.translate("Welcome", "en", "es").await?;
//!     println!("{}", translated);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod google_translate;
pub mod mock;
pub mod translator;

pub use error::{MtError, MtResult};
pub use google_translate::{GoogleTranslateProvider, extract_translation};
pub use mock::{MockMode, MockTranslator};
pub use translator::{MachineTranslator, validate_locale};
