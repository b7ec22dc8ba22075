use std::path::PathBuf;

use crate::mt::MtError;
use crate::resource::ParseError;

/// Errors that stop a generation run
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("The source language directory does not exist: {}", .0.display())]
    SourceDirectoryMissing(PathBuf),

    #[error("The source language json file does not exist: {}", .0.display())]
    SourceFileMissing(PathBuf),

    #[error("The specified file does not exist: {}", .0.display())]
    SpecificFileMissing(PathBuf),

    #[error("The specified file must be a path inside the source directory: {0}")]
    InvalidFileName(String),

    /// An empty or null leaf; translating around it would leave a partly
    /// translated file behind
    #[error(
        "Translation value missing at '{key_path}'{}, make sure all translation values are not empty in the source file",
        .file.as_ref().map(|f| format!(" in {}", f.display())).unwrap_or_default()
    )]
    MissingValue {
        key_path: String,
        file: Option<PathBuf>,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Failed to parse JSON from {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid JSON in {}: root must be an object or array", .0.display())]
    InvalidJsonRoot(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Translation(#[from] MtError),
}

impl GeneratorError {
    /// Attach the file being processed to a missing-value error
    pub fn in_file(self, path: PathBuf) -> Self {
        match self {
            GeneratorError::MissingValue {
                key_path,
                file: None,
            } => GeneratorError::MissingValue {
                key_path,
                file: Some(path),
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, GeneratorError>;
