//! Run orchestration
//!
//! A run translates one source language into one or more target languages,
//! in one of two layouts under the configured `lang_path`:
//!
//! ```text
//! directory mode                 json mode
//! lang/en/messages.php   →       lang/en.json   →   lang/fr.json
//! lang/fr/messages.php           lang/de.json
//! lang/en/admin/users.php →
//! lang/fr/admin/users.php
//! ```
//!
//! Every selected source file is parsed and checked for empty values before
//! the first string is sent for translation. After that, targets are handled
//! in the order given, files in path order and strings in key order. The
//! first error ends the run; a file is only written once all of it has been
//! translated.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::{GeneratorError, Result};
use crate::mt::{MachineTranslator, validate_locale};
use crate::progress::ProgressBar;
use crate::resource::{LangFile, ResourceTree, Value, lang_file, parse_json, render_json};
use crate::walker::{TreeTranslator, validate};

/// What to translate, as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Source language code
    pub from: String,
    /// Target language codes, processed in this order
    pub targets: Vec<String>,
    /// Only translate this file, relative to the source directory
    pub file: Option<String>,
    /// Translate `<from>.json` instead of the `<from>/` directory
    pub json: bool,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_written: Vec<PathBuf>,
    pub strings_translated: usize,
}

/// A file under the source directory
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceFile {
    path: PathBuf,
    relative: PathBuf,
}

pub struct LanguageGenerator {
    config: GeneratorConfig,
    translator: Arc<dyn MachineTranslator>,
    show_progress: bool,
}

impl LanguageGenerator {
    pub fn new(config: GeneratorConfig, translator: Arc<dyn MachineTranslator>) -> Self {
        Self {
            config,
            translator,
            show_progress: true,
        }
    }

    /// Draw progress bars and per-target headers on stderr (on by default)
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn run(&self, request: &GenerateRequest) -> Result<RunSummary> {
        validate_locale(&request.from)?;
        for target in &request.targets {
            validate_locale(target)?;
        }

        info!(
            from = %request.from,
            targets = ?request.targets,
            provider = self.translator.provider_name(),
            json = request.json,
            "Starting translation run"
        );

        let summary = if request.json {
            self.process_json_file(request).await?
        } else {
            self.process_directory(request).await?
        };

        info!(
            files = summary.files_written.len(),
            strings = summary.strings_translated,
            "All files have been translated"
        );
        Ok(summary)
    }

    async fn process_directory(&self, request: &GenerateRequest) -> Result<RunSummary> {
        let source_dir = self.config.lang_path.join(&request.from);
        if !source_dir.is_dir() {
            return Err(GeneratorError::SourceDirectoryMissing(source_dir));
        }

        let files = select_files(&source_dir, request.file.as_deref())?;
        for file in &files {
            validate(&Value::Tree(load_lang_file(&file.path)?.tree))
                .map_err(|e| e.in_file(file.path.clone()))?;
        }

        let mut summary = RunSummary::default();
        for target in &request.targets {
            self.announce(target);

            let mut bar = self.progress_bar(files.len());
            bar.set_message("Initializing...");
            bar.start();

            for file in &files {
                bar.set_message(format!("🔄 Processing: {}", file.relative.display()));
                bar.display();

                let (output, count) = self.translate_file(file, &request.from, target).await?;
                summary.files_written.push(output);
                summary.strings_translated += count;

                bar.advance();
                bar.set_message("✅");
            }

            bar.finish();
        }

        Ok(summary)
    }

    /// Load, translate and write one file for one target language
    async fn translate_file(
        &self,
        file: &SourceFile,
        from: &str,
        target: &str,
    ) -> Result<(PathBuf, usize)> {
        let mut lang_file = load_lang_file(&file.path)?;

        let walker = TreeTranslator::new(self.translator.as_ref(), from, target);
        walker
            .translate_tree(&mut lang_file.tree)
            .await
            .map_err(|e| e.in_file(file.path.clone()))?;

        let output = self.config.lang_path.join(target).join(&file.relative);
        write_file(&output, &lang_file.render())?;
        info!(output = %output.display(), strings = walker.translated_count(), "Wrote translation");

        Ok((output, walker.translated_count()))
    }

    async fn process_json_file(&self, request: &GenerateRequest) -> Result<RunSummary> {
        let source = self
            .config
            .lang_path
            .join(format!("{}.json", request.from));
        if !source.is_file() {
            return Err(GeneratorError::SourceFileMissing(source));
        }

        validate(&Value::Tree(load_json_tree(&source)?)).map_err(|e| e.in_file(source.clone()))?;

        let mut summary = RunSummary::default();
        for target in &request.targets {
            self.announce(target);

            // Reloaded for every target so no translation leaks between them
            let mut tree = load_json_tree(&source)?;

            let mut bar = self.progress_bar(tree.len());
            bar.set_message("Initializing...");
            bar.start();
            bar.set_message(format!("🔄 Processing: {}", source.display()));
            bar.display();

            let walker = TreeTranslator::new(self.translator.as_ref(), &request.from, target);
            for (key, value) in tree.iter_mut() {
                walker
                    .translate_entry(key, value)
                    .await
                    .map_err(|e| e.in_file(source.clone()))?;
                bar.advance();
            }

            let output = self.config.lang_path.join(format!("{}.json", target));
            let content = render_json(&tree).map_err(|source_err| GeneratorError::Json {
                path: output.clone(),
                source: source_err,
            })?;
            write_file(&output, &content)?;
            info!(output = %output.display(), strings = walker.translated_count(), "Wrote translation");

            summary.files_written.push(output);
            summary.strings_translated += walker.translated_count();

            bar.set_message("✅");
            bar.finish();
        }

        Ok(summary)
    }

    fn announce(&self, target: &str) {
        info!(language = target, "Translating");
        if self.show_progress {
            eprintln!("\n\n 🔔 Translating to '{}'", target);
        }
    }

    fn progress_bar(&self, max: usize) -> ProgressBar {
        if self.show_progress {
            ProgressBar::new(&self.config.progress_bar_format, max)
        } else {
            ProgressBar::hidden(&self.config.progress_bar_format, max)
        }
    }
}

/// Pick the files to translate: one named file, or everything under the
/// source directory
fn select_files(source_dir: &Path, specific: Option<&str>) -> Result<Vec<SourceFile>> {
    match specific {
        Some(name) => {
            let relative = PathBuf::from(name);
            let inside = relative.components().count() > 0
                && relative
                    .components()
                    .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
            if !inside {
                return Err(GeneratorError::InvalidFileName(name.to_string()));
            }

            let path = source_dir.join(&relative);
            if !path.is_file() {
                return Err(GeneratorError::SpecificFileMissing(path));
            }
            Ok(vec![SourceFile { path, relative }])
        }
        None => {
            let mut files = Vec::new();
            collect_files(source_dir, source_dir, &mut files)?;
            Ok(files)
        }
    }
}

/// Recursively list files in path order, skipping hidden entries
fn collect_files(root: &Path, dir: &Path, files: &mut Vec<SourceFile>) -> Result<()> {
    let entries = fs::read_dir(dir).map_err(|source| GeneratorError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| GeneratorError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden {
            paths.push(entry.path());
        }
    }
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_files(root, &path, files)?;
        } else if path.is_file() {
            let relative = path
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.clone());
            files.push(SourceFile { path, relative });
        }
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_lang_file(path: &Path) -> Result<LangFile> {
    let content = read_file(path)?;
    lang_file::parse(&content).map_err(|source| GeneratorError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn load_json_tree(path: &Path) -> Result<ResourceTree> {
    let content = read_file(path)?;
    let value = parse_json(&content).map_err(|source| GeneratorError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Tree(tree) => Ok(tree),
        _ => Err(GeneratorError::InvalidJsonRoot(path.to_path_buf())),
    }
}

/// Write a file, creating missing parent directories; existing files are
/// overwritten
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| GeneratorError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| GeneratorError::Io {
        path: path.to_path_buf(),
        source,
    })
}
